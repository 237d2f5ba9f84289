mod claims;
mod cleanup;
mod error;
mod jwe;
mod jws;
mod manager;
mod opaque;
mod registry;

pub use cleanup::CleanupTask;
pub use error::SessionError;
pub use jwe::JweEngine;
pub use jws::JwsEngine;
pub use manager::{SessionManager, SessionManagerConfig};
pub use opaque::OpaqueEngine;
pub use registry::SessionKeyRegistry;
