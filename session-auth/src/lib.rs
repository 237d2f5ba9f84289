mod config;
mod error;
mod facade;

pub use config::{ConfFile, Config};
pub use error::AuthError;
pub use facade::ValidationFacade;

pub use session_core::{CleanupTask, JweEngine, JwsEngine, OpaqueEngine, SessionKeyRegistry, SessionManager, SessionManagerConfig};
pub use session_crypto::{Barrier, ChaChaBarrier, DeterministicHash, IdentityBarrier, JoseCodec, KeyGenerator, PickyJose, PickyKeyGenerator, Sha256Hash};
pub use session_registration::RegistrationService;
pub use session_store::Store;
#[cfg(feature = "postgres")]
pub use session_store::PostgresStore;
pub use session_store::InMemoryStore;
