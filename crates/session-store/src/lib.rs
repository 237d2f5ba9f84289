//! The transactional row store the session manager and registration service are built against.
//! The storage engine itself is out of scope; this trait boundary and the two implementations
//! that satisfy it are what's provided.

mod error;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod store;

pub use error::StoreError;
pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use store::Store;
