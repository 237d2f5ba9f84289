//! Key material adapters: keygen, the envelope-encryption barrier, the JOSE primitives, and a
//! deterministic hash. Each is a trait so the core can be constructed with fakes in tests,
//! mirroring how a relay server receives its provisioner keys and token cache as constructor
//! dependencies rather than globals.

mod barrier;
mod error;
mod hash;
mod jose;
mod keygen;
mod material;

pub use barrier::{Barrier, ChaChaBarrier, IdentityBarrier};
pub use error::CryptoError;
pub use hash::{DeterministicHash, Sha256Hash};
pub use jose::{JoseCodec, PickyJose};
pub use keygen::{KeyGenerator, PickyKeyGenerator};
pub use material::RawKeyMaterial;
