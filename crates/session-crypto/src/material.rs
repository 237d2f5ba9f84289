use picky::key::{PrivateKey, PublicKey};

/// A generated or loaded session key. Asymmetric variants back JWS; the symmetric variant backs
/// JWE and HMAC-flavored JWS.
pub enum RawKeyMaterial {
    Private(PrivateKey),
    Public(PublicKey),
    Symmetric(Vec<u8>),
}

impl RawKeyMaterial {
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::Symmetric(_))
    }
}
