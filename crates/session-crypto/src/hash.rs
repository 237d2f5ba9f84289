use sha2::{Digest, Sha256};

/// A fixed, collision-resistant function from a high-entropy string (a token or a `jti`) to a
/// short string, so the store never holds the bearer value in the clear.
pub trait DeterministicHash: Send + Sync {
    fn hash(&self, input: &str) -> String;
}

pub struct Sha256Hash;

impl DeterministicHash for Sha256Hash {
    fn hash(&self, input: &str) -> String {
        let digest = Sha256::digest(input.as_bytes());
        hex::encode(digest)
    }
}
