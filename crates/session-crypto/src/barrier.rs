use anyhow::Context as _;
use chacha20poly1305::aead::{Aead, KeyInit, OsRng};
use chacha20poly1305::{AeadCore, ChaCha20Poly1305, Key, Nonce};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Envelope-encryption over a root key. The real barrier is an external concern; this is a
/// usable stand-in, not a claim about the production barrier's design.
pub trait Barrier: Send + Sync {
    fn seal(&self, bytes: &[u8]) -> Result<Vec<u8>, CryptoError>;
    fn unseal(&self, bytes: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

pub struct ChaChaBarrier {
    cipher: ChaCha20Poly1305,
}

impl ChaChaBarrier {
    pub fn new(root_key: Zeroizing<[u8; 32]>) -> Self {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(root_key.as_slice()));
        Self { cipher }
    }
}

impl Barrier for ChaChaBarrier {
    fn seal(&self, bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, bytes)
            .map_err(|e| CryptoError::SealFailed(anyhow::anyhow!("{e}")))?;

        let mut sealed = Vec::with_capacity(nonce.len() + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn unseal(&self, bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let (nonce_bytes, ciphertext) = bytes
            .split_at_checked(12)
            .context("sealed value is shorter than a nonce")
            .map_err(CryptoError::UnsealFailed)?;
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| CryptoError::UnsealFailed(anyhow::anyhow!("{e}")))
    }
}

/// Identity sealer for tests: explicit, never reached for in production wiring. Preferred over a
/// nil-check on every `seal`/`unseal` call.
pub struct IdentityBarrier;

impl Barrier for IdentityBarrier {
    fn seal(&self, bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(bytes.to_vec())
    }

    fn unseal(&self, bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(bytes.to_vec())
    }
}
