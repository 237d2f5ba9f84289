use anyhow::Context as _;
use picky::key::{EcCurve, PrivateKey};
use rand::RngCore;
use session_model::{JweAlgorithm, JwsAlgorithm, SessionAlgorithm};

use crate::error::CryptoError;
use crate::material::RawKeyMaterial;

/// Produces fresh key material for a session algorithm. The algorithm → primitive mapping is
/// fixed: RSA-2048 for `RS*`, ECDSA on the matching curve for `ES*`, Ed25519 for `EdDSA`, and an
/// HMAC-width or AES-256 secret for the symmetric algorithms.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self, algorithm: SessionAlgorithm) -> Result<RawKeyMaterial, CryptoError>;
}

pub struct PickyKeyGenerator;

impl KeyGenerator for PickyKeyGenerator {
    fn generate(&self, algorithm: SessionAlgorithm) -> Result<RawKeyMaterial, CryptoError> {
        match algorithm {
            SessionAlgorithm::Opaque => Err(CryptoError::UnsupportedAlgorithm(
                "OPAQUE sessions have no session key".to_owned(),
            )),
            SessionAlgorithm::Jws(alg) => generate_jws_key(alg),
            SessionAlgorithm::Jwe(alg) => generate_jwe_key(alg),
        }
    }
}

fn generate_jws_key(alg: JwsAlgorithm) -> Result<RawKeyMaterial, CryptoError> {
    match alg {
        JwsAlgorithm::Rs256 | JwsAlgorithm::Rs384 | JwsAlgorithm::Rs512 => {
            let key = PrivateKey::generate_rsa(2048).context("RSA-2048 keygen failed")?;
            Ok(RawKeyMaterial::Private(key))
        }
        JwsAlgorithm::Es256 => generate_ec_key(EcCurve::NistP256),
        JwsAlgorithm::Es384 => generate_ec_key(EcCurve::NistP384),
        JwsAlgorithm::Es512 => generate_ec_key(EcCurve::NistP521),
        JwsAlgorithm::EdDsa => {
            let key = PrivateKey::generate_ed25519().context("Ed25519 keygen failed")?;
            Ok(RawKeyMaterial::Private(key))
        }
        JwsAlgorithm::Hs256 => Ok(RawKeyMaterial::Symmetric(random_secret(32))),
        JwsAlgorithm::Hs384 => Ok(RawKeyMaterial::Symmetric(random_secret(48))),
        JwsAlgorithm::Hs512 => Ok(RawKeyMaterial::Symmetric(random_secret(64))),
    }
}

fn generate_ec_key(curve: EcCurve) -> Result<RawKeyMaterial, CryptoError> {
    let key = PrivateKey::generate_ec(curve).context("ECDSA keygen failed")?;
    Ok(RawKeyMaterial::Private(key))
}

fn generate_jwe_key(_alg: JweAlgorithm) -> Result<RawKeyMaterial, CryptoError> {
    // Both supported JWE schemes (direct and key-wrap) start from a 256-bit content key; the
    // algorithm id only changes how the content-encryption key is carried in the token header.
    Ok(RawKeyMaterial::Symmetric(random_secret(32)))
}

fn random_secret(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

impl From<anyhow::Error> for CryptoError {
    fn from(error: anyhow::Error) -> Self {
        CryptoError::KeyGenerateFailed(error)
    }
}
