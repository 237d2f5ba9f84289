use anyhow::Context as _;
use picky::jose::jwe::Jwe;
use picky::jose::jws::{JwsAlg, RawJws};
use picky::key::{PrivateKey, PublicKey};
use serde_json::Value;
use session_model::JweAlgorithm;

use crate::error::CryptoError;
use crate::material::RawKeyMaterial;

/// Sign/verify, encrypt/decrypt, and key-format round-trip — the JOSE surface the JWS and JWE
/// engines are built on, mirroring a decode-then-verify-then-parse-claims sequence.
pub trait JoseCodec: Send + Sync {
    fn sign(&self, key: &RawKeyMaterial, claims: &Value) -> Result<String, CryptoError>;
    fn verify(&self, key: &RawKeyMaterial, token: &str) -> Result<Value, CryptoError>;
    fn encrypt(&self, key: &RawKeyMaterial, claims: &Value, algorithm: JweAlgorithm) -> Result<String, CryptoError>;
    fn decrypt(&self, key: &RawKeyMaterial, token: &str) -> Result<Value, CryptoError>;
    fn public_key(&self, key: &RawKeyMaterial) -> Result<RawKeyMaterial, CryptoError>;
    /// JSON key-format round-trip, used by the registry before sealing / after unsealing.
    fn serialize_key(&self, key: &RawKeyMaterial) -> Result<Vec<u8>, CryptoError>;
    fn parse_key(&self, is_symmetric: bool, bytes: &[u8]) -> Result<RawKeyMaterial, CryptoError>;
}

pub struct PickyJose;

impl JoseCodec for PickyJose {
    fn sign(&self, key: &RawKeyMaterial, claims: &Value) -> Result<String, CryptoError> {
        let payload = serde_json::to_vec(claims).map_err(CryptoError::ClaimsMalformed)?;

        let signed = match key {
            RawKeyMaterial::Private(private) => {
                RawJws::encode(JwsAlg::from_private_key(private), &payload, private)
                    .context("JWS signing failed")?
            }
            RawKeyMaterial::Symmetric(secret) => RawJws::encode_with_hmac(&payload, secret)
                .context("HMAC signing failed")?,
            RawKeyMaterial::Public(_) => {
                return Err(CryptoError::SignFailed(anyhow::anyhow!(
                    "cannot sign with a public key"
                )))
            }
        };

        Ok(signed)
    }

    fn verify(&self, key: &RawKeyMaterial, token: &str) -> Result<Value, CryptoError> {
        let raw_jws = RawJws::decode(token).map_err(|e| CryptoError::VerifyFailed(e.into()))?;

        let payload = match key {
            RawKeyMaterial::Public(public) => raw_jws
                .verify(public)
                .map_err(|e| CryptoError::VerifyFailed(e.into()))?
                .payload,
            RawKeyMaterial::Symmetric(secret) => raw_jws
                .verify_hmac(secret)
                .map_err(|e| CryptoError::VerifyFailed(e.into()))?
                .payload,
            RawKeyMaterial::Private(_) => {
                return Err(CryptoError::VerifyFailed(anyhow::anyhow!(
                    "cannot verify with a private key; derive the public key first"
                )))
            }
        };

        serde_json::from_slice(&payload).map_err(CryptoError::ClaimsMalformed)
    }

    fn encrypt(&self, key: &RawKeyMaterial, claims: &Value, algorithm: JweAlgorithm) -> Result<String, CryptoError> {
        let RawKeyMaterial::Symmetric(secret) = key else {
            return Err(CryptoError::EncryptFailed(anyhow::anyhow!(
                "JWE encryption requires a symmetric key"
            )));
        };

        let payload = serde_json::to_vec(claims).map_err(CryptoError::ClaimsMalformed)?;

        let token = match algorithm {
            JweAlgorithm::DirA256Gcm => Jwe::encode_direct(&payload, secret).context("JWE direct encryption failed")?,
            JweAlgorithm::A256GcmKwA256Gcm => {
                Jwe::encode_key_wrap(&payload, secret).context("JWE key-wrap encryption failed")?
            }
        };

        Ok(token)
    }

    fn decrypt(&self, key: &RawKeyMaterial, token: &str) -> Result<Value, CryptoError> {
        let RawKeyMaterial::Symmetric(secret) = key else {
            return Err(CryptoError::DecryptFailed(anyhow::anyhow!(
                "JWE decryption requires a symmetric key"
            )));
        };

        let decoded = Jwe::decode(token, secret).map_err(|e| CryptoError::DecryptFailed(e.into()))?;
        serde_json::from_slice(&decoded.payload).map_err(CryptoError::ClaimsMalformed)
    }

    fn public_key(&self, key: &RawKeyMaterial) -> Result<RawKeyMaterial, CryptoError> {
        match key {
            RawKeyMaterial::Private(private) => {
                let public: PublicKey = private.to_public_key().context("failed to derive public key")?;
                Ok(RawKeyMaterial::Public(public))
            }
            RawKeyMaterial::Public(_) => Err(CryptoError::PublicKeyUnavailable),
            RawKeyMaterial::Symmetric(_) => Err(CryptoError::PublicKeyUnavailable),
        }
    }

    fn serialize_key(&self, key: &RawKeyMaterial) -> Result<Vec<u8>, CryptoError> {
        match key {
            RawKeyMaterial::Private(private) => {
                let jwk = picky::jose::jwk::Jwk::try_from(private).context("failed to encode private key as JWK")?;
                serde_json::to_vec(&jwk).map_err(CryptoError::ClaimsMalformed)
            }
            RawKeyMaterial::Public(public) => {
                let jwk = picky::jose::jwk::Jwk::try_from(public).context("failed to encode public key as JWK")?;
                serde_json::to_vec(&jwk).map_err(CryptoError::ClaimsMalformed)
            }
            RawKeyMaterial::Symmetric(secret) => Ok(secret.clone()),
        }
    }

    fn parse_key(&self, is_symmetric: bool, bytes: &[u8]) -> Result<RawKeyMaterial, CryptoError> {
        if is_symmetric {
            return Ok(RawKeyMaterial::Symmetric(bytes.to_vec()));
        }

        let jwk: picky::jose::jwk::Jwk = serde_json::from_slice(bytes).map_err(CryptoError::ClaimsMalformed)?;
        let private = PrivateKey::try_from(jwk).context("failed to parse private key JWK")?;
        Ok(RawKeyMaterial::Private(private))
    }
}

#[cfg(test)]
mod tests {
    use picky::key::PrivateKey;
    use serde_json::json;

    use super::*;

    #[test]
    fn sign_and_verify_with_ec_key_roundtrips() {
        let private = PrivateKey::generate_ec(picky::key::EcCurve::NistP256).expect("keygen");
        let public = private.to_public_key().expect("public key");
        let claims = json!({ "sub": "user-1" });

        let jose = PickyJose;
        let token = jose
            .sign(&RawKeyMaterial::Private(private), &claims)
            .expect("sign");
        let verified = jose
            .verify(&RawKeyMaterial::Public(public), &token)
            .expect("verify");

        assert_eq!(verified, claims);
    }

    #[test]
    fn sign_and_verify_with_hmac_secret_roundtrips() {
        let secret = RawKeyMaterial::Symmetric(vec![42u8; 32]);
        let claims = json!({ "sub": "svc-1" });

        let jose = PickyJose;
        let token = jose.sign(&secret, &claims).expect("sign");
        let verified = jose.verify(&secret, &token).expect("verify");

        assert_eq!(verified, claims);
    }

    #[test]
    fn verify_rejects_wrong_hmac_secret() {
        let claims = json!({ "sub": "svc-1" });
        let jose = PickyJose;
        let token = jose
            .sign(&RawKeyMaterial::Symmetric(vec![1u8; 32]), &claims)
            .expect("sign");

        assert!(jose.verify(&RawKeyMaterial::Symmetric(vec![2u8; 32]), &token).is_err());
    }

    #[test]
    fn encrypt_and_decrypt_direct_mode_roundtrips() {
        let secret = RawKeyMaterial::Symmetric(vec![5u8; 32]);
        let claims = json!({ "sub": "user-1", "tenant_id": "t1" });

        let jose = PickyJose;
        let token = jose
            .encrypt(&secret, &claims, JweAlgorithm::DirA256Gcm)
            .expect("encrypt");
        let decrypted = jose.decrypt(&secret, &token).expect("decrypt");

        assert_eq!(decrypted, claims);
    }

    #[test]
    fn serialize_and_parse_private_key_roundtrips() {
        let private = PrivateKey::generate_ec(picky::key::EcCurve::NistP256).expect("keygen");
        let jose = PickyJose;

        let serialized = jose.serialize_key(&RawKeyMaterial::Private(private)).expect("serialize");
        let parsed = jose.parse_key(false, &serialized).expect("parse");

        assert!(matches!(parsed, RawKeyMaterial::Private(_)));
    }
}
