use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("key generation failed")]
    KeyGenerateFailed(#[source] anyhow::Error),
    #[error("key could not be parsed")]
    KeyParseFailed(#[source] anyhow::Error),
    #[error("a public key is not available for a symmetric key")]
    PublicKeyUnavailable,
    #[error("seal operation failed")]
    SealFailed(#[source] anyhow::Error),
    #[error("unseal operation failed")]
    UnsealFailed(#[source] anyhow::Error),
    #[error("failed to sign claims")]
    SignFailed(#[source] anyhow::Error),
    #[error("token signature verification failed")]
    VerifyFailed(#[source] anyhow::Error),
    #[error("failed to encrypt claims")]
    EncryptFailed(#[source] anyhow::Error),
    #[error("token decryption failed")]
    DecryptFailed(#[source] anyhow::Error),
    #[error("claims are not valid JSON")]
    ClaimsMalformed(#[source] serde_json::Error),
}
