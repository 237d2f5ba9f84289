use thiserror::Error;

/// Error kinds for the session-key registry and the three credential engines, named so callers
/// can match on them directly.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("key generation failed")]
    KeyGenerateFailed(#[source] session_crypto::CryptoError),
    #[error("key store failed")]
    KeyStoreFailed(#[source] anyhow::Error),
    #[error("key load failed")]
    KeyLoadFailed,
    #[error("key unseal failed")]
    KeyUnsealFailed(#[source] session_crypto::CryptoError),
    #[error("key parse failed")]
    KeyParseFailed(#[source] session_crypto::CryptoError),
    #[error("a public key is not available for this key")]
    PublicKeyUnavailable,

    #[error("token signing failed during issuance")]
    TokenSignFailed(#[source] session_crypto::CryptoError),
    #[error("token encryption failed during issuance")]
    TokenEncryptFailed(#[source] session_crypto::CryptoError),

    #[error("token is malformed")]
    TokenMalformed,
    #[error("token signature is invalid")]
    TokenSignatureInvalid(#[source] session_crypto::CryptoError),
    #[error("token could not be decrypted")]
    TokenDecryptFailed(#[source] session_crypto::CryptoError),
    #[error("claims are malformed")]
    ClaimsMalformed(#[source] session_crypto::CryptoError),
    #[error("`exp` claim is missing or has the wrong type")]
    ClaimExpMissing,
    #[error("`jti` claim is missing")]
    ClaimJtiMissing,
    #[error("`jti` claim is not a valid identifier")]
    ClaimJtiInvalid,
    #[error("session has expired")]
    SessionExpired,
    #[error("session has been revoked")]
    SessionRevoked,
    #[error("session is invalid")]
    SessionInvalid,

    #[error("store query failed")]
    StoreQueryFailed(#[source] session_store::StoreError),
    #[error("store insert failed")]
    StoreInsertFailed(#[source] session_store::StoreError),
    #[error("browser session cleanup failed")]
    BrowserCleanupFailed(#[source] session_store::StoreError),
    #[error("service session cleanup failed")]
    ServiceCleanupFailed(#[source] session_store::StoreError),
}
