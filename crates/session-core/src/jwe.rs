use std::sync::Arc;
use std::time::Duration;

use session_crypto::JoseCodec;
use session_model::{JweAlgorithm, SessionAlgorithm, SessionClass};
use session_store::Store;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::claims::{parse_claims, SessionClaims};
use crate::error::SessionError;
use crate::registry::SessionKeyRegistry;

/// Encrypted session tokens: the claims never leave the server in the clear. Revocation is still
/// database-gated, same as JWS — decrypting successfully only proves the token was minted by this
/// server, not that the session is still live.
pub struct JweEngine {
    registry: Arc<SessionKeyRegistry>,
    jose: Arc<dyn JoseCodec>,
    store: Arc<dyn Store>,
}

impl JweEngine {
    pub fn new(registry: Arc<SessionKeyRegistry>, jose: Arc<dyn JoseCodec>, store: Arc<dyn Store>) -> Self {
        Self { registry, jose, store }
    }

    pub async fn issue(
        &self,
        class: SessionClass,
        algorithm: JweAlgorithm,
        principal_id: &str,
        tenant_id: Uuid,
        realm_id: Uuid,
        expiration: Duration,
    ) -> Result<String, SessionError> {
        let key_id = self
            .registry
            .initialize_session_key(class, SessionAlgorithm::Jwe(algorithm))
            .await?;
        let key = self.registry.load_key(class, key_id).await?;

        let now = OffsetDateTime::now_utc();
        let exp = now + expiration;
        let jti = session_model::new_time_ordered_id();

        let claims = SessionClaims {
            jti: jti.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            sub: principal_id.to_owned(),
            tenant_id,
            realm_id,
        };
        let claims = serde_json::to_value(&claims)
            .map_err(|e| SessionError::ClaimsMalformed(session_crypto::CryptoError::ClaimsMalformed(e)))?;

        let token = self
            .jose
            .encrypt(&key, &claims, algorithm)
            .map_err(SessionError::TokenEncryptFailed)?;

        let jti_str = jti.to_string();
        let row = session_model::NewSession {
            id: jti,
            tenant_id,
            realm_id,
            token_hash: &jti_str,
            principal_id,
            expiration: exp,
            created_at: now,
        };
        self.insert(class, row).await?;

        Ok(token)
    }

    pub async fn validate(
        &self,
        class: SessionClass,
        algorithm: JweAlgorithm,
        token: &str,
    ) -> Result<session_model::Session, SessionError> {
        let key_id = self
            .registry
            .initialize_session_key(class, SessionAlgorithm::Jwe(algorithm))
            .await?;
        let key = self.registry.load_key(class, key_id).await?;

        let claims = self.jose.decrypt(&key, token).map_err(SessionError::TokenDecryptFailed)?;
        let parsed = parse_claims(&claims)?;

        if parsed.exp < OffsetDateTime::now_utc().unix_timestamp() {
            return Err(SessionError::SessionExpired);
        }

        let session = match class {
            SessionClass::Browser => self
                .store
                .find_browser_session_by_id(parsed.jti)
                .await
                .map_err(SessionError::StoreQueryFailed)?
                .map(session_model::Session::Browser),
            SessionClass::Service => self
                .store
                .find_service_session_by_id(parsed.jti)
                .await
                .map_err(SessionError::StoreQueryFailed)?
                .map(session_model::Session::Service),
        };

        let session = session.ok_or(SessionError::SessionRevoked)?;

        // The authenticated bearer has already been proven; a failure here must not fail
        // validation.
        match class {
            SessionClass::Browser => {
                if let Err(error) = self.store.touch_browser_session(parsed.jti).await {
                    tracing::warn!(session.id = %parsed.jti, %error, "Failed to update last_activity");
                }
            }
            SessionClass::Service => {
                if let Err(error) = self.store.touch_service_session(parsed.jti).await {
                    tracing::warn!(session.id = %parsed.jti, %error, "Failed to update last_activity");
                }
            }
        }

        Ok(session)
    }

    async fn insert(&self, class: SessionClass, row: session_model::NewSession<'_>) -> Result<(), SessionError> {
        match class {
            SessionClass::Browser => self.store.insert_browser_session(row).await,
            SessionClass::Service => self.store.insert_service_session(row).await,
        }
        .map_err(SessionError::StoreInsertFailed)
    }
}
