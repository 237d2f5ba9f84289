use std::sync::Arc;
use std::time::Duration;

use session_crypto::JoseCodec;
use session_model::{JwsAlgorithm, SessionAlgorithm, SessionClass};
use session_store::Store;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::claims::{parse_claims, SessionClaims};
use crate::error::SessionError;
use crate::registry::SessionKeyRegistry;

/// Signed, unencrypted session tokens. The signature proves the token wasn't tampered with; the
/// database row is still the final word on whether it's live — a signature can be valid for a
/// session that was explicitly revoked.
pub struct JwsEngine {
    registry: Arc<SessionKeyRegistry>,
    jose: Arc<dyn JoseCodec>,
    store: Arc<dyn Store>,
}

impl JwsEngine {
    pub fn new(registry: Arc<SessionKeyRegistry>, jose: Arc<dyn JoseCodec>, store: Arc<dyn Store>) -> Self {
        Self { registry, jose, store }
    }

    pub async fn issue(
        &self,
        class: SessionClass,
        algorithm: JwsAlgorithm,
        principal_id: &str,
        tenant_id: Uuid,
        realm_id: Uuid,
        expiration: Duration,
    ) -> Result<String, SessionError> {
        let key_id = self
            .registry
            .initialize_session_key(class, SessionAlgorithm::Jws(algorithm))
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

        let token = self.jose.sign(&key, &claims).map_err(SessionError::TokenSignFailed)?;

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
        algorithm: JwsAlgorithm,
        token: &str,
    ) -> Result<session_model::Session, SessionError> {
        let key_id = self.current_key_id(class, algorithm).await?;
        let key = self.registry.load_key(class, key_id).await?;

        // HMAC (HS*) keys verify with the same symmetric secret used to sign, rather than being
        // rejected with `PublicKeyUnavailable`: treating them that way would make the HS*
        // algorithms unable to ever validate a token they issued.
        let public = if key.is_symmetric() {
            key
        } else {
            self.jose.public_key(&key).map_err(|_| SessionError::PublicKeyUnavailable)?
        };

        let claims = self.jose.verify(&public, token).map_err(SessionError::TokenSignatureInvalid)?;
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

        // The DB row is the final revocation authority even when the claim's own `exp` is
        // still in the future.
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

    async fn current_key_id(&self, class: SessionClass, algorithm: JwsAlgorithm) -> Result<Uuid, SessionError> {
        self.registry
            .initialize_session_key(class, SessionAlgorithm::Jws(algorithm))
            .await
    }
}

#[cfg(test)]
mod tests {
    use session_crypto::{IdentityBarrier, PickyJose, PickyKeyGenerator};
    use session_store::InMemoryStore;

    use super::*;
    use crate::registry::SessionKeyRegistry;

    fn engine() -> (Arc<JwsEngine>, Arc<dyn Store>) {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let registry = Arc::new(SessionKeyRegistry::new(
            Arc::new(PickyKeyGenerator),
            Arc::new(PickyJose),
            Arc::new(IdentityBarrier),
            Arc::clone(&store),
        ));
        (
            Arc::new(JwsEngine::new(registry, Arc::new(PickyJose), Arc::clone(&store))),
            store,
        )
    }

    #[tokio::test]
    async fn rs256_token_issues_and_validates() {
        let (engine, _store) = engine();
        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();

        let token = engine
            .issue(
                SessionClass::Browser,
                JwsAlgorithm::Rs256,
                "user-1",
                tenant_id,
                realm_id,
                Duration::from_secs(3600),
            )
            .await
            .expect("issue");

        let session = engine
            .validate(SessionClass::Browser, JwsAlgorithm::Rs256, &token)
            .await
            .expect("validate");

        match session {
            session_model::Session::Browser(s) => assert_eq!(s.tenant_id, tenant_id),
            session_model::Session::Service(_) => panic!("expected a browser session"),
        }
    }

    #[tokio::test]
    async fn hs256_token_issues_and_validates() {
        let (engine, _store) = engine();
        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();

        let token = engine
            .issue(
                SessionClass::Service,
                JwsAlgorithm::Hs256,
                "client-1",
                tenant_id,
                realm_id,
                Duration::from_secs(3600),
            )
            .await
            .expect("issue");

        engine
            .validate(SessionClass::Service, JwsAlgorithm::Hs256, &token)
            .await
            .expect("validate");
    }

    #[tokio::test]
    async fn tampered_token_fails_signature_check() {
        let (engine, _store) = engine();
        let token = engine
            .issue(
                SessionClass::Browser,
                JwsAlgorithm::Rs256,
                "user-1",
                Uuid::now_v7(),
                Uuid::now_v7(),
                Duration::from_secs(3600),
            )
            .await
            .expect("issue");

        let mut tampered = token.clone();
        tampered.push('x');

        let err = engine
            .validate(SessionClass::Browser, JwsAlgorithm::Rs256, &tampered)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::TokenSignatureInvalid(_)));
    }

    #[tokio::test]
    async fn revoked_session_is_rejected_even_with_valid_signature() {
        let (engine, store) = engine();
        let token = engine
            .issue(
                SessionClass::Service,
                JwsAlgorithm::Hs256,
                "client-1",
                Uuid::now_v7(),
                Uuid::now_v7(),
                Duration::from_secs(3600),
            )
            .await
            .expect("issue");

        // Simulate revocation: sweep as if the row had already expired, without touching the
        // token's own (still valid) claims.
        store
            .delete_expired_service_sessions(
                OffsetDateTime::now_utc() + Duration::from_secs(7200),
                OffsetDateTime::now_utc() - Duration::from_secs(86_400),
            )
            .await
            .expect("sweep");

        let err = engine
            .validate(SessionClass::Service, JwsAlgorithm::Hs256, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::SessionRevoked));
    }
}
