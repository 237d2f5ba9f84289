use std::sync::Arc;
use std::time::Duration;

use session_crypto::DeterministicHash;
use session_model::{BrowserSession, NewSession, ServiceSession};
use session_store::Store;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::SessionError;

/// Random server-minted identifier; trust is rooted in the database record, not in the token
/// itself. The token string is never persisted, only its hash.
pub struct OpaqueEngine {
    hasher: Arc<dyn DeterministicHash>,
    store: Arc<dyn Store>,
}

impl OpaqueEngine {
    pub fn new(hasher: Arc<dyn DeterministicHash>, store: Arc<dyn Store>) -> Self {
        Self { hasher, store }
    }

    pub async fn issue_browser(
        &self,
        user_id: &str,
        tenant_id: Uuid,
        realm_id: Uuid,
        expiration: Duration,
    ) -> Result<String, SessionError> {
        let id = session_model::new_time_ordered_id();
        let token = id.to_string();
        let token_hash = self.hasher.hash(&token);
        let now = OffsetDateTime::now_utc();

        self.store
            .insert_browser_session(NewSession {
                id,
                tenant_id,
                realm_id,
                token_hash: &token_hash,
                principal_id: user_id,
                expiration: now + expiration,
                created_at: now,
            })
            .await
            .map_err(SessionError::StoreInsertFailed)?;

        Ok(token)
    }

    pub async fn issue_service(
        &self,
        client_id: &str,
        tenant_id: Uuid,
        realm_id: Uuid,
        expiration: Duration,
    ) -> Result<String, SessionError> {
        let id = session_model::new_time_ordered_id();
        let token = id.to_string();
        let token_hash = self.hasher.hash(&token);
        let now = OffsetDateTime::now_utc();

        self.store
            .insert_service_session(NewSession {
                id,
                tenant_id,
                realm_id,
                token_hash: &token_hash,
                principal_id: client_id,
                expiration: now + expiration,
                created_at: now,
            })
            .await
            .map_err(SessionError::StoreInsertFailed)?;

        Ok(token)
    }

    pub async fn validate_browser(&self, token: &str) -> Result<BrowserSession, SessionError> {
        let token_hash = self.hasher.hash(token);

        let session = self
            .store
            .find_browser_session_by_hash(&token_hash)
            .await
            .map_err(SessionError::StoreQueryFailed)?
            .ok_or(SessionError::SessionInvalid)?;

        // The authenticated bearer has already been proven; a failure here must not fail
        // validation.
        if let Err(error) = self.store.touch_browser_session(session.id).await {
            tracing::warn!(session.id = %session.id, %error, "Failed to update last_activity");
        }

        Ok(session)
    }

    pub async fn validate_service(&self, token: &str) -> Result<ServiceSession, SessionError> {
        let token_hash = self.hasher.hash(token);

        let session = self
            .store
            .find_service_session_by_hash(&token_hash)
            .await
            .map_err(SessionError::StoreQueryFailed)?
            .ok_or(SessionError::SessionInvalid)?;

        if let Err(error) = self.store.touch_service_session(session.id).await {
            tracing::warn!(session.id = %session.id, %error, "Failed to update last_activity");
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use session_crypto::Sha256Hash;
    use session_store::InMemoryStore;

    use super::*;

    fn engine() -> OpaqueEngine {
        OpaqueEngine::new(Arc::new(Sha256Hash), Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn issued_browser_token_validates() {
        let engine = engine();
        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();

        let token = engine
            .issue_browser("user-1", tenant_id, realm_id, Duration::from_secs(3600))
            .await
            .expect("issue");

        let session = engine.validate_browser(&token).await.expect("validate");
        assert_eq!(session.user_id.as_deref(), Some("user-1"));
        assert_eq!(session.tenant_id, tenant_id);
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let engine = engine();
        let err = engine.validate_browser("not-a-real-token").await.unwrap_err();
        assert!(matches!(err, SessionError::SessionInvalid));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let engine = engine();
        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();

        let token = engine
            .issue_service("client-1", tenant_id, realm_id, Duration::from_secs(0))
            .await
            .expect("issue");

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let err = engine.validate_service(&token).await.unwrap_err();
        assert!(matches!(err, SessionError::SessionExpired) || matches!(err, SessionError::SessionInvalid));
    }
}
