use std::sync::Arc;

use session_core::SessionManager;
use session_model::{BrowserSession, ServiceSession, TenantJoinRequest};
use session_registration::RegistrationService;
use uuid::Uuid;

use crate::error::AuthError;

/// The only entry point callers outside this crate should use. Every operation rejects empty
/// identifier strings and nil UUIDs with `InvalidArgument` before delegating to the session
/// manager or the registration service; it adds no other semantics.
pub struct ValidationFacade {
    manager: Arc<SessionManager>,
    registration: Arc<RegistrationService>,
}

impl ValidationFacade {
    pub fn new(manager: Arc<SessionManager>, registration: Arc<RegistrationService>) -> Self {
        Self { manager, registration }
    }

    pub async fn issue_browser_session(
        &self,
        user_id: &str,
        tenant_id: Uuid,
        realm_id: Uuid,
    ) -> Result<String, AuthError> {
        require_non_empty(user_id, "user_id")?;
        require_non_nil(tenant_id, "tenant_id")?;
        require_non_nil(realm_id, "realm_id")?;

        Ok(self.manager.issue_browser(user_id, tenant_id, realm_id).await?)
    }

    pub async fn issue_service_session(
        &self,
        client_id: &str,
        tenant_id: Uuid,
        realm_id: Uuid,
    ) -> Result<String, AuthError> {
        require_non_empty(client_id, "client_id")?;
        require_non_nil(tenant_id, "tenant_id")?;
        require_non_nil(realm_id, "realm_id")?;

        Ok(self.manager.issue_service(client_id, tenant_id, realm_id).await?)
    }

    pub async fn validate_browser_session(&self, token: &str) -> Result<BrowserSession, AuthError> {
        require_non_empty(token, "token")?;

        Ok(self.manager.validate_browser(token).await?)
    }

    pub async fn validate_service_session(&self, token: &str) -> Result<ServiceSession, AuthError> {
        require_non_empty(token, "token")?;

        Ok(self.manager.validate_service(token).await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn register_user_with_tenant(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
        tenant_name: &str,
        create_tenant: bool,
    ) -> Result<Uuid, AuthError> {
        require_non_nil(user_id, "user_id")?;
        require_non_empty(username, "username")?;
        require_non_empty(email, "email")?;
        require_non_empty(password_hash, "password_hash")?;
        require_non_empty(tenant_name, "tenant_name")?;

        Ok(self
            .registration
            .register_user_with_tenant(user_id, username, email, password_hash, tenant_name, create_tenant)
            .await?)
    }

    pub async fn register_client_with_tenant(&self, client_id: Uuid, tenant_id: Uuid) -> Result<Uuid, AuthError> {
        require_non_nil(client_id, "client_id")?;
        require_non_nil(tenant_id, "tenant_id")?;

        Ok(self.registration.register_client_with_tenant(client_id, tenant_id).await?)
    }

    pub async fn authorize_join_request(
        &self,
        request_id: Uuid,
        admin_user_id: &str,
        approved: bool,
    ) -> Result<(), AuthError> {
        require_non_nil(request_id, "request_id")?;
        require_non_empty(admin_user_id, "admin_user_id")?;

        Ok(self
            .registration
            .authorize_join_request(request_id, admin_user_id, approved)
            .await?)
    }

    pub async fn list_join_requests(&self, tenant_id: Uuid) -> Result<Vec<TenantJoinRequest>, AuthError> {
        require_non_nil(tenant_id, "tenant_id")?;

        Ok(self.registration.list_join_requests(tenant_id).await?)
    }
}

fn require_non_empty(value: &str, name: &'static str) -> Result<(), AuthError> {
    if value.is_empty() {
        return Err(AuthError::InvalidArgument(name));
    }
    Ok(())
}

fn require_non_nil(value: Uuid, name: &'static str) -> Result<(), AuthError> {
    if value.is_nil() {
        return Err(AuthError::InvalidArgument(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use session_core::{JweEngine, JwsEngine, OpaqueEngine, SessionKeyRegistry, SessionManagerConfig};
    use session_crypto::{IdentityBarrier, PickyJose, PickyKeyGenerator, Sha256Hash};
    use session_model::SessionAlgorithm;
    use session_store::{InMemoryStore, Store};

    use super::*;

    fn facade() -> ValidationFacade {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let registry = Arc::new(SessionKeyRegistry::new(
            Arc::new(PickyKeyGenerator),
            Arc::new(PickyJose),
            Arc::new(IdentityBarrier),
            Arc::clone(&store),
        ));
        let opaque = Arc::new(OpaqueEngine::new(Arc::new(Sha256Hash), Arc::clone(&store)));
        let jws = Arc::new(JwsEngine::new(Arc::clone(&registry), Arc::new(PickyJose), Arc::clone(&store)));
        let jwe = Arc::new(JweEngine::new(Arc::clone(&registry), Arc::new(PickyJose), Arc::clone(&store)));

        let manager = Arc::new(SessionManager::new(
            SessionManagerConfig {
                browser_algorithm: SessionAlgorithm::Opaque,
                service_algorithm: SessionAlgorithm::Opaque,
                browser_expiration: Duration::from_secs(3600),
                service_expiration: Duration::from_secs(3600),
                idle_timeout: Duration::from_secs(86_400),
                cleanup_interval: Duration::from_secs(300),
            },
            registry,
            opaque,
            jws,
            jwe,
            Arc::clone(&store),
        ));
        let registration = Arc::new(RegistrationService::new(store));

        ValidationFacade::new(manager, registration)
    }

    #[tokio::test]
    async fn rejects_empty_user_id() {
        let facade = facade();
        let err = facade
            .issue_browser_session("", Uuid::now_v7(), Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument("user_id")));
    }

    #[tokio::test]
    async fn rejects_nil_tenant_id() {
        let facade = facade();
        let err = facade
            .issue_browser_session("user-1", Uuid::nil(), Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument("tenant_id")));
    }

    #[tokio::test]
    async fn issues_and_validates_a_browser_session() {
        let facade = facade();
        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();

        let token = facade
            .issue_browser_session("user-1", tenant_id, realm_id)
            .await
            .expect("issue");

        let session = facade.validate_browser_session(&token).await.expect("validate");
        assert_eq!(session.tenant_id, tenant_id);
        assert_eq!(session.realm_id, realm_id);
    }

    #[tokio::test]
    async fn registers_a_client_and_authorizes_its_join_request() {
        let facade = facade();

        let tenant_id = facade
            .register_user_with_tenant(Uuid::now_v7(), "alice", "alice@example.com", "hash", "acme", true)
            .await
            .expect("register tenant");

        let request_id = facade
            .register_client_with_tenant(Uuid::now_v7(), tenant_id)
            .await
            .expect("join request");

        facade
            .authorize_join_request(request_id, "admin-1", true)
            .await
            .expect("authorize");

        let requests = facade.list_join_requests(tenant_id).await.expect("list");
        assert_eq!(requests.len(), 1);
    }
}
