use std::sync::Arc;

use session_model::{JoinRequestStatus, NewJoinRequest, NewUser, TenantJoinRequest};
use session_store::Store;
use uuid::Uuid;

use crate::error::RegistrationError;

/// Tenant/user onboarding and the service-client join-request workflow. Authorization checks
/// (e.g. "does `admin_user_id` own this tenant") are explicitly out of scope here; callers must
/// not rely on this service to enforce them.
pub struct RegistrationService {
    store: Arc<dyn Store>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// `create_tenant = false` is a documented gap: there is no defined way to join an existing
    /// tenant by name, so it fails stably rather than silently dropping the request.
    pub async fn register_user_with_tenant(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
        tenant_name: &str,
        create_tenant: bool,
    ) -> Result<Uuid, RegistrationError> {
        if !create_tenant {
            return Err(RegistrationError::JoinByNameUnsupported);
        }

        let tenant_id = self
            .store
            .insert_tenant(tenant_name)
            .await
            .map_err(RegistrationError::TenantCreateFailed)?;

        self.store
            .insert_user(NewUser {
                id: user_id,
                tenant_id,
                username,
                email,
                password_hash,
            })
            .await
            .map_err(RegistrationError::UserCreateFailed)?;

        Ok(tenant_id)
    }

    pub async fn register_client_with_tenant(
        &self,
        client_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Uuid, RegistrationError> {
        self.store
            .find_tenant(tenant_id)
            .await
            .map_err(RegistrationError::StoreQueryFailed)?
            .ok_or(RegistrationError::TenantNotFound)?;

        let request_id = session_model::new_time_ordered_id();
        self.store
            .insert_join_request(NewJoinRequest {
                id: request_id,
                tenant_id,
                user_id: None,
                client_id: Some(client_id),
            })
            .await
            .map_err(RegistrationError::JoinRequestCreateFailed)
    }

    pub async fn authorize_join_request(
        &self,
        request_id: Uuid,
        admin_user_id: &str,
        approved: bool,
    ) -> Result<(), RegistrationError> {
        let request = self
            .store
            .find_join_request(request_id)
            .await
            .map_err(RegistrationError::StoreQueryFailed)?
            .ok_or(RegistrationError::JoinRequestNotFound)?;

        if request.status.is_terminal() {
            return Err(RegistrationError::JoinRequestNotPending);
        }

        let status = if approved {
            JoinRequestStatus::Approved
        } else {
            JoinRequestStatus::Rejected
        };

        self.store
            .update_join_request_status(request_id, status, admin_user_id)
            .await
            .map_err(RegistrationError::JoinRequestUpdateFailed)
    }

    pub async fn list_join_requests(&self, tenant_id: Uuid) -> Result<Vec<TenantJoinRequest>, RegistrationError> {
        self.store
            .list_join_requests(tenant_id)
            .await
            .map_err(RegistrationError::StoreQueryFailed)
    }
}

#[cfg(test)]
mod tests {
    use session_store::InMemoryStore;

    use super::*;

    fn service() -> RegistrationService {
        RegistrationService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn registers_a_user_with_a_new_tenant() {
        let service = service();
        let user_id = Uuid::now_v7();

        let tenant_id = service
            .register_user_with_tenant(user_id, "alice", "alice@example.com", "hash", "acme", true)
            .await
            .expect("register");

        assert_ne!(tenant_id, Uuid::nil());
    }

    #[tokio::test]
    async fn joining_an_existing_tenant_by_name_is_unsupported() {
        let service = service();
        let err = service
            .register_user_with_tenant(Uuid::now_v7(), "alice", "alice@example.com", "hash", "acme", false)
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::JoinByNameUnsupported));
    }

    #[tokio::test]
    async fn client_join_request_requires_an_existing_tenant() {
        let service = service();
        let err = service
            .register_client_with_tenant(Uuid::now_v7(), Uuid::now_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::TenantNotFound));
    }

    #[tokio::test]
    async fn approves_a_pending_join_request() {
        let service = service();
        let tenant_id = service
            .register_user_with_tenant(Uuid::now_v7(), "alice", "alice@example.com", "hash", "acme", true)
            .await
            .expect("register");

        let request_id = service
            .register_client_with_tenant(Uuid::now_v7(), tenant_id)
            .await
            .expect("join request");

        service
            .authorize_join_request(request_id, "admin-1", true)
            .await
            .expect("authorize");

        let requests = service.list_join_requests(tenant_id).await.expect("list");
        let approved = requests.iter().find(|r| r.id == request_id).expect("request present");
        assert!(approved.status.is_terminal());
    }

    #[tokio::test]
    async fn a_terminal_join_request_cannot_be_re_authorized() {
        let service = service();
        let tenant_id = service
            .register_user_with_tenant(Uuid::now_v7(), "alice", "alice@example.com", "hash", "acme", true)
            .await
            .expect("register");
        let request_id = service
            .register_client_with_tenant(Uuid::now_v7(), tenant_id)
            .await
            .expect("join request");

        service
            .authorize_join_request(request_id, "admin-1", false)
            .await
            .expect("first authorize");

        let err = service
            .authorize_join_request(request_id, "admin-1", true)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::JoinRequestNotPending));
    }
}
