use async_trait::async_trait;
use session_model::{
    BrowserSession, JoinRequestStatus, NewJoinRequest, NewSession, NewSessionKey, NewUser, ServiceSession,
    SessionClass, SessionKeyRow, Tenant, TenantJoinRequest,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;

/// Simple CRUD with transactional row semantics; no advisory locks assumed. Every method is an
/// async suspension point, matching the concurrency model: all store-touching operations in the
/// session manager and registration service may run from many concurrent request handlers.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Session keys --

    async fn find_active_session_key(
        &self,
        class: SessionClass,
        algorithm: &str,
    ) -> Result<Option<SessionKeyRow>, StoreError>;

    async fn insert_session_key(&self, class: SessionClass, row: NewSessionKey<'_>) -> Result<Uuid, StoreError>;

    async fn load_session_key(&self, class: SessionClass, id: Uuid) -> Result<Option<SessionKeyRow>, StoreError>;

    // -- Browser sessions --

    async fn insert_browser_session(&self, row: NewSession<'_>) -> Result<(), StoreError>;

    async fn find_browser_session_by_hash(&self, token_hash: &str) -> Result<Option<BrowserSession>, StoreError>;

    async fn find_browser_session_by_id(&self, id: Uuid) -> Result<Option<BrowserSession>, StoreError>;

    async fn touch_browser_session(&self, id: Uuid) -> Result<(), StoreError>;

    /// Deletes rows with `expiration < now` or `last_activity < idle_cutoff`, matching the
    /// cleanup sweep predicate used by the session manager.
    async fn delete_expired_browser_sessions(
        &self,
        now: OffsetDateTime,
        idle_cutoff: OffsetDateTime,
    ) -> Result<u64, StoreError>;

    // -- Service sessions --

    async fn insert_service_session(&self, row: NewSession<'_>) -> Result<(), StoreError>;

    async fn find_service_session_by_hash(&self, token_hash: &str) -> Result<Option<ServiceSession>, StoreError>;

    async fn find_service_session_by_id(&self, id: Uuid) -> Result<Option<ServiceSession>, StoreError>;

    async fn touch_service_session(&self, id: Uuid) -> Result<(), StoreError>;

    async fn delete_expired_service_sessions(
        &self,
        now: OffsetDateTime,
        idle_cutoff: OffsetDateTime,
    ) -> Result<u64, StoreError>;

    // -- Tenants / users --

    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>, StoreError>;

    async fn insert_tenant(&self, name: &str) -> Result<Uuid, StoreError>;

    async fn insert_user(&self, user: NewUser<'_>) -> Result<(), StoreError>;

    // -- Join requests --

    async fn insert_join_request(&self, req: NewJoinRequest) -> Result<Uuid, StoreError>;

    async fn find_join_request(&self, id: Uuid) -> Result<Option<TenantJoinRequest>, StoreError>;

    async fn update_join_request_status(
        &self,
        id: Uuid,
        status: JoinRequestStatus,
        processed_by: &str,
    ) -> Result<(), StoreError>;

    async fn list_join_requests(&self, tenant_id: Uuid) -> Result<Vec<TenantJoinRequest>, StoreError>;
}
