use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to create tenant")]
    TenantCreateFailed(#[source] session_store::StoreError),
    #[error("failed to create user")]
    UserCreateFailed(#[source] session_store::StoreError),
    #[error("joining a tenant by name is not supported")]
    JoinByNameUnsupported,
    #[error("tenant not found")]
    TenantNotFound,
    #[error("failed to create join request")]
    JoinRequestCreateFailed(#[source] session_store::StoreError),
    #[error("join request not found")]
    JoinRequestNotFound,
    #[error("join request is no longer pending")]
    JoinRequestNotPending,
    #[error("failed to update join request")]
    JoinRequestUpdateFailed(#[source] session_store::StoreError),
    #[error("store query failed")]
    StoreQueryFailed(#[source] session_store::StoreError),
}
