use thiserror::Error;

/// Errors surfaced by the validation façade: argument rejection happens here, before any
/// delegation to the session manager or the registration service.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    Session(#[from] session_core::SessionError),
    #[error(transparent)]
    Registration(#[from] session_registration::RegistrationError),
}
