mod error;
mod service;

pub use error::RegistrationError;
pub use service::RegistrationService;
