use time::OffsetDateTime;
use uuid::Uuid;

use crate::algorithm::SessionAlgorithm;

/// Which parallel collection a session (or session key) belongs to.
///
/// Browser and service sessions never share a table, a key, or a Rust type further up the
/// stack; this tag only exists where a single function needs to act on "whichever one".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionClass {
    Browser,
    Service,
}

impl SessionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Service => "service",
        }
    }
}

/// A signing/encryption key reused across session issuances until process restart.
#[derive(Clone, Debug)]
pub struct SessionKeyRow {
    pub id: Uuid,
    pub encrypted_jwk: Vec<u8>,
    pub algorithm: SessionAlgorithm,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

pub struct NewSessionKey<'a> {
    pub id: Uuid,
    pub encrypted_jwk: &'a [u8],
    pub algorithm: SessionAlgorithm,
}

/// A browser-class session row (`browser_sessions`).
#[derive(Clone, Debug)]
pub struct BrowserSession {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub realm_id: Uuid,
    pub token_hash: String,
    pub user_id: Option<String>,
    pub expiration: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub last_activity: Option<OffsetDateTime>,
}

/// A service-class session row (`service_sessions`).
#[derive(Clone, Debug)]
pub struct ServiceSession {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub realm_id: Uuid,
    pub token_hash: String,
    pub client_id: Option<String>,
    pub expiration: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub last_activity: Option<OffsetDateTime>,
}

/// Row shape the engines hand to the store on issuance, before a class-specific principal
/// column (`user_id` or `client_id`) is attached by the caller.
pub struct NewSession<'a> {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub realm_id: Uuid,
    pub token_hash: &'a str,
    pub principal_id: &'a str,
    pub expiration: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// Either a `BrowserSession` or a `ServiceSession`, used where a caller truly does not care which
/// (e.g. generic cleanup-sweep bookkeeping). The issue/validate paths never return this; they
/// return the concrete type for their class.
#[derive(Clone, Debug)]
pub enum Session {
    Browser(BrowserSession),
    Service(ServiceSession),
}
