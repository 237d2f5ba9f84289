use core::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// `pending` is the only non-terminal state; `approved`/`rejected` are sticky.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl JoinRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// Either `user_id` or `client_id` is set, never both — enforced by the registration service,
/// not by this type (the store schema keeps both columns nullable).
#[derive(Clone, Debug)]
pub struct TenantJoinRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: JoinRequestStatus,
    pub requested_at: OffsetDateTime,
    pub processed_at: Option<OffsetDateTime>,
    pub processed_by: Option<String>,
}

pub struct NewJoinRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}
