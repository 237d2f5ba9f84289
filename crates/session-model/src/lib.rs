//! Domain types shared by every component of the session authentication core.
//!
//! Nothing in this crate touches a store, a socket, or a crypto primitive; it only describes the
//! shapes that flow between components.

mod algorithm;
mod ids;
mod join_request;
mod session;
mod tenant;

pub use algorithm::{JweAlgorithm, JwsAlgorithm, SessionAlgorithm};
pub use ids::new_time_ordered_id;
pub use join_request::{JoinRequestStatus, NewJoinRequest, TenantJoinRequest};
pub use session::{
    BrowserSession, NewSession, NewSessionKey, ServiceSession, Session, SessionClass, SessionKeyRow,
};
pub use tenant::{NewUser, Tenant, User};

use time::OffsetDateTime;
use uuid::Uuid;

/// Convenience alias; every identifier in this system is a time-ordered UUID (v7).
pub type Id = Uuid;
pub type Timestamp = OffsetDateTime;
