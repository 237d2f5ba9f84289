use uuid::Uuid;

/// Mints a fresh 128-bit time-ordered identifier.
///
/// `SessionKey`, `Session`, and `TenantJoinRequest` ids are all UUIDv7: sortable by creation
/// time, which keeps `ORDER BY created_at DESC` and `ORDER BY id DESC` equivalent in practice.
pub fn new_time_ordered_id() -> Uuid {
    Uuid::now_v7()
}
