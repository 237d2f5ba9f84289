use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use session_model::{
    BrowserSession, JoinRequestStatus, NewJoinRequest, NewSession, NewSessionKey, NewUser, ServiceSession,
    SessionClass, SessionKeyRow, Tenant, TenantJoinRequest, User,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::Store;

/// An in-process test double. Never used by the production binary; exists so the engines and
/// their tests don't need a live Postgres instance.
#[derive(Default)]
pub struct InMemoryStore {
    browser_keys: RwLock<HashMap<Uuid, SessionKeyRow>>,
    service_keys: RwLock<HashMap<Uuid, SessionKeyRow>>,
    browser_sessions: RwLock<HashMap<Uuid, BrowserSession>>,
    service_sessions: RwLock<HashMap<Uuid, ServiceSession>>,
    tenants: RwLock<HashMap<Uuid, Tenant>>,
    users: RwLock<Vec<User>>,
    join_requests: RwLock<HashMap<Uuid, TenantJoinRequest>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys_for(&self, class: SessionClass) -> &RwLock<HashMap<Uuid, SessionKeyRow>> {
        match class {
            SessionClass::Browser => &self.browser_keys,
            SessionClass::Service => &self.service_keys,
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_active_session_key(
        &self,
        class: SessionClass,
        algorithm: &str,
    ) -> Result<Option<SessionKeyRow>, StoreError> {
        let keys = self.keys_for(class).read().expect("lock poisoned");
        let mut candidates: Vec<&SessionKeyRow> = keys
            .values()
            .filter(|row| row.active && row.algorithm.to_string() == algorithm)
            .collect();
        candidates.sort_by_key(|row| row.created_at);
        Ok(candidates.last().map(|row| (*row).clone()))
    }

    async fn insert_session_key(&self, class: SessionClass, row: NewSessionKey<'_>) -> Result<Uuid, StoreError> {
        let id = row.id;
        let stored = SessionKeyRow {
            id,
            encrypted_jwk: row.encrypted_jwk.to_vec(),
            algorithm: row.algorithm,
            active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.keys_for(class).write().expect("lock poisoned").insert(id, stored);
        Ok(id)
    }

    async fn load_session_key(&self, class: SessionClass, id: Uuid) -> Result<Option<SessionKeyRow>, StoreError> {
        Ok(self.keys_for(class).read().expect("lock poisoned").get(&id).cloned())
    }

    async fn insert_browser_session(&self, row: NewSession<'_>) -> Result<(), StoreError> {
        let now = OffsetDateTime::now_utc();
        let session = BrowserSession {
            id: row.id,
            tenant_id: row.tenant_id,
            realm_id: row.realm_id,
            token_hash: row.token_hash.to_owned(),
            user_id: Some(row.principal_id.to_owned()),
            expiration: row.expiration,
            created_at: row.created_at,
            last_activity: Some(now),
        };
        self.browser_sessions
            .write()
            .expect("lock poisoned")
            .insert(session.id, session);
        Ok(())
    }

    async fn find_browser_session_by_hash(&self, token_hash: &str) -> Result<Option<BrowserSession>, StoreError> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .browser_sessions
            .read()
            .expect("lock poisoned")
            .values()
            .find(|s| s.token_hash == token_hash && s.expiration > now)
            .cloned())
    }

    async fn find_browser_session_by_id(&self, id: Uuid) -> Result<Option<BrowserSession>, StoreError> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .browser_sessions
            .read()
            .expect("lock poisoned")
            .get(&id)
            .filter(|s| s.expiration > now)
            .cloned())
    }

    async fn touch_browser_session(&self, id: Uuid) -> Result<(), StoreError> {
        if let Some(session) = self.browser_sessions.write().expect("lock poisoned").get_mut(&id) {
            session.last_activity = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn delete_expired_browser_sessions(
        &self,
        now: OffsetDateTime,
        idle_cutoff: OffsetDateTime,
    ) -> Result<u64, StoreError> {
        let mut sessions = self.browser_sessions.write().expect("lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, s| s.expiration >= now && s.last_activity.is_none_or(|t| t >= idle_cutoff));
        Ok((before - sessions.len()) as u64)
    }

    async fn insert_service_session(&self, row: NewSession<'_>) -> Result<(), StoreError> {
        let now = OffsetDateTime::now_utc();
        let session = ServiceSession {
            id: row.id,
            tenant_id: row.tenant_id,
            realm_id: row.realm_id,
            token_hash: row.token_hash.to_owned(),
            client_id: Some(row.principal_id.to_owned()),
            expiration: row.expiration,
            created_at: row.created_at,
            last_activity: Some(now),
        };
        self.service_sessions
            .write()
            .expect("lock poisoned")
            .insert(session.id, session);
        Ok(())
    }

    async fn find_service_session_by_hash(&self, token_hash: &str) -> Result<Option<ServiceSession>, StoreError> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .service_sessions
            .read()
            .expect("lock poisoned")
            .values()
            .find(|s| s.token_hash == token_hash && s.expiration > now)
            .cloned())
    }

    async fn find_service_session_by_id(&self, id: Uuid) -> Result<Option<ServiceSession>, StoreError> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .service_sessions
            .read()
            .expect("lock poisoned")
            .get(&id)
            .filter(|s| s.expiration > now)
            .cloned())
    }

    async fn touch_service_session(&self, id: Uuid) -> Result<(), StoreError> {
        if let Some(session) = self.service_sessions.write().expect("lock poisoned").get_mut(&id) {
            session.last_activity = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn delete_expired_service_sessions(
        &self,
        now: OffsetDateTime,
        idle_cutoff: OffsetDateTime,
    ) -> Result<u64, StoreError> {
        let mut sessions = self.service_sessions.write().expect("lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, s| s.expiration >= now && s.last_activity.is_none_or(|t| t >= idle_cutoff));
        Ok((before - sessions.len()) as u64)
    }

    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tenants.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn insert_tenant(&self, name: &str) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        let tenant = Tenant {
            id,
            name: name.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.tenants.write().expect("lock poisoned").insert(id, tenant);
        Ok(id)
    }

    async fn insert_user(&self, user: NewUser<'_>) -> Result<(), StoreError> {
        let now = OffsetDateTime::now_utc();
        self.users.write().expect("lock poisoned").push(User {
            id: user.id,
            tenant_id: user.tenant_id,
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            password_hash: user.password_hash.to_owned(),
            active: true,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn insert_join_request(&self, req: NewJoinRequest) -> Result<Uuid, StoreError> {
        let request = TenantJoinRequest {
            id: req.id,
            tenant_id: req.tenant_id,
            user_id: req.user_id,
            client_id: req.client_id,
            status: JoinRequestStatus::Pending,
            requested_at: OffsetDateTime::now_utc(),
            processed_at: None,
            processed_by: None,
        };
        let id = request.id;
        self.join_requests.write().expect("lock poisoned").insert(id, request);
        Ok(id)
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<TenantJoinRequest>, StoreError> {
        Ok(self.join_requests.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn update_join_request_status(
        &self,
        id: Uuid,
        status: JoinRequestStatus,
        processed_by: &str,
    ) -> Result<(), StoreError> {
        let mut requests = self.join_requests.write().expect("lock poisoned");
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::UpdateFailed(anyhow::anyhow!("join request {id} not found")))?;
        request.status = status;
        request.processed_at = Some(OffsetDateTime::now_utc());
        request.processed_by = Some(processed_by.to_owned());
        Ok(())
    }

    async fn list_join_requests(&self, tenant_id: Uuid) -> Result<Vec<TenantJoinRequest>, StoreError> {
        Ok(self
            .join_requests
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}
