use std::ops::Deref;
use std::str::FromStr;

use async_trait::async_trait;
use bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use session_model::{
    BrowserSession, JoinRequestStatus, JweAlgorithm, JwsAlgorithm, NewJoinRequest, NewSession, NewSessionKey,
    NewUser, SessionAlgorithm, ServiceSession, SessionClass, SessionKeyRow, Tenant, TenantJoinRequest, User,
};
use time::OffsetDateTime;
use tokio_postgres::NoTls;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::Store;

/// Postgres-backed store. One pool, two tables per collection (browser/service), wrapping
/// `bb8`/`tokio-postgres`.
pub struct PostgresStore(Pool<PostgresConnectionManager<NoTls>>);

impl PostgresStore {
    pub fn new(pool: Pool<PostgresConnectionManager<NoTls>>) -> Self {
        Self(pool)
    }

    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let sql = include_str!("../schema/pg.sql");
        self.get().await?.batch_execute(sql).await?;
        Ok(())
    }
}

impl Deref for PostgresStore {
    type Target = Pool<PostgresConnectionManager<NoTls>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn session_key_table(class: SessionClass) -> &'static str {
    match class {
        SessionClass::Browser => "browser_session_jwks",
        SessionClass::Service => "service_session_jwks",
    }
}

fn parse_session_algorithm(s: &str) -> Result<SessionAlgorithm, StoreError> {
    if s == "OPAQUE" {
        return Ok(SessionAlgorithm::Opaque);
    }
    if let Ok(alg) = JwsAlgorithm::from_str(s) {
        return Ok(SessionAlgorithm::Jws(alg));
    }
    if let Ok(alg) = JweAlgorithm::from_str(s) {
        return Ok(SessionAlgorithm::Jwe(alg));
    }
    Err(StoreError::QueryFailed(anyhow::anyhow!(
        "row carries unrecognized algorithm {s}"
    )))
}

#[async_trait]
impl Store for PostgresStore {
    async fn find_active_session_key(
        &self,
        class: SessionClass,
        algorithm: &str,
    ) -> Result<Option<SessionKeyRow>, StoreError> {
        let table = session_key_table(class);
        let statement = format!(
            "SELECT id, encrypted_jwk, algorithm, active, created_at FROM {table} \
             WHERE active = true AND algorithm = $1 ORDER BY created_at DESC LIMIT 1"
        );

        let row = self.get().await?.query_opt(&statement, &[&algorithm]).await?;

        row.map(|row| {
            Ok(SessionKeyRow {
                id: row.get(0),
                encrypted_jwk: row.get(1),
                algorithm: parse_session_algorithm(row.get(2))?,
                active: row.get(3),
                created_at: row.get(4),
            })
        })
        .transpose()
    }

    async fn insert_session_key(&self, class: SessionClass, row: NewSessionKey<'_>) -> Result<Uuid, StoreError> {
        let table = session_key_table(class);
        let statement =
            format!("INSERT INTO {table} (id, encrypted_jwk, algorithm, active) VALUES ($1, $2, $3, true)");
        let algorithm = row.algorithm.to_string();
        self.get()
            .await?
            .execute(&statement, &[&row.id, &row.encrypted_jwk, &algorithm])
            .await?;
        Ok(row.id)
    }

    async fn load_session_key(&self, class: SessionClass, id: Uuid) -> Result<Option<SessionKeyRow>, StoreError> {
        let table = session_key_table(class);
        let statement = format!("SELECT id, encrypted_jwk, algorithm, active, created_at FROM {table} WHERE id = $1");

        let row = self.get().await?.query_opt(&statement, &[&id]).await?;

        row.map(|row| {
            Ok(SessionKeyRow {
                id: row.get(0),
                encrypted_jwk: row.get(1),
                algorithm: parse_session_algorithm(row.get(2))?,
                active: row.get(3),
                created_at: row.get(4),
            })
        })
        .transpose()
    }

    async fn insert_browser_session(&self, row: NewSession<'_>) -> Result<(), StoreError> {
        self.get()
            .await?
            .execute(
                "INSERT INTO browser_sessions (id, tenant_id, realm_id, token_hash, user_id, expiration, created_at, last_activity) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
                &[
                    &row.id,
                    &row.tenant_id,
                    &row.realm_id,
                    &row.token_hash,
                    &row.principal_id,
                    &row.expiration,
                    &row.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_browser_session_by_hash(&self, token_hash: &str) -> Result<Option<BrowserSession>, StoreError> {
        let row = self
            .get()
            .await?
            .query_opt(
                "SELECT id, tenant_id, realm_id, token_hash, user_id, expiration, created_at, last_activity \
                 FROM browser_sessions WHERE token_hash = $1 AND expiration > now()",
                &[&token_hash],
            )
            .await?;
        Ok(row.map(browser_session_from_row))
    }

    async fn find_browser_session_by_id(&self, id: Uuid) -> Result<Option<BrowserSession>, StoreError> {
        let row = self
            .get()
            .await?
            .query_opt(
                "SELECT id, tenant_id, realm_id, token_hash, user_id, expiration, created_at, last_activity \
                 FROM browser_sessions WHERE id = $1 AND expiration > now()",
                &[&id],
            )
            .await?;
        Ok(row.map(browser_session_from_row))
    }

    async fn touch_browser_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.get()
            .await?
            .execute("UPDATE browser_sessions SET last_activity = now() WHERE id = $1", &[&id])
            .await?;
        Ok(())
    }

    async fn delete_expired_browser_sessions(
        &self,
        now: OffsetDateTime,
        idle_cutoff: OffsetDateTime,
    ) -> Result<u64, StoreError> {
        let affected = self
            .get()
            .await?
            .execute(
                "DELETE FROM browser_sessions WHERE expiration < $1 OR (last_activity IS NOT NULL AND last_activity < $2)",
                &[&now, &idle_cutoff],
            )
            .await?;
        Ok(affected)
    }

    async fn insert_service_session(&self, row: NewSession<'_>) -> Result<(), StoreError> {
        self.get()
            .await?
            .execute(
                "INSERT INTO service_sessions (id, tenant_id, realm_id, token_hash, client_id, expiration, created_at, last_activity) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
                &[
                    &row.id,
                    &row.tenant_id,
                    &row.realm_id,
                    &row.token_hash,
                    &row.principal_id,
                    &row.expiration,
                    &row.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_service_session_by_hash(&self, token_hash: &str) -> Result<Option<ServiceSession>, StoreError> {
        let row = self
            .get()
            .await?
            .query_opt(
                "SELECT id, tenant_id, realm_id, token_hash, client_id, expiration, created_at, last_activity \
                 FROM service_sessions WHERE token_hash = $1 AND expiration > now()",
                &[&token_hash],
            )
            .await?;
        Ok(row.map(service_session_from_row))
    }

    async fn find_service_session_by_id(&self, id: Uuid) -> Result<Option<ServiceSession>, StoreError> {
        let row = self
            .get()
            .await?
            .query_opt(
                "SELECT id, tenant_id, realm_id, token_hash, client_id, expiration, created_at, last_activity \
                 FROM service_sessions WHERE id = $1 AND expiration > now()",
                &[&id],
            )
            .await?;
        Ok(row.map(service_session_from_row))
    }

    async fn touch_service_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.get()
            .await?
            .execute("UPDATE service_sessions SET last_activity = now() WHERE id = $1", &[&id])
            .await?;
        Ok(())
    }

    async fn delete_expired_service_sessions(
        &self,
        now: OffsetDateTime,
        idle_cutoff: OffsetDateTime,
    ) -> Result<u64, StoreError> {
        let affected = self
            .get()
            .await?
            .execute(
                "DELETE FROM service_sessions WHERE expiration < $1 OR (last_activity IS NOT NULL AND last_activity < $2)",
                &[&now, &idle_cutoff],
            )
            .await?;
        Ok(affected)
    }

    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let row = self
            .get()
            .await?
            .query_opt("SELECT id, name, created_at FROM tenant WHERE id = $1", &[&id])
            .await?;
        Ok(row.map(|row| Tenant {
            id: row.get(0),
            name: row.get(1),
            created_at: row.get(2),
        }))
    }

    async fn insert_tenant(&self, name: &str) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        self.get()
            .await?
            .execute("INSERT INTO tenant (id, name) VALUES ($1, $2)", &[&id, &name])
            .await?;
        Ok(id)
    }

    async fn insert_user(&self, user: NewUser<'_>) -> Result<(), StoreError> {
        self.get()
            .await?
            .execute(
                "INSERT INTO app_user (id, tenant_id, username, email, password_hash, active) VALUES ($1, $2, $3, $4, $5, true)",
                &[&user.id, &user.tenant_id, &user.username, &user.email, &user.password_hash],
            )
            .await?;
        Ok(())
    }

    async fn insert_join_request(&self, req: NewJoinRequest) -> Result<Uuid, StoreError> {
        self.get()
            .await?
            .execute(
                "INSERT INTO tenant_join_request (id, tenant_id, user_id, client_id, status) VALUES ($1, $2, $3, $4, 'pending')",
                &[&req.id, &req.tenant_id, &req.user_id, &req.client_id],
            )
            .await?;
        Ok(req.id)
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<TenantJoinRequest>, StoreError> {
        let row = self
            .get()
            .await?
            .query_opt(
                "SELECT id, tenant_id, user_id, client_id, status, requested_at, processed_at, processed_by \
                 FROM tenant_join_request WHERE id = $1",
                &[&id],
            )
            .await?;
        row.map(join_request_from_row).transpose()
    }

    async fn update_join_request_status(
        &self,
        id: Uuid,
        status: JoinRequestStatus,
        processed_by: &str,
    ) -> Result<(), StoreError> {
        self.get()
            .await?
            .execute(
                "UPDATE tenant_join_request SET status = $1, processed_at = now(), processed_by = $2 WHERE id = $3",
                &[&status.to_string(), &processed_by, &id],
            )
            .await?;
        Ok(())
    }

    async fn list_join_requests(&self, tenant_id: Uuid) -> Result<Vec<TenantJoinRequest>, StoreError> {
        let rows = self
            .get()
            .await?
            .query(
                "SELECT id, tenant_id, user_id, client_id, status, requested_at, processed_at, processed_by \
                 FROM tenant_join_request WHERE tenant_id = $1 ORDER BY requested_at",
                &[&tenant_id],
            )
            .await?;
        rows.into_iter().map(join_request_from_row).collect()
    }
}

fn browser_session_from_row(row: tokio_postgres::Row) -> BrowserSession {
    BrowserSession {
        id: row.get(0),
        tenant_id: row.get(1),
        realm_id: row.get(2),
        token_hash: row.get(3),
        user_id: row.get(4),
        expiration: row.get(5),
        created_at: row.get(6),
        last_activity: row.get(7),
    }
}

fn service_session_from_row(row: tokio_postgres::Row) -> ServiceSession {
    ServiceSession {
        id: row.get(0),
        tenant_id: row.get(1),
        realm_id: row.get(2),
        token_hash: row.get(3),
        client_id: row.get(4),
        expiration: row.get(5),
        created_at: row.get(6),
        last_activity: row.get(7),
    }
}

fn join_request_from_row(row: tokio_postgres::Row) -> Result<TenantJoinRequest, StoreError> {
    let status: String = row.get(4);
    let status = match status.as_str() {
        "pending" => JoinRequestStatus::Pending,
        "approved" => JoinRequestStatus::Approved,
        "rejected" => JoinRequestStatus::Rejected,
        other => {
            return Err(StoreError::QueryFailed(anyhow::anyhow!(
                "row carries unrecognized join request status {other}"
            )))
        }
    };

    Ok(TenantJoinRequest {
        id: row.get(0),
        tenant_id: row.get(1),
        user_id: row.get(2),
        client_id: row.get(3),
        status,
        requested_at: row.get(5),
        processed_at: row.get(6),
        processed_by: row.get(7),
    })
}
