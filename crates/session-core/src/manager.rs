use std::sync::Arc;
use std::time::Duration;

use session_model::{BrowserSession, Session, ServiceSession, SessionAlgorithm, SessionClass};
use session_store::Store;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::SessionError;
use crate::jwe::JweEngine;
use crate::jws::JwsEngine;
use crate::opaque::OpaqueEngine;
use crate::registry::SessionKeyRegistry;

/// Per-class algorithm choice plus the timing knobs the cleanup sweep and the issued tokens'
/// `exp` both read from. Browser and service classes may run different algorithms; that is
/// first-class, not a special case.
#[derive(Clone, Copy, Debug)]
pub struct SessionManagerConfig {
    pub browser_algorithm: SessionAlgorithm,
    pub service_algorithm: SessionAlgorithm,
    pub browser_expiration: Duration,
    pub service_expiration: Duration,
    pub idle_timeout: Duration,
    pub cleanup_interval: Duration,
}

/// Dispatches issuance and validation to one of the three credential engines based on
/// per-class configuration. The dispatch set is closed: OPAQUE, JWS, JWE.
pub struct SessionManager {
    config: SessionManagerConfig,
    registry: Arc<SessionKeyRegistry>,
    opaque: Arc<OpaqueEngine>,
    jws: Arc<JwsEngine>,
    jwe: Arc<JweEngine>,
    store: Arc<dyn Store>,
}

impl SessionManager {
    pub fn new(
        config: SessionManagerConfig,
        registry: Arc<SessionKeyRegistry>,
        opaque: Arc<OpaqueEngine>,
        jws: Arc<JwsEngine>,
        jwe: Arc<JweEngine>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            config,
            registry,
            opaque,
            jws,
            jwe,
            store,
        }
    }

    pub fn registry_requirements(&self) -> impl Iterator<Item = (SessionClass, SessionAlgorithm)> {
        [
            (SessionClass::Browser, self.config.browser_algorithm),
            (SessionClass::Service, self.config.service_algorithm),
        ]
        .into_iter()
        .filter(|(_, alg)| !matches!(alg, SessionAlgorithm::Opaque))
    }

    /// Warms the session key for any class configured as JWS/JWE. Must not be called
    /// concurrently with itself or with issue/validate; the resolved key id is read-only
    /// afterward.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        for (class, algorithm) in self.registry_requirements() {
            self.registry.initialize_session_key(class, algorithm).await?;
        }
        Ok(())
    }

    pub async fn issue_browser(&self, user_id: &str, tenant_id: Uuid, realm_id: Uuid) -> Result<String, SessionError> {
        match self.config.browser_algorithm {
            SessionAlgorithm::Opaque => {
                self.opaque
                    .issue_browser(user_id, tenant_id, realm_id, self.config.browser_expiration)
                    .await
            }
            SessionAlgorithm::Jws(alg) => {
                self.jws
                    .issue(
                        SessionClass::Browser,
                        alg,
                        user_id,
                        tenant_id,
                        realm_id,
                        self.config.browser_expiration,
                    )
                    .await
            }
            SessionAlgorithm::Jwe(alg) => {
                self.jwe
                    .issue(
                        SessionClass::Browser,
                        alg,
                        user_id,
                        tenant_id,
                        realm_id,
                        self.config.browser_expiration,
                    )
                    .await
            }
        }
    }

    pub async fn issue_service(
        &self,
        client_id: &str,
        tenant_id: Uuid,
        realm_id: Uuid,
    ) -> Result<String, SessionError> {
        match self.config.service_algorithm {
            SessionAlgorithm::Opaque => {
                self.opaque
                    .issue_service(client_id, tenant_id, realm_id, self.config.service_expiration)
                    .await
            }
            SessionAlgorithm::Jws(alg) => {
                self.jws
                    .issue(
                        SessionClass::Service,
                        alg,
                        client_id,
                        tenant_id,
                        realm_id,
                        self.config.service_expiration,
                    )
                    .await
            }
            SessionAlgorithm::Jwe(alg) => {
                self.jwe
                    .issue(
                        SessionClass::Service,
                        alg,
                        client_id,
                        tenant_id,
                        realm_id,
                        self.config.service_expiration,
                    )
                    .await
            }
        }
    }

    pub async fn validate_browser(&self, token: &str) -> Result<BrowserSession, SessionError> {
        let session = match self.config.browser_algorithm {
            SessionAlgorithm::Opaque => return self.opaque.validate_browser(token).await,
            SessionAlgorithm::Jws(alg) => self.jws.validate(SessionClass::Browser, alg, token).await?,
            SessionAlgorithm::Jwe(alg) => self.jwe.validate(SessionClass::Browser, alg, token).await?,
        };
        match session {
            Session::Browser(s) => Ok(s),
            Session::Service(_) => Err(SessionError::SessionInvalid),
        }
    }

    pub async fn validate_service(&self, token: &str) -> Result<ServiceSession, SessionError> {
        let session = match self.config.service_algorithm {
            SessionAlgorithm::Opaque => return self.opaque.validate_service(token).await,
            SessionAlgorithm::Jws(alg) => self.jws.validate(SessionClass::Service, alg, token).await?,
            SessionAlgorithm::Jwe(alg) => self.jwe.validate(SessionClass::Service, alg, token).await?,
        };
        match session {
            Session::Service(s) => Ok(s),
            Session::Browser(_) => Err(SessionError::SessionInvalid),
        }
    }

    /// Deletes rows past `expiration` or idle past `idle_timeout`. Browser and service tables
    /// are swept independently; a service-table failure after a successful browser sweep does
    /// not roll the browser sweep back.
    pub async fn cleanup_expired(&self) -> Result<(u64, u64), SessionError> {
        let now = OffsetDateTime::now_utc();
        let idle_cutoff = now - self.config.idle_timeout;

        let browser_deleted = self
            .store
            .delete_expired_browser_sessions(now, idle_cutoff)
            .await
            .map_err(SessionError::BrowserCleanupFailed)?;

        let service_deleted = self
            .store
            .delete_expired_service_sessions(now, idle_cutoff)
            .await
            .map_err(SessionError::ServiceCleanupFailed)?;

        Ok((browser_deleted, service_deleted))
    }
}

#[cfg(test)]
mod tests {
    use session_crypto::{IdentityBarrier, PickyJose, PickyKeyGenerator, Sha256Hash};
    use session_model::JwsAlgorithm;
    use session_store::InMemoryStore;

    use super::*;

    fn manager(config: SessionManagerConfig) -> SessionManager {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let registry = Arc::new(SessionKeyRegistry::new(
            Arc::new(PickyKeyGenerator),
            Arc::new(PickyJose),
            Arc::new(IdentityBarrier),
            Arc::clone(&store),
        ));
        let opaque = Arc::new(OpaqueEngine::new(Arc::new(Sha256Hash), Arc::clone(&store)));
        let jws = Arc::new(JwsEngine::new(Arc::clone(&registry), Arc::new(PickyJose), Arc::clone(&store)));
        let jwe = Arc::new(JweEngine::new(Arc::clone(&registry), Arc::new(PickyJose), Arc::clone(&store)));

        SessionManager::new(config, registry, opaque, jws, jwe, store)
    }

    fn mixed_config() -> SessionManagerConfig {
        SessionManagerConfig {
            browser_algorithm: SessionAlgorithm::Opaque,
            service_algorithm: SessionAlgorithm::Jws(JwsAlgorithm::Rs256),
            browser_expiration: Duration::from_secs(3600),
            service_expiration: Duration::from_secs(3600),
            idle_timeout: Duration::from_secs(86_400),
            cleanup_interval: Duration::from_secs(300),
        }
    }

    #[tokio::test]
    async fn dispatches_browser_sessions_to_opaque_and_service_to_jws() {
        let manager = manager(mixed_config());
        manager.initialize().await.expect("initialize");

        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();

        let browser_token = manager.issue_browser("user-1", tenant_id, realm_id).await.expect("issue browser");
        assert!(Uuid::parse_str(&browser_token).is_ok(), "opaque tokens are bare identifiers");
        manager.validate_browser(&browser_token).await.expect("validate browser");

        let service_token = manager.issue_service("client-1", tenant_id, realm_id).await.expect("issue service");
        assert!(service_token.contains('.'), "JWS tokens are dot-separated");
        manager.validate_service(&service_token).await.expect("validate service");
    }

    #[tokio::test]
    async fn a_browser_token_does_not_validate_as_a_service_token() {
        let manager = manager(mixed_config());
        manager.initialize().await.expect("initialize");
        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();

        let browser_token = manager.issue_browser("user-1", tenant_id, realm_id).await.expect("issue browser");

        // The service class is configured for JWS; a bare opaque token cannot even parse as one.
        let err = manager.validate_service(&browser_token).await.unwrap_err();
        assert!(matches!(err, SessionError::TokenSignatureInvalid(_)));
    }

    #[tokio::test]
    async fn cleanup_sweeps_browser_and_service_tables_independently() {
        let manager = manager(SessionManagerConfig {
            browser_algorithm: SessionAlgorithm::Opaque,
            service_algorithm: SessionAlgorithm::Opaque,
            browser_expiration: Duration::from_secs(0),
            service_expiration: Duration::from_secs(3600),
            idle_timeout: Duration::from_secs(86_400),
            cleanup_interval: Duration::from_secs(300),
        });

        let tenant_id = Uuid::now_v7();
        let realm_id = Uuid::now_v7();
        manager.issue_browser("user-1", tenant_id, realm_id).await.expect("issue browser");
        manager.issue_service("client-1", tenant_id, realm_id).await.expect("issue service");

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let (browser_deleted, service_deleted) = manager.cleanup_expired().await.expect("cleanup");
        assert_eq!(browser_deleted, 1);
        assert_eq!(service_deleted, 0);
    }
}
