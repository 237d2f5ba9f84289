use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use session_core::{JweEngine, JwsEngine, OpaqueEngine, SessionError, SessionKeyRegistry, SessionManager, SessionManagerConfig};
use session_crypto::{IdentityBarrier, JoseCodec, PickyJose, PickyKeyGenerator, Sha256Hash};
use session_model::{JweAlgorithm, JwsAlgorithm, SessionAlgorithm, SessionClass};
use session_store::{InMemoryStore, Store};
use uuid::Uuid;

fn stack(config: SessionManagerConfig) -> (SessionManager, Arc<dyn Store>, Arc<SessionKeyRegistry>) {
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

    let manager = SessionManager::new(config, Arc::clone(&registry), opaque, jws, jwe, store.clone());
    (manager, store, registry)
}

fn opaque_config() -> SessionManagerConfig {
    SessionManagerConfig {
        browser_algorithm: SessionAlgorithm::Opaque,
        service_algorithm: SessionAlgorithm::Opaque,
        browser_expiration: Duration::from_secs(3600),
        service_expiration: Duration::from_secs(3600),
        idle_timeout: Duration::from_secs(86_400),
        cleanup_interval: Duration::from_secs(300),
    }
}

// An OPAQUE browser session round trip, and an unknown token is rejected.
#[tokio::test]
async fn opaque_browser_session_round_trip() {
    let (manager, _store, _registry) = stack(opaque_config());
    let tenant_id = Uuid::now_v7();
    let realm_id = Uuid::now_v7();

    let token = manager.issue_browser("user-1", tenant_id, realm_id).await.expect("issue");
    assert_eq!(token.len(), 36, "an OPAQUE token is a bare UUID string");

    let session = manager.validate_browser(&token).await.expect("validate");
    assert_eq!(session.user_id.as_deref(), Some("user-1"));
    assert_eq!(session.tenant_id, tenant_id);
    assert_eq!(session.realm_id, realm_id);

    let err = manager
        .validate_browser("aaaaaaaa-aaaa-7aaa-8aaa-aaaaaaaaaaaa")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::SessionInvalid));
}

// A JWS session whose DB row is gone by the time of validation is revoked even though its
// signature and `exp` are still valid.
#[tokio::test]
async fn jws_session_revoked_after_its_row_disappears() {
    let config = SessionManagerConfig {
        browser_algorithm: SessionAlgorithm::Jws(JwsAlgorithm::Rs256),
        ..opaque_config()
    };
    let (manager, store, _registry) = stack(config);
    manager.initialize().await.expect("initialize");

    let tenant_id = Uuid::now_v7();
    let realm_id = Uuid::now_v7();
    let token = manager.issue_browser("user-2", tenant_id, realm_id).await.expect("issue");

    manager.validate_browser(&token).await.expect("valid before revocation");

    store
        .delete_expired_browser_sessions(
            time::OffsetDateTime::now_utc() + Duration::from_secs(7200),
            time::OffsetDateTime::now_utc() - Duration::from_secs(86_400),
        )
        .await
        .expect("sweep");

    let err = manager.validate_browser(&token).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionRevoked));
}

// A JWE token whose decrypted `jti` is not a valid identifier is rejected at claims parsing,
// not mistaken for an unknown session.
#[tokio::test]
async fn jwe_token_with_invalid_jti_is_rejected() {
    let config = SessionManagerConfig {
        browser_algorithm: SessionAlgorithm::Jwe(JweAlgorithm::DirA256Gcm),
        ..opaque_config()
    };
    let (manager, _store, registry) = stack(config);
    manager.initialize().await.expect("initialize");

    let key_id = registry
        .initialize_session_key(SessionClass::Browser, SessionAlgorithm::Jwe(JweAlgorithm::DirA256Gcm))
        .await
        .expect("key id");
    let key = registry.load_key(SessionClass::Browser, key_id).await.expect("key");

    let claims = json!({
        "jti": "not-a-uuid",
        "iat": 0,
        "exp": time::OffsetDateTime::now_utc().unix_timestamp() + 3600,
        "sub": "user-3",
        "tenant_id": Uuid::now_v7().to_string(),
        "realm_id": Uuid::now_v7().to_string(),
    });
    let token = PickyJose.encrypt(&key, &claims, JweAlgorithm::DirA256Gcm).expect("encrypt");

    let err = manager.validate_browser(&token).await.unwrap_err();
    assert!(matches!(err, SessionError::ClaimJtiInvalid));
}

// A JWS token missing the `exp` claim entirely is rejected with its own error kind, not a
// generic parse failure.
#[tokio::test]
async fn jws_token_missing_exp_is_rejected() {
    let config = SessionManagerConfig {
        browser_algorithm: SessionAlgorithm::Jws(JwsAlgorithm::Rs256),
        ..opaque_config()
    };
    let (manager, _store, registry) = stack(config);
    manager.initialize().await.expect("initialize");

    let key_id = registry
        .initialize_session_key(SessionClass::Browser, SessionAlgorithm::Jws(JwsAlgorithm::Rs256))
        .await
        .expect("key id");
    let key = registry.load_key(SessionClass::Browser, key_id).await.expect("key");

    let claims = json!({
        "jti": Uuid::now_v7().to_string(),
        "sub": "user-4",
        "tenant_id": Uuid::now_v7().to_string(),
        "realm_id": Uuid::now_v7().to_string(),
    });
    let token = PickyJose.sign(&key, &claims).expect("sign");

    let err = manager.validate_browser(&token).await.unwrap_err();
    assert!(matches!(err, SessionError::ClaimExpMissing));
}

// The background cleanup task actually removes an idle session on its own schedule.
#[tokio::test]
async fn cleanup_task_removes_idle_sessions_on_schedule() {
    let config = SessionManagerConfig {
        idle_timeout: Duration::from_millis(1),
        cleanup_interval: Duration::from_millis(50),
        ..opaque_config()
    };
    let (manager, _store, _registry) = stack(config);

    let tenant_id = Uuid::now_v7();
    let realm_id = Uuid::now_v7();
    let token = manager.issue_browser("user-5", tenant_id, realm_id).await.expect("issue");

    manager.validate_browser(&token).await.expect("valid right after issuance");

    let manager = Arc::new(manager);
    let (handle, signal) = session_task::ShutdownHandle::new();
    let task = session_task::spawn_task(
        session_core::CleanupTask::new(Arc::clone(&manager), Duration::from_millis(50)),
        signal,
    );

    tokio::time::sleep(Duration::from_millis(300)).await;

    let err = manager.validate_browser(&token).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionInvalid));

    handle.signal();
    task.join().await.expect("cleanup task did not panic");
}
