use std::sync::Arc;

use anyhow::Context as _;
use session_auth::{
    Config, IdentityBarrier, PickyJose, PickyKeyGenerator, RegistrationService, Sha256Hash, Store, ValidationFacade,
};
use session_core::{CleanupTask, JweEngine, JwsEngine, OpaqueEngine, SessionKeyRegistry, SessionManager, SessionManagerConfig};
use session_store::InMemoryStore;
use session_task::ShutdownHandle;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let conf_file = session_auth::ConfFile::generate_new();
    let config = Config::from_conf_file(&conf_file).context("invalid configuration")?;

    info!(id = %config.id, hostname = %config.hostname, "Starting session authentication core");

    // A real deployment wires `PostgresStore::connect(&config.database_url)` here; the
    // in-memory store keeps this entry point runnable without an external dependency.
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());

    // Barrier keying is process-start configuration, not covered by this template; a root key
    // would normally come from a KMS or a sealed file.
    let barrier: Arc<dyn session_auth::Barrier> = Arc::new(IdentityBarrier);
    let jose = Arc::new(PickyJose);
    let keygen = Arc::new(PickyKeyGenerator);
    let hasher: Arc<dyn session_auth::DeterministicHash> = Arc::new(Sha256Hash);

    let registry = Arc::new(SessionKeyRegistry::new(
        keygen,
        jose.clone(),
        barrier,
        Arc::clone(&store),
    ));

    let opaque = Arc::new(OpaqueEngine::new(hasher, Arc::clone(&store)));
    let jws = Arc::new(JwsEngine::new(Arc::clone(&registry), jose.clone(), Arc::clone(&store)));
    let jwe = Arc::new(JweEngine::new(Arc::clone(&registry), jose, Arc::clone(&store)));

    let manager_config = SessionManagerConfig {
        browser_algorithm: config.browser_algorithm,
        service_algorithm: config.service_algorithm,
        browser_expiration: config.browser_expiration,
        service_expiration: config.service_expiration,
        idle_timeout: config.idle_timeout,
        cleanup_interval: config.cleanup_interval,
    };

    let manager = Arc::new(SessionManager::new(
        manager_config,
        registry,
        opaque,
        jws,
        jwe,
        Arc::clone(&store),
    ));
    manager.initialize().await.context("failed to initialize session keys")?;

    let registration = Arc::new(RegistrationService::new(store));
    // The façade is the entry point request handlers would hold on to; this template only
    // needs it constructed to prove the wiring compiles end to end.
    let _facade = ValidationFacade::new(Arc::clone(&manager), registration);

    let (shutdown_handle, shutdown_signal) = ShutdownHandle::new();
    let cleanup_task = session_task::spawn_task(CleanupTask::new(manager, config.cleanup_interval), shutdown_signal);

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("Shutdown requested");

    shutdown_handle.signal();
    shutdown_handle.all_closed().await;
    let _ = cleanup_task.join().await;

    Ok(())
}

fn init_logging() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    Ok(())
}
