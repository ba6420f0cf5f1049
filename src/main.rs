//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; guards and gates live in the use cases.

use dotenv::dotenv;
use petgate::adapters::backend::{MockBackend, RestBackend};
use petgate::adapters::persistence::JsonFileStorage;
use petgate::adapters::ui::TuiInputPort;
use petgate::ports::{AdoptionRequestsPort, AuthApiPort, InputPort, StoragePort};
use petgate::shared::config::AppConfig;
use petgate::usecases::{
    ActionService, AuthService, DashboardRedirector, EligibilityGate, RouteGuard, SessionStore,
    ViewDispatcher,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config could not be read; using defaults");
        AppConfig::default()
    });

    // --- Session: client-local slots on disk, restored from the last run ---
    let session_path = PathBuf::from(cfg.session_path_or_default());
    info!(path = %session_path.display(), "session storage");
    let storage: Arc<dyn StoragePort> = Arc::new(JsonFileStorage::new(&session_path));
    let session = Arc::new(SessionStore::open(storage).await);

    // --- Backend: REST by default, in-memory demo data when offline ---
    let (adoptions, auth_api): (Arc<dyn AdoptionRequestsPort>, Arc<dyn AuthApiPort>) =
        if cfg.is_offline() {
            warn!("PETGATE_OFFLINE set, using in-memory demo backend");
            let mock = Arc::new(MockBackend::demo());
            (
                Arc::clone(&mock) as Arc<dyn AdoptionRequestsPort>,
                mock as Arc<dyn AuthApiPort>,
            )
        } else {
            let url = cfg.api_base_url_or_default();
            let timeout_secs = cfg.request_timeout_secs_or_default();
            info!(url = %url, timeout_secs, "using REST backend");
            let rest = Arc::new(
                RestBackend::new(url, Duration::from_secs(timeout_secs), Arc::clone(&session))
                    .map_err(|e| anyhow::anyhow!("{}", e))?,
            );
            (
                Arc::clone(&rest) as Arc<dyn AdoptionRequestsPort>,
                rest as Arc<dyn AuthApiPort>,
            )
        };

    // --- Services ---
    let eligibility = Arc::new(EligibilityGate::new(adoptions, Arc::clone(&session)));
    let dispatcher = Arc::new(ViewDispatcher::new(
        RouteGuard::new(Arc::clone(&session)),
        DashboardRedirector::new(Arc::clone(&session)),
        Arc::clone(&eligibility),
    ));
    let auth = Arc::new(AuthService::new(auth_api, Arc::clone(&session)));
    let actions = Arc::new(ActionService::new(Arc::clone(&session), eligibility));

    let input_port: Arc<dyn InputPort> =
        Arc::new(TuiInputPort::new(session, dispatcher, auth, actions));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
