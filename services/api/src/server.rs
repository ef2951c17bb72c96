use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationStore, InMemoryDocumentStorage, SeededDirectory};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hiredesk::applications::{ConsoleService, ConsoleState, IntakeService};
use hiredesk::auth::{AuthService, Role, SessionSigner};
use hiredesk::config::AppConfig;
use hiredesk::error::AppError;
use hiredesk::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (metrics_layer, metrics_handle) = PrometheusMetricLayer::pair();
    let ready = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: ready.clone(),
        metrics: Arc::new(metrics_handle),
    };

    let store = Arc::new(InMemoryApplicationStore::default());
    let storage = Arc::new(InMemoryDocumentStorage::default());
    let directory = Arc::new(SeededDirectory::default());
    match config.admin_seed.as_ref() {
        Some(seed) => {
            directory.register(&seed.email, &seed.password, &seed.display_name, Role::Admin);
            info!(email = %seed.email, "seeded console admin account");
        }
        None => warn!("no admin account configured; every console login will be denied"),
    }

    let auth = Arc::new(AuthService::new(
        directory,
        SessionSigner::new(&config.auth.session_secret),
        config.auth.session_ttl(),
    ));
    let intake = Arc::new(IntakeService::new(store.clone(), storage));
    let console = ConsoleState {
        console: Arc::new(ConsoleService::new(store)),
        auth,
    };

    let app = with_application_routes(intake, console, config.uploads.clone())
        .layer(Extension(app_state))
        .layer(metrics_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ready.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiredesk intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
