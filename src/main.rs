use panel_auth::{
    build_router,
    config::Config,
    db,
    observability::logging::init_tracing,
    services::{AccountService, JwtService, SessionManager, SmtpEmailService},
    store::{CredentialStore, PgStore, TokenLedger},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), panel_auth::error::AppError> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid
    let config = Config::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting authentication service"
    );

    // Database pool and schema
    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| panel_auth::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| panel_auth::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;

    let store = Arc::new(PgStore::new(pool));
    let users: Arc<dyn CredentialStore> = store.clone();
    let ledger: Arc<dyn TokenLedger> = store.clone();

    // Notification gateway
    let email = Arc::new(SmtpEmailService::new(&config.smtp)?);
    tracing::info!("Email service initialized");

    // Token codec
    let jwt = JwtService::new(&config.jwt);
    tracing::info!("JWT service initialized");

    // Services
    let sessions = SessionManager::new(
        users.clone(),
        ledger.clone(),
        jwt.clone(),
        email,
        config.admin_url.clone(),
    );
    let accounts = AccountService::new(users.clone(), ledger.clone());

    let state = AppState {
        config: config.clone(),
        users,
        ledger,
        jwt,
        sessions,
        accounts,
    };

    let app = build_router(state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
