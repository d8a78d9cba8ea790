//! Seed the initial administrator account. Run once against a fresh
//! database; does nothing if the admin username already exists.

use panel_auth::{
    config::Config,
    db,
    error::AppError,
    models::{Role, User},
    observability::logging::init_tracing,
    store::{CredentialStore, PgStore},
    utils::{hash_password, Password},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.service_name, &config.log_level);

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

    let store = PgStore::new(pool);

    if store.find_by_username("admin").await?.is_some() {
        tracing::info!("Admin user already exists, nothing to do");
        return Ok(());
    }

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let hash = hash_password(&Password::new(password))?;
    let admin = User::new(
        "admin".to_string(),
        "admin".to_string(),
        "admin".to_string(),
        email,
        hash.into_string(),
        Role::Admin,
    );

    store.insert(&admin).await?;

    tracing::info!(user_id = %admin.user_id, "Admin user created");
    Ok(())
}
