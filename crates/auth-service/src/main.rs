use auth_service::config::Config;
use auth_service::crypto::BcryptHasher;
use auth_service::handlers::AppState;
use auth_service::routes::build_routes;
use auth_service::services::bootstrap::ensure_admin_user;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    tracing::info!("connected to database");

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("migrations applied");

    ensure_admin_user(&pool, &BcryptHasher::new(), &config.admin).await?;

    let state = Arc::new(AppState::new(pool, &config));
    let app = build_routes(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "auth service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
