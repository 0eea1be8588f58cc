use std::sync::Arc;

use account_service::account::eraser::AccountEraser;
use account_service::account::eraser::ErasureStores;
use account_service::config::Config;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::PostgresAccountRepository;
use account_service::outbound::repositories::PostgresMediaRecordRepository;
use account_service::outbound::repositories::PostgresMessageRepository;
use account_service::outbound::repositories::PostgresSubscriptionRepository;
use account_service::outbound::storage::FilesystemMediaStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        media_root = %config.storage.media_root.display(),
        legacy_sessions = config.auth.legacy_secret.is_some(),
        cookie_secure = config.auth.cookie_secure,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    tokio::fs::create_dir_all(&config.storage.media_root).await?;

    let authenticator = Arc::new(config.auth.authenticator());
    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool.clone()));

    let eraser = AccountEraser::new(
        ErasureStores {
            accounts: account_repository.clone(),
            subscriptions: Arc::new(PostgresSubscriptionRepository::new(pg_pool.clone())),
            media: Arc::new(FilesystemMediaStore::new(config.storage.media_root.clone())),
            media_records: Arc::new(PostgresMediaRecordRepository::new(pg_pool.clone())),
            messages: Arc::new(PostgresMessageRepository::new(pg_pool)),
        },
        config.erasure.step_policy(),
    );

    let account_service = Arc::new(AccountService::new(
        account_repository,
        Arc::clone(&authenticator),
        eraser,
        config.erasure.confirmation_phrase.clone(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(account_service, authenticator, config.auth.cookie_secure);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
