use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use acct_api::{create_app, AppState, Stores};
use acct_core::domain::clock::SystemClock;
use acct_infra::{build_gateway, DatabasePool, MySqlStores};
use acct_shared::{AppConfig, LogFormat, LoggingConfig, StorageBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;
    config.validate().context("invalid configuration")?;

    info!(
        environment = ?config.environment,
        storage = ?config.database.backend,
        sms_provider = ?config.sms.provider,
        "Starting account service"
    );

    let state = build_state(&config).await?;
    let state = web::Data::new(state);

    let maintenance = state.maintenance_service.clone().start_background_task();

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let server_config = config.clone();
    let app_state = state.clone();
    let mut server = HttpServer::new(move || create_app(app_state.clone(), &server_config))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(handle) = maintenance {
        handle.abort();
    }
    if let Some(database) = &state.database {
        database.close().await;
    }
    info!("Account service stopped");
    Ok(())
}

/// Select the storage backend and wire the services
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let (stores, database) = match config.database.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            (Stores::in_memory(), None)
        }
        StorageBackend::Mysql => {
            let database = DatabasePool::new(config.database.clone())
                .await
                .context("failed to connect to MySQL")?;
            if config.database.run_migrations {
                database
                    .run_migrations()
                    .await
                    .context("failed to run database migrations")?;
            }
            (Stores::from(MySqlStores::new(&database)), Some(database))
        }
    };

    let sms = build_gateway(&config.sms, stores.sms_logs.clone())
        .context("failed to initialize SMS gateway")?;

    Ok(AppState::new(
        config,
        stores,
        sms,
        Arc::new(SystemClock),
        database,
    ))
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init()?,
    }

    Ok(())
}
