use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dailystory_api::background;
use dailystory_api::config::{ScheduleConfig, ServerConfig};
use dailystory_api::router::build_app_router;
use dailystory_api::state::AppState;
use dailystory_db::PgStoryStore;
use dailystory_llm::{LlmConfig, OpenRouterClient};
use dailystory_pipeline::StoryService;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let schedule_config = ScheduleConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        dev_routes = config.enable_dev_routes,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections: u32 = match std::env::var("DATABASE_MAX_CONNECTIONS") {
        Ok(v) => v
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?,
        Err(_) => dailystory_db::DEFAULT_MAX_CONNECTIONS,
    };

    let pool = dailystory_db::create_pool(&database_url, max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!(max_connections, "Database connection pool created");

    dailystory_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    dailystory_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Story generation ---
    let generator =
        OpenRouterClient::new(LlmConfig::from_env()).context("Invalid LLM configuration")?;

    let service = Arc::new(
        StoryService::new(Arc::new(PgStoryStore::new(pool)), Arc::new(generator))
            .with_retry_policy(schedule_config.retry)
            .with_source(schedule_config.source.clone()),
    );

    // --- Daily scheduler ---
    let scheduler = background::start_daily_scheduler(Arc::clone(&service), &schedule_config);

    // --- App state ---
    let shutdown = CancellationToken::new();
    let state = AppState {
        service,
        shutdown: shutdown.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            signal_token.cancel();
        })
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(scheduler) = &scheduler {
        background::stop_daily_scheduler(
            scheduler,
            Duration::from_secs(config.shutdown_timeout_secs),
        )
        .await;
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches to
/// one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "dailystory_api=debug,dailystory_pipeline=debug,dailystory_llm=debug,tower_http=debug"
            .into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for SIGINT only");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    let sigint = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "SIGINT handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    let signal = tokio::select! {
        () = sigint => "SIGINT",
        () = sigterm => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down: draining connections and stopping scheduler");
}
