//! LiveChat Server: real-time presence and messaging hub
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt};

use chathub_api::AppState;
use chathub_auth::JwtDecoder;
use chathub_core::config::AppConfig;
use chathub_core::error::AppError;
use chathub_database::migration::run_migrations;
use chathub_database::{ActivityRepository, ChatRepository, DatabasePool, UserRepository};
use chathub_realtime::{Collaborators, RealtimeEngine};
use chathub_worker::{CronScheduler, InactivityCleanupJob};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("CHATHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting LiveChat hub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    create_data_directory(&config).await?;
    let db_pool = DatabasePool::connect(&config.database).await?;
    run_migrations(db_pool.pool()).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let user_repo = UserRepository::new(db_pool.pool().clone());
    let chat_repo = ChatRepository::new(db_pool.pool().clone());
    let activity_repo = ActivityRepository::new(db_pool.pool().clone());

    // ── Step 3: Realtime engine ──────────────────────────────────
    tracing::info!("Initializing realtime engine...");
    let realtime = RealtimeEngine::new(
        config.realtime.clone(),
        Collaborators {
            tokens: Arc::new(JwtDecoder::new(&config.auth)),
            users: Arc::new(user_repo),
            chats: Arc::new(chat_repo),
            activity: Arc::new(activity_repo.clone()),
        },
    );

    // ── Step 4: Background scheduler ─────────────────────────────
    let mut scheduler = if config.worker.enabled {
        tracing::info!("Starting background scheduler...");
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_inactivity_cleanup(
                &config.worker.cleanup_cron,
                InactivityCleanupJob::new(activity_repo, config.worker.inactivity_minutes),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background scheduler disabled");
        None
    };

    // ── Step 5: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let app_state = AppState::new(config, db_pool.clone(), realtime.clone());
    let app = chathub_api::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("LiveChat hub listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    // Upgraded sockets keep the server future alive, so live connections
    // are closed as soon as the signal arrives.
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown_engine = realtime.clone();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received, starting graceful shutdown...");
                shutdown_engine.close_all();
                let _ = signalled_tx.send(());
            })
            .into_future(),
    );

    let finished = tokio::select! {
        finished = &mut server => Some(finished),
        _ = signalled_rx => None,
    };
    let finished = match finished {
        Some(finished) => Some(finished),
        None => tokio::time::timeout(grace, &mut server).await.ok(),
    };
    match finished {
        Some(Ok(result)) => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?
        }
        Some(Err(e)) => return Err(AppError::internal(format!("Server task failed: {}", e))),
        None => {
            tracing::warn!(
                remaining = realtime.connection_count(),
                "Connections still open after grace period"
            );
            server.abort();
        }
    }

    // ── Step 7: Stop background tasks ────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }
    db_pool.close().await;

    tracing::info!("LiveChat hub shut down gracefully");
    Ok(())
}

/// Create the directory holding the SQLite file, if the url names one
async fn create_data_directory(config: &AppConfig) -> Result<(), AppError> {
    let path = config
        .database
        .url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(dir) = std::path::Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::internal(format!("Failed to create dir '{}': {}", dir.display(), e))
            })?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
