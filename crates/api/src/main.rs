use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reviewhub_api::config::ServerConfig;
use reviewhub_api::engine::{JobRunner, JobTracker};
use reviewhub_api::router::build_app_router;
use reviewhub_api::state::AppState;
use reviewhub_api::ws;

use reviewhub_core::cancellation::CancelRegistry;
use reviewhub_db::repositories::JobRepo;
use reviewhub_pipeline::classifier::UncategorizedClassifier;
use reviewhub_pipeline::index_update::IndexUpdateExecutor;
use reviewhub_pipeline::review_processing::ReviewProcessingExecutor;
use reviewhub_pipeline::source::FsReviewSource;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = reviewhub_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    reviewhub_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    reviewhub_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // Jobs left processing by a previous process can never finish;
    // fail them before accepting new work.
    let orphaned = JobRepo::fail_orphaned(&pool, "Job was interrupted by server restart")
        .await
        .expect("Failed to sweep orphaned jobs");
    if orphaned > 0 {
        tracing::info!(orphaned, "Marked orphaned processing jobs as failed");
    }

    // --- Job engine ---
    let hub = Arc::new(ws::JobHub::new());
    let cancellations = Arc::new(CancelRegistry::new());
    let tracker = Arc::new(JobTracker::new(
        pool.clone(),
        Arc::clone(&hub),
        Arc::clone(&cancellations),
    ));

    let mut runner = JobRunner::new(Arc::clone(&tracker));
    runner.register(Arc::new(ReviewProcessingExecutor::new(
        pool.clone(),
        Arc::new(FsReviewSource),
        Arc::new(UncategorizedClassifier),
    )));
    runner.register(Arc::new(IndexUpdateExecutor::new(pool.clone())));
    let runner = Arc::new(runner);
    tracing::info!("Job engine initialized");

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&hub));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        hub: Arc::clone(&hub),
        tracker,
        runner,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    hub.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
