use diesel::connection::SimpleConnection;
use diesel_migrations::MigrationHarness;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use mrkr::config::AppConfig;
use mrkr::db;
use mrkr::routes;
use mrkr::scan::pool::ScanPool;
use mrkr::state::AppState;
use mrkr::MIGRATIONS;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        max_workers = config.max_workers,
        "loaded configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    run_migrations(&pool)?;

    let (scan_pool, worker_handles) = ScanPool::spawn(
        pool.clone(),
        std::sync::Arc::new(config.clone()),
        config.max_workers,
    );

    let host = config.server_host.clone();
    let port = config.server_port;
    let state = AppState::new(pool, config, scan_pool);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!(%host, port, "listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = signal::ctrl_c() => {
            tracing::info!("received shutdown signal, draining scan workers");
        }
    }

    // `app` (and the `state.scan_pool` sender clone it carried) was dropped
    // when the branch above returned, closing the channel. Each worker's
    // `recv()` now resolves to `None` and the loop exits on its own; joining
    // here lets an in-flight scan finish instead of being cancelled mid-task.
    for handle in worker_handles {
        let _ = handle.await;
    }

    Ok(())
}

fn run_migrations(pool: &db::PgPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    conn.batch_execute("SET lock_timeout = '10s'")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow::anyhow!("failed to run migrations: {err}"))?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
