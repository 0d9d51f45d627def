mod broker;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod profile;
mod recommend;
mod routes;
mod state;
#[cfg(test)]
mod testutil;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::broker::redis::RedisBroker;
use crate::broker::MessageBroker;
use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::consumer::{run_embedding_result_consumer, run_pending_reaper};
use crate::jobs::store::{JobStore, PgJobStore};
use crate::profile::consumer::run_resume_embedding_consumer;
use crate::profile::store::{PgProfileStore, ProfileStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Compass API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;

    // Initialize the Redis-backed message broker
    let redis_client = redis::Client::open(config.redis_url.clone())?;
    let broker: Arc<dyn MessageBroker> = Arc::new(RedisBroker::connect(redis_client).await?);
    info!("Redis broker connected");

    let jobs: Arc<dyn JobStore> = Arc::new(PgJobStore::new(pool.clone()));
    let profiles: Arc<dyn ProfileStore> = Arc::new(PgProfileStore::new(pool));

    // Result consumers run for the life of the process.
    {
        let broker = broker.clone();
        let jobs = jobs.clone();
        tokio::spawn(async move {
            if let Err(e) = run_embedding_result_consumer(broker, jobs).await {
                error!("Embedding result consumer exited: {e}");
            }
        });
    }
    {
        let broker = broker.clone();
        let profiles = profiles.clone();
        tokio::spawn(async move {
            if let Err(e) = run_resume_embedding_consumer(broker, profiles).await {
                error!("Resume embedding consumer exited: {e}");
            }
        });
    }

    // Optional staleness reaper, enabled by PENDING_JOB_TIMEOUT_SECS.
    if let Some(secs) = config.pending_job_timeout_secs {
        info!("Pending-job reaper enabled ({secs}s timeout)");
        let jobs = jobs.clone();
        tokio::spawn(run_pending_reaper(jobs, Duration::from_secs(secs)));
    }

    // Build app state and router
    let state = AppState {
        jobs,
        profiles,
        broker,
    };
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
