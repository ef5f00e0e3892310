//! Terrain API service entry point.

use anyhow::{Context, Result};
use axum::{extract::Extension, routing::get, Router};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use terrain_api::config::{Args, ServerConfig};
use terrain_api::handlers::metrics_handler;
use terrain_api::state::AppState;
use terrain_api::build_router;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let threads = args.worker_threads.unwrap_or_else(num_cpus::get);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()?;
    runtime.block_on(async_main(args, threads))
}

async fn async_main(args: Args, threads: usize) -> Result<()> {
    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).json().finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(worker_threads = threads, "Starting terrain API");

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    let config = ServerConfig::from_args(&args)?;
    let listen = config.listen;
    let state = Arc::new(AppState::new(config)?);

    let app = build_router(state).merge(
        Router::new()
            .route("/metrics", get(metrics_handler))
            .layer(Extension(prometheus_handle)),
    );

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;
    info!(address = %listen, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
