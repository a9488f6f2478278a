mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use svip_inspector::{ImageInspector, ProcessingDelay};
use svip_jobs::{BatchProcessor, JobRegistry};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = svip_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // The store master is loaded exactly once, before any request is
    // served; a missing or unparseable file aborts startup.
    let directory = Arc::new(svip_core::load_store_directory(&config.store_master_path)?);
    tracing::info!(
        stores = directory.len(),
        path = %config.store_master_path.display(),
        "store master loaded"
    );

    let delay =
        ProcessingDelay::from_bounds(config.inspector_delay_min_ms, config.inspector_delay_max_ms);
    let inspector = Arc::new(ImageInspector::new(
        config.inspector_timeout_secs,
        &config.inspector_user_agent,
        delay,
    )?);

    let registry = JobRegistry::new();
    let processor = BatchProcessor::new(registry.clone(), Arc::clone(&directory), inspector);
    let app = build_app(AppState {
        registry,
        processor,
        directory,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "svip server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
