mod api;
mod middleware;

use std::sync::Arc;

use sentiscope_classifier::{BackendRegistry, ClassifierConfig, SentimentAggregator};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = sentiscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let classifier_config = ClassifierConfig::from_app_config(&config);
    let registry = Arc::new(BackendRegistry::from_config(&classifier_config)?);
    let selection = registry.available_selection(classifier_config.selection);

    // Fail startup rather than every request when nothing is selected.
    let startup_check = SentimentAggregator::new(selection, &registry)?;
    let backends: Vec<_> = startup_check.backends().map(|kind| kind.model_name()).collect();
    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        ?backends,
        policy = ?classifier_config.policy,
        "starting sentiscope server"
    );

    let state = AppState {
        registry,
        selection,
        policy: classifier_config.policy,
    };
    let rate_limit = RateLimitState::per_minute(config.rate_limit_per_minute);
    let app = build_app(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
