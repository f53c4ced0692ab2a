pub mod api;
pub mod config;
pub mod inference;
pub mod predictor;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::ServeError;
use crate::config::ServiceConfig;
use crate::inference::SentimentService;
use crate::predictor::PredictorAdapter;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load the model, serve until Ctrl-C, then drain in-flight requests.
///
/// A missing or invalid model artifact does not stop startup: the service
/// comes up reporting `unavailable` and prediction calls return 503.
pub async fn run(config: ServiceConfig) -> Result<(), ServeError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let adapter = Arc::new(PredictorAdapter::load(&config.model_path));
    let service = SentimentService::new(adapter);
    let config = Arc::new(config);

    tracing::info!(
        batch_mode = %config.batch_mode,
        expose_docs = config.expose_docs,
        origins = config.allowed_origins.len(),
        "Configuration loaded"
    );

    let mut server = api::start_server(service, config).await?;
    tracing::info!(
        session_id = %server.session.session_id,
        addr = %server.session.server_addr,
        "Listening"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown();
    server.stopped().await;
    Ok(())
}
