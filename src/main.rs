use std::process::ExitCode;

use comment_sentiment::config::ServiceConfig;

#[tokio::main]
async fn main() -> ExitCode {
    comment_sentiment::init_tracing();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match comment_sentiment::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}
