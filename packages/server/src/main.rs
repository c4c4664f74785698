use anyhow::Context;
use api::Settings;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let settings = Settings::load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = settings.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!(backend = ?settings.storage.backend, "Starting notes server");
    server::launch(&settings).await
}
