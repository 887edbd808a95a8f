//! Binary entrypoint for the Facegate API server.
use anyhow::Result;
use facegate_api::{config::AppConfig, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("facegate=info".parse()?))
        .init();

    let config = AppConfig::from_env()?;
    run(config).await
}
