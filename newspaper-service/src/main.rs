use newspaper_service::config::NewspaperConfig;
use newspaper_service::services::init_metrics;
use newspaper_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("newspaper-service", "info", otlp_endpoint.as_deref())?;

    init_metrics()?;

    let config = NewspaperConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
