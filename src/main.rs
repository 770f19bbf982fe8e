use anyhow::Result;
use weather_proxy::{WeatherProxyConfig, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WeatherProxyConfig::load()?;
    let _telemetry = telemetry::init(&config.logging)?;

    tracing::info!("Starting weather proxy v{}", weather_proxy::VERSION);
    web::run(config).await
}
