//! OpenWeatherMap HTTP client
//!
//! Thin async wrapper over the provider's `weather` and `forecast`
//! endpoints. Status codes are classified once, in [`OpenWeatherClient::get_json`];
//! nothing is retried.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, error, info, instrument, warn};

use crate::config::UpstreamConfig;
use crate::error::UpstreamFailure;
use crate::models::{CurrentConditions, ForecastSeries, Units};

const USER_AGENT: &str = concat!("weather-proxy/", env!("CARGO_PKG_VERSION"));

/// Calls slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Error document the provider sends with non-2xx answers
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

/// Client for the provider's 2.5 data API
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
}

impl OpenWeatherClient {
    /// Create a new client from the upstream settings
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions for a city
    #[instrument(skip(self, api_key))]
    pub async fn current_weather(
        &self,
        city: &str,
        api_key: &str,
        units: Units,
    ) -> Result<CurrentConditions, UpstreamFailure> {
        info!("Fetching current weather for '{}'", city);
        let current: CurrentConditions = self.get_json("weather", city, api_key, units).await?;
        info!(
            "Current weather received for: {}",
            current.name().unwrap_or(city)
        );
        Ok(current)
    }

    /// 5-day / 3-hour forecast for a city
    #[instrument(skip(self, api_key))]
    pub async fn forecast(&self, city: &str, api_key: &str) -> Result<ForecastSeries, UpstreamFailure> {
        info!("Fetching 5-day forecast for '{}'", city);
        let forecast: ForecastSeries = self
            .get_json("forecast", city, api_key, Units::Standard)
            .await?;
        info!("Forecast received with {} samples", forecast.len());
        Ok(forecast)
    }

    /// Full request URL for an endpoint
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str, city: &str, api_key: &str, units: Units) -> String {
        let mut url = format!(
            "{}/data/2.5/{}?q={}&appid={}",
            self.base_url,
            endpoint,
            urlencoding::encode(city),
            urlencoding::encode(api_key)
        );
        if let Some(units) = units.query_value() {
            url.push_str("&units=");
            url.push_str(units);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
        api_key: &str,
        units: Units,
    ) -> Result<T, UpstreamFailure> {
        let url = self.endpoint_url(endpoint, city, api_key, units);
        debug!(
            "Upstream request URL: {}",
            url.replace(api_key, &redact_key(api_key))
        );

        let start_time = Instant::now();
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Network error calling '{}' endpoint: {}", endpoint, e);
            UpstreamFailure::Transport(e.without_url().to_string())
        })?;

        let status = response.status();
        let elapsed = start_time.elapsed();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            elapsed.as_secs_f64()
        );
        if elapsed > SLOW_RESPONSE {
            warn!(
                "Slow upstream response from '{}': {:.3}s",
                endpoint,
                elapsed.as_secs_f64()
            );
        }

        if !status.is_success() {
            let message = response
                .json::<ProviderErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            match status.as_u16() {
                401 => error!("API key authentication failed (HTTP 401)"),
                404 => warn!("City '{}' not found upstream (HTTP 404)", city),
                429 => warn!("Upstream rate limit exceeded (HTTP 429)"),
                other => error!(
                    "Upstream '{}' request failed with HTTP {}: {}",
                    endpoint,
                    other,
                    message.as_deref().unwrap_or("no message")
                ),
            }
            return Err(UpstreamFailure::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse '{}' response: {}", endpoint, e);
            UpstreamFailure::Decode(e.without_url().to_string())
        })
    }
}

/// Log-safe form of a credential: first 8 characters then `...`
#[must_use]
pub fn redact_key(api_key: &str) -> String {
    let prefix: String = api_key.chars().take(8).collect();
    format!("{prefix}...")
}
