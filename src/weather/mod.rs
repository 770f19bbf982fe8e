//! Weather aggregation
//!
//! [`WeatherService`] holds the upstream client and credential. Every call is
//! independent: validate the city, check the credential, call the provider,
//! reshape. Nothing is cached between requests.

use anyhow::Result as AnyResult;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::config::UpstreamConfig;
use crate::models::{CityQuery, CurrentConditions, Units, WeatherEnvelope};
use crate::{Result, WeatherProxyError};

pub mod open_weather;

pub use open_weather::{OpenWeatherClient, redact_key};

/// City used by the credential probe
pub const PROBE_CITY: &str = "London";

/// Result of a successful credential probe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    pub success: bool,
    pub message: String,
    pub city: Option<String>,
    pub api_key_preview: String,
}

/// Request-scoped weather lookups against the provider
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: OpenWeatherClient,
    api_key: Option<String>,
}

impl WeatherService {
    pub fn new(config: &UpstreamConfig) -> AnyResult<Self> {
        Ok(Self {
            client: OpenWeatherClient::new(config)?,
            api_key: config.api_key.clone(),
        })
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) => {
                debug!("API key present: {}", redact_key(key));
                Ok(key)
            }
            None => {
                error!("API key missing!");
                Err(WeatherProxyError::MissingApiKey)
            }
        }
    }

    /// Current conditions plus hourly and daily forecast slices for a raw city parameter.
    ///
    /// The city is validated before the credential, so blank input is a 400
    /// even on a server without a key. The two provider calls run
    /// concurrently; the first failure fails the whole lookup.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, raw_city: &str) -> Result<WeatherEnvelope> {
        info!("Weather request received");
        let city = CityQuery::parse(raw_city)?;
        info!("Raw param: \"{}\", decoded city: \"{}\"", raw_city, city);

        let api_key = self.api_key()?;

        let (current, forecast) = futures::try_join!(
            self.client
                .current_weather(city.as_str(), api_key, Units::Standard),
            self.client.forecast(city.as_str(), api_key)
        )
        .map_err(|failure| WeatherProxyError::from_upstream(failure, city.as_str()))?;

        let envelope = WeatherEnvelope::new(current, forecast);
        info!(
            "Forecast sliced: {} hourly, {} daily entries",
            envelope.hourly.len(),
            envelope.daily.len()
        );
        Ok(envelope)
    }

    /// Current conditions only, in metric units
    #[instrument(skip(self))]
    pub async fn current(&self, raw_city: &str) -> Result<CurrentConditions> {
        let city = CityQuery::parse(raw_city)?;
        let api_key = self.api_key()?;

        self.client
            .current_weather(city.as_str(), api_key, Units::Metric)
            .await
            .map_err(|failure| WeatherProxyError::from_upstream(failure, city.as_str()))
    }

    /// Check the configured credential against the provider
    #[instrument(skip(self))]
    pub async fn probe_api_key(&self) -> Result<ApiKeyStatus> {
        let api_key = self.api_key()?;

        let current = self
            .client
            .current_weather(PROBE_CITY, api_key, Units::Standard)
            .await
            .map_err(|failure| WeatherProxyError::from_upstream(failure, PROBE_CITY))?;

        info!("API key accepted by provider");
        Ok(ApiKeyStatus {
            success: true,
            message: "API key is valid!".to_string(),
            city: current.name().map(str::to_string),
            api_key_preview: redact_key(api_key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(base_url: &str, api_key: Option<&str>) -> WeatherService {
        WeatherService::new(&UpstreamConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_blank_city_rejected_before_credential_check() {
        let service = service_for("http://127.0.0.1:1", None);
        let result = service.aggregate("   ").await;
        assert!(matches!(result, Err(WeatherProxyError::EmptyCity)));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_upstream_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let service = service_for(&mock_server.uri(), None);
        assert!(!service.has_api_key());
        let result = service.aggregate("London").await;
        assert!(matches!(result, Err(WeatherProxyError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_forecast_failure_fails_whole_lookup() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "London" })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let service = service_for(&mock_server.uri(), Some("test-key"));
        let err = service.aggregate("London").await.unwrap_err();
        assert!(matches!(
            err,
            WeatherProxyError::Upstream { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn test_probe_reports_city_and_preview() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", PROBE_CITY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "London" })))
            .mount(&mock_server)
            .await;

        let service = service_for(&mock_server.uri(), Some("abcdefghijklmnop"));
        let status = service.probe_api_key().await.unwrap();
        assert!(status.success);
        assert_eq!(status.city.as_deref(), Some("London"));
        assert_eq!(status.api_key_preview, "abcdefgh...");

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["apiKeyPreview"], "abcdefgh...");
    }
}
