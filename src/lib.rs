//! `weather-proxy` - city weather lookup backend
//!
//! This library resolves a city name against a third-party weather provider
//! and reshapes the answer into current conditions plus hourly and daily
//! forecast slices for a browser frontend.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::WeatherProxyConfig;
pub use error::{UpstreamFailure, WeatherProxyError};
pub use models::{CityQuery, CurrentConditions, ForecastSeries, WeatherEnvelope};
pub use weather::{OpenWeatherClient, WeatherService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
