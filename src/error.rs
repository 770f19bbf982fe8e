//! Error types and HTTP mapping for the weather proxy

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failure reported by the upstream weather client, before any city context is attached
#[derive(Error, Debug)]
pub enum UpstreamFailure {
    /// Provider answered with a non-success status
    #[error("upstream returned HTTP {status}")]
    Status {
        status: u16,
        /// `message` field of the provider's error body, when present
        message: Option<String>,
    },

    /// Request never produced a response (DNS, connect, timeout, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("invalid upstream response: {0}")]
    Decode(String),
}

/// Main error type for the weather proxy
#[derive(Error, Debug)]
pub enum WeatherProxyError {
    /// City parameter was empty or whitespace only
    #[error("City name cannot be empty")]
    EmptyCity,

    /// No upstream credential configured
    #[error("API key missing on server")]
    MissingApiKey,

    /// Provider does not know the city
    #[error("City \"{city}\" not found. Please check the spelling or try a different city name.")]
    CityNotFound { city: String },

    /// Provider rejected the credential
    #[error("Invalid API key. Please check your OpenWeatherMap API key.")]
    InvalidApiKey { city: String },

    /// Provider throttled the request
    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited { city: String },

    /// Any other non-success status from the provider
    #[error("{message}")]
    Upstream {
        city: String,
        status: u16,
        message: String,
    },

    /// Network or transport failure talking to the provider
    #[error("Failed to fetch weather data. Please try again later.")]
    Transport { city: String, message: String },

    /// Provider answered 2xx with a body we could not read
    #[error("Invalid weather data received from the weather provider")]
    InvalidResponse { city: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherProxyError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Attach the city to an upstream failure and classify it
    pub fn from_upstream(failure: UpstreamFailure, city: &str) -> Self {
        let city = city.to_string();
        match failure {
            UpstreamFailure::Status { status: 404, .. } => Self::CityNotFound { city },
            UpstreamFailure::Status { status: 401, .. } => Self::InvalidApiKey { city },
            UpstreamFailure::Status { status: 429, .. } => Self::RateLimited { city },
            UpstreamFailure::Status { status, message } => Self::Upstream {
                city,
                status,
                message: message
                    .unwrap_or_else(|| format!("Request failed with status code {status}")),
            },
            UpstreamFailure::Transport(message) => Self::Transport { city, message },
            UpstreamFailure::Decode(message) => Self::InvalidResponse { city, message },
        }
    }

    /// HTTP status returned to the caller
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyCity => StatusCode::BAD_REQUEST,
            Self::CityNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status the provider answered with, if the failure came from one
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::CityNotFound { .. } => Some(404),
            Self::InvalidApiKey { .. } => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// City the failing request was about
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        match self {
            Self::CityNotFound { city }
            | Self::InvalidApiKey { city }
            | Self::RateLimited { city }
            | Self::Upstream { city, .. }
            | Self::Transport { city, .. }
            | Self::InvalidResponse { city, .. } => Some(city.as_str()),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherProxyError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// JSON body sent to the caller
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        let status = self.status_code();
        ErrorBody {
            message: self.user_message(),
            status: (status != StatusCode::BAD_REQUEST).then_some(status.as_u16()),
            city: self.city().map(str::to_string),
            upstream_status: self.upstream_status(),
        }
    }
}

/// Error envelope returned by every endpoint
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl IntoResponse for WeatherProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Transport { message, .. } | Self::InvalidResponse { message, .. } => {
                error!("Weather request failed: {} ({})", self, message);
            }
            _ if status.is_server_error() => error!("Weather request failed: {}", self),
            _ => warn!("Weather request rejected: {}", self),
        }
        (status, Json(self.body())).into_response()
    }
}
