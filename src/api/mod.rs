use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    WeatherProxyError,
    models::{CurrentConditions, WeatherEnvelope},
    weather::{ApiKeyStatus, WeatherService},
};

// Anything that goes in here must be cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
    pub port: u16,
}

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub message: String,
    pub port: u16,
    pub version: String,
    pub timestamp: String,
}

#[derive(Deserialize)]
pub struct CurrentParams {
    pub city: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/weather", get(get_weather_without_city))
        .route("/weather/", get(get_weather_without_city))
        .route("/weather/{city}", get(get_weather))
        .route("/current", get(get_current))
        .route("/test-api", get(test_api_key))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        message: "Weather API is running".to_string(),
        port: state.port,
        version: crate::VERSION.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// `Path` has already undone one layer of percent-encoding; the service undoes the rest.
async fn get_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherEnvelope>, WeatherProxyError> {
    let envelope = state.service.aggregate(&city).await?;
    tracing::info!("Sending response to client");
    Ok(Json(envelope))
}

async fn get_weather_without_city() -> WeatherProxyError {
    WeatherProxyError::EmptyCity
}

async fn get_current(
    State(state): State<AppState>,
    Query(params): Query<CurrentParams>,
) -> Result<Json<CurrentConditions>, WeatherProxyError> {
    let city = params.city.unwrap_or_default();
    let current = state.service.current(&city).await?;
    Ok(Json(current))
}

async fn test_api_key(
    State(state): State<AppState>,
) -> Result<Json<ApiKeyStatus>, WeatherProxyError> {
    let status = state.service.probe_api_key().await?;
    Ok(Json(status))
}
