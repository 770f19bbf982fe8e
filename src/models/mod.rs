//! Data models for the weather proxy
//!
//! This module contains the per-request domain models organized by concern:
//! - City: query normalization and validation
//! - Weather: current conditions passthrough
//! - Forecast: forecast series slicing and the response envelope

pub mod city;
pub mod forecast;
pub mod weather;

// Re-export all public types for convenient access
pub use city::{CityQuery, decode_until_stable};
pub use forecast::{DAILY_STRIDE, ForecastSeries, HOURLY_WINDOW, WeatherEnvelope};
pub use weather::{CurrentConditions, Units};
