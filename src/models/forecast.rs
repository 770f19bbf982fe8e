//! Forecast series and the combined response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CurrentConditions;

/// Number of leading 3-hour samples returned as `hourly` (about 24 hours)
pub const HOURLY_WINDOW: usize = 8;

/// Stride used to pick one sample per day out of the 3-hour series
pub const DAILY_STRIDE: usize = 8;

/// Upstream forecast document; only the flat sample list is kept
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastSeries {
    pub list: Vec<Value>,
}

impl ForecastSeries {
    #[must_use]
    pub fn new(list: Vec<Value>) -> Self {
        Self { list }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Split into `(hourly, daily)`.
    ///
    /// `daily[i]` is `list[i * DAILY_STRIDE]`: a positional sample, not a
    /// per-day min/max.
    #[must_use]
    pub fn partition(self) -> (Vec<Value>, Vec<Value>) {
        let daily = self.list.iter().step_by(DAILY_STRIDE).cloned().collect();
        let hourly = self.list.into_iter().take(HOURLY_WINDOW).collect();
        (hourly, daily)
    }
}

/// Response body of `GET /weather/{city}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherEnvelope {
    pub current: CurrentConditions,
    pub hourly: Vec<Value>,
    pub daily: Vec<Value>,
}

impl WeatherEnvelope {
    #[must_use]
    pub fn new(current: CurrentConditions, forecast: ForecastSeries) -> Self {
        let (hourly, daily) = forecast.partition();
        Self {
            current,
            hourly,
            daily,
        }
    }
}
