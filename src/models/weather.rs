//! Current conditions as returned by the provider

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unit system requested from the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Units {
    /// Provider default: Kelvin, m/s
    #[default]
    Standard,
    /// Celsius, m/s
    Metric,
}

impl Units {
    /// Value of the `units` query parameter, `None` when the provider default applies
    #[must_use]
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Units::Standard => None,
            Units::Metric => Some("metric"),
        }
    }
}

/// Upstream "current weather" document, forwarded untouched.
///
/// The schema belongs to the provider; only the fields used for logging are
/// read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentConditions(pub Value);

impl CurrentConditions {
    /// Location name resolved by the provider
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Temperature in the requested unit system (Kelvin by default)
    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.0
            .get("main")
            .and_then(|main| main.get("temp"))
            .and_then(Value::as_f64)
    }

    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}
