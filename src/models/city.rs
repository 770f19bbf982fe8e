//! City query normalization

use crate::WeatherProxyError;

/// A validated, decoded city name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery(String);

impl CityQuery {
    /// Decode a raw city parameter and reject blank input
    pub fn parse(raw: &str) -> Result<Self, WeatherProxyError> {
        let decoded = decode_until_stable(raw);
        let trimmed = decoded.trim();
        if trimmed.is_empty() {
            return Err(WeatherProxyError::EmptyCity);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-decode repeatedly until the value stops changing.
///
/// Clients sometimes encode the city twice (`New%2520York`), so a single pass
/// is not enough. If any pass hits a malformed escape or bytes that are not
/// UTF-8, the raw input is returned untouched. `+` is left as is.
#[must_use]
pub fn decode_until_stable(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        if has_malformed_escape(&current) {
            return raw.to_string();
        }
        let next = match urlencoding::decode(&current) {
            Ok(decoded) if decoded.as_ref() == current.as_str() => return current,
            Ok(decoded) => decoded.into_owned(),
            Err(_) => return raw.to_string(),
        };
        current = next;
    }
}

/// `%` must always be followed by two hex digits
fn has_malformed_escape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}
