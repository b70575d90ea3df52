//! Error taxonomy surfaced to the presentation layer.

use thiserror::Error;

/// Failures of a forecast fetch. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error(
        "OpenWeatherMap API key is not configured.\n\
         Hint: set OPENWEATHER_API_KEY or run `forecast configure`."
    )]
    Configuration,

    #[error("Invalid API key. Unauthorized.")]
    Unauthorized,

    #[error("City \"{0}\" not found")]
    CityNotFound(String),

    #[error("{message}")]
    RemoteApi { status: u16, message: String },

    /// The request went out but no response came back. The detail is for logs only.
    #[error("Network error: Could not reach weather API")]
    Network(String),

    #[error("An unexpected error occurred while fetching weather data")]
    Unexpected(String),
}

impl WeatherError {
    /// Build a [`WeatherError::RemoteApi`] from the upstream message, if any.
    pub fn remote(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("API Error: {status}"));

        WeatherError::RemoteApi { status, message }
    }

    /// Internal detail worth logging, not shown to users.
    pub fn detail(&self) -> Option<&str> {
        match self {
            WeatherError::Network(detail) | WeatherError::Unexpected(detail) => Some(detail.as_str()),
            _ => None,
        }
    }
}

/// Failures of a current-position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported on this platform")]
    Unsupported,

    #[error("Location access denied by user")]
    PermissionDenied,

    #[error("Location information unavailable")]
    PositionUnavailable,

    #[error("Location request timeout")]
    Timeout,

    #[error("Failed to get location")]
    Unknown(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_prefers_upstream_message() {
        let err = WeatherError::remote(429, Some("Too many requests".into()));
        assert_eq!(err.to_string(), "Too many requests");
    }

    #[test]
    fn remote_error_falls_back_to_status() {
        assert_eq!(WeatherError::remote(500, None).to_string(), "API Error: 500");
        assert_eq!(WeatherError::remote(502, Some("  ".into())).to_string(), "API Error: 502");
    }

    #[test]
    fn network_detail_is_not_displayed() {
        let err = WeatherError::Network("dns error: no such host".into());
        assert_eq!(err.to_string(), "Network error: Could not reach weather API");
        assert_eq!(err.detail(), Some("dns error: no such host"));
        assert_eq!(WeatherError::Unauthorized.detail(), None);
    }

    #[test]
    fn geolocation_messages() {
        assert_eq!(GeolocationError::PermissionDenied.to_string(), "Location access denied by user");
        assert_eq!(GeolocationError::Unknown(999).to_string(), "Failed to get location");
    }
}
