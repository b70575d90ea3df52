//! Current-position lookup.

use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{error::GeolocationError, model::Coordinates};

pub mod ip;

pub use ip::IpLocationSource;

/// How long a position request may take before it is abandoned.
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self { high_accuracy: true, timeout: LOCATION_TIMEOUT }
    }
}

/// Failure codes reported by a position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other(i32),
}

impl PositionErrorCode {
    /// Decode the numeric codes used by platform geolocation APIs (1, 2, 3).
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => PositionErrorCode::PermissionDenied,
            2 => PositionErrorCode::PositionUnavailable,
            3 => PositionErrorCode::Timeout,
            other => PositionErrorCode::Other(other),
        }
    }
}

impl From<PositionErrorCode> for GeolocationError {
    fn from(code: PositionErrorCode) -> Self {
        match code {
            PositionErrorCode::PermissionDenied => GeolocationError::PermissionDenied,
            PositionErrorCode::PositionUnavailable => GeolocationError::PositionUnavailable,
            PositionErrorCode::Timeout => GeolocationError::Timeout,
            PositionErrorCode::Other(code) => GeolocationError::Unknown(code),
        }
    }
}

/// Platform capability that resolves the device's current position.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionErrorCode>;
}

#[derive(Debug, Clone)]
pub struct LocationProvider {
    source: Option<Arc<dyn LocationSource>>,
    options: PositionOptions,
}

impl LocationProvider {
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self { source: Some(source), options: PositionOptions::default() }
    }

    /// A provider for platforms without any position capability.
    pub fn unsupported() -> Self {
        Self { source: None, options: PositionOptions::default() }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_supported(&self) -> bool {
        self.source.is_some()
    }

    pub async fn get_location(&self) -> Result<Coordinates, GeolocationError> {
        let source = self.source.as_ref().ok_or(GeolocationError::Unsupported)?;

        let outcome = tokio::time::timeout(self.options.timeout, source.current_position(&self.options))
            .await
            .map_err(|_| GeolocationError::Timeout)?;

        match outcome {
            Ok(coords) => {
                tracing::info!(
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "Current position resolved"
                );
                Ok(coords)
            }
            Err(code) => {
                tracing::warn!(?code, "Position request failed");
                Err(code.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug)]
    struct FakeSource {
        reply: Result<Coordinates, PositionErrorCode>,
        delay: Duration,
        seen: Mutex<Vec<PositionOptions>>,
    }

    impl FakeSource {
        fn new(reply: Result<Coordinates, PositionErrorCode>) -> Arc<Self> {
            Arc::new(Self { reply, delay: Duration::ZERO, seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl LocationSource for FakeSource {
        async fn current_position(
            &self,
            options: &PositionOptions,
        ) -> Result<Coordinates, PositionErrorCode> {
            self.seen.lock().push(*options);
            tokio::time::sleep(self.delay).await;
            self.reply
        }
    }

    #[tokio::test]
    async fn resolves_coordinates_with_high_accuracy() {
        let source = FakeSource::new(Ok(Coordinates::new(42.6977, 23.3219)));
        let provider = LocationProvider::new(source.clone());

        let coords = provider.get_location().await.unwrap();

        assert_eq!(coords, Coordinates::new(42.6977, 23.3219));
        let seen = source.seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].high_accuracy);
        assert_eq!(seen[0].timeout, LOCATION_TIMEOUT);
    }

    #[tokio::test]
    async fn unsupported_platform_fails_immediately() {
        let provider = LocationProvider::unsupported();

        assert!(!provider.is_supported());
        assert_eq!(provider.get_location().await.unwrap_err(), GeolocationError::Unsupported);
    }

    #[tokio::test]
    async fn permission_denied_message() {
        let provider = LocationProvider::new(FakeSource::new(Err(PositionErrorCode::PermissionDenied)));

        let err = provider.get_location().await.unwrap_err();

        assert_eq!(err, GeolocationError::PermissionDenied);
        assert_eq!(err.to_string(), "Location access denied by user");
    }

    #[tokio::test]
    async fn maps_every_platform_code() {
        let cases = [
            (2, GeolocationError::PositionUnavailable, "Location information unavailable"),
            (3, GeolocationError::Timeout, "Location request timeout"),
            (999, GeolocationError::Unknown(999), "Failed to get location"),
        ];

        for (code, expected, message) in cases {
            let provider = LocationProvider::new(FakeSource::new(Err(PositionErrorCode::from_code(code))));
            let err = provider.get_location().await.unwrap_err();
            assert_eq!(err, expected);
            assert_eq!(err.to_string(), message);
        }
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        let source = Arc::new(FakeSource {
            reply: Ok(Coordinates::new(0.0, 0.0)),
            delay: Duration::from_millis(200),
            seen: Mutex::new(Vec::new()),
        });
        let provider = LocationProvider::new(source).with_options(PositionOptions {
            high_accuracy: true,
            timeout: Duration::from_millis(20),
        });

        assert_eq!(provider.get_location().await.unwrap_err(), GeolocationError::Timeout);
    }
}
