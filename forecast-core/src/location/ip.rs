//! Approximate position from the public IP address.
//!
//! Terminals have no positioning hardware to ask, so "use my location" falls
//! back to an IP geolocation lookup (ip-api.com, no key required).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{LocationSource, PositionErrorCode, PositionOptions};
use crate::model::Coordinates;

const IP_API_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct IpLocationSource {
    http: Client,
    url: String,
}

impl Default for IpLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IpLocationSource {
    pub fn new() -> Self {
        Self { http: Client::new(), url: IP_API_URL.to_string() }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl LocationSource for IpLocationSource {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionErrorCode> {
        let res = self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("IP geolocation request failed: {}", e);
                if e.is_timeout() {
                    PositionErrorCode::Timeout
                } else {
                    PositionErrorCode::PositionUnavailable
                }
            })?;

        if !res.status().is_success() {
            tracing::debug!("IP geolocation returned status {}", res.status());
            return Err(PositionErrorCode::PositionUnavailable);
        }

        let body: IpApiResponse = res.json().await.map_err(|e| {
            tracing::debug!("IP geolocation parse error: {}", e);
            PositionErrorCode::PositionUnavailable
        })?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => {
                tracing::debug!(
                    "IP geolocation unavailable: {}",
                    body.message.as_deref().unwrap_or("no coordinates in response")
                );
                Err(PositionErrorCode::PositionUnavailable)
            }
        }
    }
}
