//! Access to the remote 5-day forecast endpoint.
//!
//! The HTTP transport sits behind [`HttpFetcher`], so the status-to-error
//! mapping can be exercised without a network.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    error::WeatherError,
    model::{Coordinates, ForecastResponse},
};

pub mod http;
mod openweather;

pub use http::ReqwestFetcher;
use openweather::{OwErrorBody, OwForecastResponse, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Status code and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request was dispatched but no response arrived.
    NoResponse(String),
    Other(String),
}

#[async_trait]
pub trait HttpFetcher: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError>;
}

/// The two supported forecast lookups.
#[derive(Debug, Clone, Copy)]
pub enum ForecastQuery<'a> {
    Coordinates(Coordinates),
    City(&'a str),
}

impl ForecastQuery<'_> {
    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            ForecastQuery::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
            ForecastQuery::City(name) => vec![("q", (*name).to_string())],
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ForecastQuery::Coordinates(_) => "coordinates",
            ForecastQuery::City(_) => "city",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastGateway<F = ReqwestFetcher> {
    fetcher: F,
    api_key: Option<String>,
    base_url: String,
}

impl ForecastGateway<ReqwestFetcher> {
    /// Gateway over a fresh `reqwest` client against the public endpoint.
    pub fn openweather(api_key: Option<String>) -> Self {
        Self::new(ReqwestFetcher::new(), api_key)
    }
}

impl<F: HttpFetcher> ForecastGateway<F> {
    /// A missing key is only reported when a fetch is attempted.
    pub fn new(fetcher: F, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<ForecastResponse, WeatherError> {
        self.fetch(ForecastQuery::Coordinates(coords)).await
    }

    pub async fn fetch_by_city(&self, name: &str) -> Result<ForecastResponse, WeatherError> {
        self.fetch(ForecastQuery::City(name)).await
    }

    #[instrument(skip(self), fields(kind = query.kind()), level = "debug")]
    pub async fn fetch(&self, query: ForecastQuery<'_>) -> Result<ForecastResponse, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::Configuration)?;

        let url = format!("{}/forecast", self.base_url.trim_end_matches('/'));
        let mut params = query.params();
        params.push(("appid", api_key.to_string()));
        params.push(("units", "metric".to_string()));

        let response = self.fetcher.get(&url, &params).await.map_err(|err| {
            tracing::warn!(?err, "Forecast request failed in transport");
            match err {
                TransportError::NoResponse(detail) => WeatherError::Network(detail),
                TransportError::Other(detail) => WeatherError::Unexpected(detail),
            }
        })?;

        tracing::debug!(status = response.status, "Forecast response received");

        if !(200..300).contains(&response.status) {
            let err = error_for_status(response.status, &response.body, &query);
            tracing::warn!(
                status = response.status,
                body = %truncate_body(&response.body),
                "Forecast request rejected: {err}"
            );
            return Err(err);
        }

        let parsed: OwForecastResponse = serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!(body = %truncate_body(&response.body), "Unparseable forecast body");
            WeatherError::Unexpected(format!("Failed to parse OpenWeather forecast JSON: {e}"))
        })?;

        let forecast = ForecastResponse::from(parsed);
        tracing::info!(
            location = %forecast.location_name,
            samples = forecast.samples.len(),
            "Forecast fetched"
        );

        Ok(forecast)
    }
}

/// Map a non-2xx response onto the error taxonomy.
pub fn error_for_status(status: u16, body: &str, query: &ForecastQuery<'_>) -> WeatherError {
    match (status, query) {
        (401, _) => WeatherError::Unauthorized,
        (404, ForecastQuery::City(name)) => WeatherError::CityNotFound((*name).to_string()),
        _ => WeatherError::remote(status, OwErrorBody::message_from(body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const OK_BODY: &str = r#"{
        "list": [
            {
                "dt": 1705320000,
                "main": { "temp": 20.0, "humidity": 40 },
                "weather": [ { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" } ],
                "wind": { "speed": 1.2 }
            }
        ],
        "city": { "name": "Sofia" }
    }"#;

    type Call = (String, Vec<(String, String)>);

    #[derive(Debug)]
    struct ScriptedFetcher {
        reply: Result<HttpResponse, TransportError>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedFetcher {
        fn status(status: u16, body: &str) -> Self {
            Self::reply(Ok(HttpResponse { status, body: body.to_string() }))
        }

        fn reply(reply: Result<HttpResponse, TransportError>) -> Self {
            Self { reply, calls: Mutex::new(Vec::new()) }
        }

        fn param(&self, name: &str) -> Option<String> {
            let calls = self.calls.lock();
            let (_, params) = calls.last()?;
            params.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        }
    }

    #[async_trait]
    impl HttpFetcher for ScriptedFetcher {
        async fn get(
            &self,
            url: &str,
            query: &[(&str, String)],
        ) -> Result<HttpResponse, TransportError> {
            let params = query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            self.calls.lock().push((url.to_string(), params));
            self.reply.clone()
        }
    }

    fn gateway(fetcher: ScriptedFetcher) -> ForecastGateway<ScriptedFetcher> {
        ForecastGateway::new(fetcher, Some("KEY".to_string()))
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let gw = ForecastGateway::new(ScriptedFetcher::status(200, OK_BODY), None);

        let err = gw.fetch_by_city("Sofia").await.unwrap_err();

        assert_eq!(err, WeatherError::Configuration);
        assert!(gw.fetcher.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn blank_api_key_counts_as_missing() {
        let gw = ForecastGateway::new(ScriptedFetcher::status(200, OK_BODY), Some("  ".into()));

        let err = gw.fetch_by_coordinates(Coordinates::new(1.0, 2.0)).await.unwrap_err();
        assert_eq!(err, WeatherError::Configuration);
    }

    #[tokio::test]
    async fn coordinates_query_parameters() {
        let gw = gateway(ScriptedFetcher::status(200, OK_BODY));

        let forecast = gw.fetch_by_coordinates(Coordinates::new(42.6977, 23.3219)).await.unwrap();

        assert_eq!(forecast.location_name, "Sofia");
        assert_eq!(forecast.samples.len(), 1);

        let calls = gw.fetcher.calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, format!("{DEFAULT_BASE_URL}/forecast"));
        assert_eq!(gw.fetcher.param("lat").as_deref(), Some("42.6977"));
        assert_eq!(gw.fetcher.param("lon").as_deref(), Some("23.3219"));
        assert_eq!(gw.fetcher.param("appid").as_deref(), Some("KEY"));
        assert_eq!(gw.fetcher.param("units").as_deref(), Some("metric"));
        assert_eq!(gw.fetcher.param("q"), None);
    }

    #[tokio::test]
    async fn city_query_parameters() {
        let gw = gateway(ScriptedFetcher::status(200, OK_BODY)).with_base_url("http://localhost:9/");

        gw.fetch_by_city("Sofia").await.unwrap();

        assert_eq!(gw.fetcher.calls.lock()[0].0, "http://localhost:9/forecast");
        assert_eq!(gw.fetcher.param("q").as_deref(), Some("Sofia"));
        assert_eq!(gw.fetcher.param("lat"), None);
    }

    #[tokio::test]
    async fn unauthorized_is_reported() {
        let gw = gateway(ScriptedFetcher::status(401, r#"{"cod":401,"message":"Invalid API key."}"#));

        let err = gw.fetch_by_coordinates(Coordinates::new(0.0, 0.0)).await.unwrap_err();

        assert_eq!(err, WeatherError::Unauthorized);
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn unknown_city_is_named_in_error() {
        let gw = gateway(ScriptedFetcher::status(404, r#"{"cod":"404","message":"city not found"}"#));

        let err = gw.fetch_by_city("UnknownCity").await.unwrap_err();

        assert_eq!(err, WeatherError::CityNotFound("UnknownCity".into()));
        assert_eq!(err.to_string(), "City \"UnknownCity\" not found");
    }

    #[tokio::test]
    async fn not_found_for_coordinates_uses_upstream_message() {
        let gw = gateway(ScriptedFetcher::status(404, r#"{"cod":"404","message":"nothing to geocode"}"#));

        let err = gw.fetch_by_coordinates(Coordinates::new(0.0, 0.0)).await.unwrap_err();

        assert_eq!(err.to_string(), "nothing to geocode");
    }

    #[tokio::test]
    async fn other_status_without_message() {
        let gw = gateway(ScriptedFetcher::status(503, "<html>Service Unavailable</html>"));

        let err = gw.fetch_by_city("Sofia").await.unwrap_err();

        assert_eq!(
            err,
            WeatherError::RemoteApi { status: 503, message: "API Error: 503".into() }
        );
    }

    #[tokio::test]
    async fn no_response_is_a_network_error() {
        let gw = gateway(ScriptedFetcher::reply(Err(TransportError::NoResponse(
            "connection refused".into(),
        ))));

        let err = gw.fetch_by_city("Sofia").await.unwrap_err();

        assert!(matches!(err, WeatherError::Network(_)));
        assert_eq!(err.to_string(), "Network error: Could not reach weather API");
    }

    #[tokio::test]
    async fn other_transport_failure_is_unexpected() {
        let gw = gateway(ScriptedFetcher::reply(Err(TransportError::Other("body cut".into()))));

        let err = gw.fetch_by_city("Sofia").await.unwrap_err();

        assert!(matches!(err, WeatherError::Unexpected(_)));
    }

    #[tokio::test]
    async fn malformed_success_body_is_unexpected() {
        let gw = gateway(ScriptedFetcher::status(200, r#"{"list": "nope"}"#));

        let err = gw.fetch_by_city("Sofia").await.unwrap_err();

        assert_eq!(err.to_string(), "An unexpected error occurred while fetching weather data");
        assert!(err.detail().unwrap_or_default().contains("parse"));
    }

    #[test]
    fn status_mapping_table() {
        let city = ForecastQuery::City("Paris");
        let coords = ForecastQuery::Coordinates(Coordinates::new(0.0, 0.0));

        assert_eq!(error_for_status(401, "", &coords), WeatherError::Unauthorized);
        assert_eq!(error_for_status(404, "", &city), WeatherError::CityNotFound("Paris".into()));
        assert_eq!(error_for_status(404, "", &coords).to_string(), "API Error: 404");
        assert_eq!(
            error_for_status(429, r#"{"message":"slow down"}"#, &city).to_string(),
            "slow down"
        );
    }
}
