//! View state of an interactive forecast session and the controller that drives it.
//!
//! Overlapping fetches are fenced by request id: only the most recently
//! *started* fetch may write its outcome, so a slow coordinate lookup cannot
//! overwrite the result of a newer city search.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use serde::Serialize;

use crate::{
    config::{Config, LocationSourceKind},
    error::{GeolocationError, WeatherError},
    forecast::group_by_day_in,
    gateway::{DEFAULT_BASE_URL, ForecastGateway, HttpFetcher, ReqwestFetcher},
    location::{IpLocationSource, LocationProvider},
    model::{Coordinates, DailyForecast, ForecastResponse},
    time::CalendarZone,
};

/// Identifies one fetch; later fetches get larger ids.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Transient, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastState {
    pub forecasts: Vec<DailyForecast>,
    pub location_name: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationState {
    pub coordinates: Option<Coordinates>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub forecast: ForecastState,
    pub location: LocationState,
    pub notification: Option<Notification>,
    selected_day: Option<usize>,
    #[serde(skip)]
    latest_request: RequestId,
}

impl ViewState {
    /// Mark a new fetch as in flight and return its id.
    pub fn begin_fetch(&mut self) -> RequestId {
        self.latest_request += 1;
        self.forecast.loading = true;
        self.forecast.error = None;
        self.latest_request
    }

    /// Apply a fetch outcome. Returns `false` when a newer fetch has started
    /// since `id`, in which case the outcome is dropped.
    pub fn finish_fetch(
        &mut self,
        id: RequestId,
        outcome: Result<(String, Vec<DailyForecast>), WeatherError>,
    ) -> bool {
        if !self.is_latest(id) {
            tracing::debug!(id, latest = self.latest_request, "Dropping superseded forecast result");
            return false;
        }

        self.forecast.loading = false;
        self.selected_day = None;

        match outcome {
            Ok((location_name, forecasts)) => {
                self.forecast.forecasts = forecasts;
                self.forecast.location_name = Some(location_name);
            }
            Err(err) => {
                if let Some(detail) = err.detail() {
                    tracing::warn!(detail, "Forecast fetch failed: {err}");
                }
                let message = err.to_string();
                self.forecast.forecasts.clear();
                self.forecast.location_name = None;
                self.forecast.error = Some(message.clone());
                self.notify(message, Severity::Error);
            }
        }

        true
    }

    pub fn is_latest(&self, id: RequestId) -> bool {
        id == self.latest_request
    }

    /// Close a fetch that will never produce an outcome, e.g. because the
    /// position lookup feeding it failed.
    pub fn abandon_fetch(&mut self, id: RequestId) {
        if self.is_latest(id) {
            self.forecast.loading = false;
        }
    }

    pub fn begin_locate(&mut self) {
        self.location.loading = true;
        self.location.error = None;
    }

    pub fn finish_locate(&mut self, outcome: Result<Coordinates, GeolocationError>) {
        self.location.loading = false;

        match outcome {
            Ok(coords) => self.location.coordinates = Some(coords),
            Err(err) => {
                let message = err.to_string();
                self.location.coordinates = None;
                self.location.error = Some(message.clone());
                self.notify(message, Severity::Error);
            }
        }
    }

    /// Open the hourly detail of one day, replacing any open detail.
    pub fn select_day(&mut self, index: usize) -> Option<&DailyForecast> {
        let day = self.forecast.forecasts.get(index)?;
        self.selected_day = Some(index);
        Some(day)
    }

    pub fn selected_day(&self) -> Option<&DailyForecast> {
        self.selected_day.and_then(|i| self.forecast.forecasts.get(i))
    }

    pub fn close_detail(&mut self) {
        self.selected_day = None;
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notification = Some(Notification { message: message.into(), severity });
    }

    pub fn dismiss_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }
}

/// Drives the gateway and location provider and records outcomes in [`ViewState`].
///
/// Every method takes `&self`, so fetches may be awaited concurrently.
#[derive(Debug)]
pub struct ForecastSession<F = ReqwestFetcher> {
    gateway: ForecastGateway<F>,
    locator: LocationProvider,
    zone: CalendarZone,
    state: Mutex<ViewState>,
}

impl ForecastSession<ReqwestFetcher> {
    /// Session wired to the public API and the configured location source.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let gateway = ForecastGateway::openweather(config.api_key())
            .with_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));

        let locator = match config.location_source {
            LocationSourceKind::Ip => LocationProvider::new(Arc::new(IpLocationSource::new())),
            LocationSourceKind::Disabled => LocationProvider::unsupported(),
        };

        Ok(Self::new(gateway, locator, config.calendar_zone()?))
    }
}

impl<F: HttpFetcher> ForecastSession<F> {
    pub fn new(gateway: ForecastGateway<F>, locator: LocationProvider, zone: CalendarZone) -> Self {
        Self { gateway, locator, zone, state: Mutex::new(ViewState::default()) }
    }

    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// Fetch by city name. Blank input is ignored.
    pub async fn search_city(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let id = self.state.lock().begin_fetch();
        let outcome = self.gateway.fetch_by_city(name).await;
        self.apply(id, outcome);
    }

    pub async fn fetch_coordinates(&self, coords: Coordinates) {
        let id = self.state.lock().begin_fetch();
        let outcome = self.gateway.fetch_by_coordinates(coords).await;
        self.apply(id, outcome);
    }

    /// Resolve the current position, then fetch its forecast.
    ///
    /// The request id is taken before the position lookup, so a search
    /// started while the lookup is pending supersedes this one.
    pub async fn use_my_location(&self) {
        let id = {
            let mut state = self.state.lock();
            state.begin_locate();
            state.begin_fetch()
        };
        let outcome = self.locator.get_location().await;

        let coords = {
            let mut state = self.state.lock();
            state.finish_locate(outcome);
            match outcome {
                Ok(coords) if state.is_latest(id) => Some(coords),
                Ok(_) => {
                    tracing::debug!(id, "Position resolved after a newer request; skipping fetch");
                    None
                }
                Err(_) => {
                    state.abandon_fetch(id);
                    None
                }
            }
        };

        if let Some(coords) = coords {
            let outcome = self.gateway.fetch_by_coordinates(coords).await;
            self.apply(id, outcome);
        }
    }

    pub fn select_day(&self, index: usize) -> Option<DailyForecast> {
        self.state.lock().select_day(index).cloned()
    }

    pub fn close_detail(&self) {
        self.state.lock().close_detail();
    }

    pub fn dismiss_notification(&self) -> Option<Notification> {
        self.state.lock().dismiss_notification()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    fn apply(&self, id: RequestId, outcome: Result<ForecastResponse, WeatherError>) {
        let outcome = outcome.map(|response| {
            let days = group_by_day_in(&response.samples, self.zone);
            (response.location_name, days)
        });
        self.state.lock().finish_fetch(id, outcome);
    }
}
