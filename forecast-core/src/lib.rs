//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Calendar helpers over epoch timestamps
//! - Grouping of 3-hour forecast samples into daily summaries
//! - The OpenWeatherMap forecast gateway and current-position lookup
//! - Session view state, configuration and the error taxonomy
//!
//! It is used by `forecast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod forecast;
pub mod gateway;
pub mod location;
pub mod model;
pub mod session;
pub mod time;

pub use config::{Config, LocationSourceKind};
pub use error::{GeolocationError, WeatherError};
pub use forecast::{MAX_FORECAST_DAYS, group_by_day, group_by_day_in};
pub use gateway::{ForecastGateway, HttpFetcher, ReqwestFetcher};
pub use location::{LocationProvider, LocationSource};
pub use model::{Coordinates, DailyForecast, ForecastResponse, ForecastSample, HourlyForecast};
pub use session::{ForecastSession, Notification, Severity, ViewState};
pub use time::CalendarZone;
