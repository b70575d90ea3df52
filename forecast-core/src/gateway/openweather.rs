//! Wire types of the OpenWeatherMap 5-day / 3-hour forecast endpoint.

use serde::Deserialize;

use crate::model::{ForecastResponse, ForecastSample};

#[derive(Debug, Deserialize)]
pub(crate) struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwWeather {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    main: String,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

/// Error payload, e.g. `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct OwErrorBody {
    message: Option<String>,
}

impl OwErrorBody {
    pub(crate) fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<OwErrorBody>(body).ok().and_then(|b| b.message)
    }
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        let condition = entry.weather.into_iter().next();

        let (condition_id, condition_main, condition_description, condition_icon_code) =
            match condition {
                Some(w) => (w.id, w.main, w.description, w.icon),
                None => (0, "Unknown".to_string(), "Unknown".to_string(), String::new()),
            };

        ForecastSample {
            epoch_seconds: entry.dt,
            temperature: entry.main.temp,
            humidity_percent: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
            condition_id,
            condition_main,
            condition_description,
            condition_icon_code,
        }
    }
}

impl From<OwForecastResponse> for ForecastResponse {
    fn from(parsed: OwForecastResponse) -> Self {
        ForecastResponse {
            samples: parsed.list.into_iter().map(ForecastSample::from).collect(),
            location_name: parsed.city.name,
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
