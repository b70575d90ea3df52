use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One ~3-hour interval reading, normalised from the upstream payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub epoch_seconds: i64,
    pub temperature: f64,
    pub humidity_percent: u8,
    pub wind_speed_mps: f64,
    pub condition_id: u32,
    pub condition_main: String,
    pub condition_description: String,
    pub condition_icon_code: String,
}

/// Result of a forecast query: the samples plus the resolved place name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub samples: Vec<ForecastSample>,
    pub location_name: String,
}

/// Display projection of a single sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub display_time: String,
    pub epoch_seconds: i64,
    pub temperature_rounded: i64,
    pub condition: String,
    pub icon_code: String,
    pub humidity_percent: u8,
    pub wind_speed_mps: f64,
}

impl HourlyForecast {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon_code)
    }
}

/// Summary of one calendar day with its hourly detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub display_date: String,
    pub day_name: String,
    pub day_start_epoch_seconds: i64,
    pub min_temperature_rounded: i64,
    pub max_temperature_rounded: i64,
    pub representative_condition: String,
    pub representative_icon_code: String,
    pub hourly: Vec<HourlyForecast>,
}

impl DailyForecast {
    pub fn icon_url(&self) -> String {
        icon_url(&self.representative_icon_code)
    }
}

fn icon_url(code: &str) -> String {
    format!("{ICON_BASE_URL}/{code}@2x.png")
}
