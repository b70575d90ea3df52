//! Plain-text rendering of daily and hourly forecasts.

use forecast_core::DailyForecast;

/// One numbered line per day, numbered from 1 to match `--day`.
pub fn daily_summary(location: &str, days: &[DailyForecast]) -> String {
    let mut out = format!("Forecast for {location}\n\n");

    if days.is_empty() {
        out.push_str("  No forecast data available.\n");
        return out;
    }

    for (i, day) in days.iter().enumerate() {
        out.push_str(&format!(
            "  {}  {:<9}  {:<12}  {:>4}°C / {:>3}°C  {}\n",
            i + 1,
            day.day_name,
            day.display_date,
            day.min_temperature_rounded,
            day.max_temperature_rounded,
            day.representative_condition,
        ));
    }

    out
}

pub fn hourly_detail(day: &DailyForecast) -> String {
    let mut out = format!("{}, {}\n\n", day.day_name, day.display_date);

    for hour in &day.hourly {
        out.push_str(&format!(
            "  {:>8}  {:>4}°C  {:<20}  humidity {:>3}%  wind {:.1} m/s\n",
            hour.display_time,
            hour.temperature_rounded,
            hour.condition,
            hour.humidity_percent,
            hour.wind_speed_mps,
        ));
    }

    out
}
