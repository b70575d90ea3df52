use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use forecast_core::{
    CalendarZone, Config, Coordinates, DailyForecast, ForecastSession, LocationSourceKind, Severity,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "5-day weather forecast from OpenWeatherMap")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show the hourly forecast for one day (1 = first listed day).
    #[arg(long, global = true)]
    pub day: Option<usize>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Calendar zone for grouping by day: "local", "utc" or an offset like "+02:00".
    #[arg(long, global = true)]
    pub zone: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and preferences in the config file.
    Configure,

    /// Forecast for a city, e.g. `forecast city New York`.
    City {
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Forecast for a latitude/longitude pair.
    #[command(allow_negative_numbers = true)]
    Coords { latitude: f64, longitude: f64 },

    /// Forecast for the current (approximate) location.
    Here,
}

/// Output flags shared by every lookup command.
#[derive(Debug)]
struct Output {
    day: Option<usize>,
    json: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let Cli { command, day, json, zone } = self;
        let output = Output { day, json };

        let mut config = Config::load()?;
        if let Some(zone) = zone {
            config.zone = Some(zone);
        }
        tracing::debug!(
            zone = ?config.zone,
            location_source = ?config.location_source,
            has_api_key = config.api_key().is_some(),
            "Configuration loaded"
        );

        match command {
            Command::Configure => {
                configure(config)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::City { name } => {
                let session = ForecastSession::from_config(&config)?;
                session.search_city(&name.join(" ")).await;
                report(&session, &output)
            }
            Command::Coords { latitude, longitude } => {
                let session = ForecastSession::from_config(&config)?;
                session.fetch_coordinates(Coordinates::new(latitude, longitude)).await;
                report(&session, &output)
            }
            Command::Here => {
                let session = ForecastSession::from_config(&config)?;
                session.use_my_location().await;
                report(&session, &output)
            }
        }
    }
}

fn report(session: &ForecastSession, output: &Output) -> anyhow::Result<ExitCode> {
    if let Some(note) = session.dismiss_notification() {
        eprintln!("{}: {}", note.severity, note.message);
        if note.severity == Severity::Error {
            return Ok(ExitCode::FAILURE);
        }
    }

    if let Some(n) = output.day {
        let count = session.snapshot().forecast.forecasts.len();
        if n == 0 || session.select_day(n - 1).is_none() {
            bail!("Day {n} is out of range; this forecast has days 1 to {count}.");
        }
    }

    let state = session.snapshot();
    let location = state.forecast.location_name.as_deref().unwrap_or("unknown location");

    if output.json {
        let json = match state.selected_day() {
            Some(day) => serde_json::to_string_pretty(&day_json(day)?)?,
            None => {
                let days = state
                    .forecast
                    .forecasts
                    .iter()
                    .map(day_json)
                    .collect::<anyhow::Result<Vec<_>>>()?;
                serde_json::to_string_pretty(&serde_json::json!({
                    "location": location,
                    "days": days,
                }))?
            }
        };
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    match state.selected_day() {
        Some(day) => print!("{}", render::hourly_detail(day)),
        None => print!("{}", render::daily_summary(location, &state.forecast.forecasts)),
    }

    Ok(ExitCode::SUCCESS)
}

/// Day as JSON, with the icon URL added to the day and to each hour.
fn day_json(day: &DailyForecast) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(day)?;
    value["icon_url"] = day.icon_url().into();

    if let Some(hours) = value["hourly"].as_array_mut() {
        for (entry, hour) in hours.iter_mut().zip(&day.hourly) {
            entry["icon_url"] = hour.icon_url().into();
        }
    }

    Ok(value)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("API key prompt was cancelled")?;
    config.set_api_key(api_key.trim().to_string());

    let current_zone = config.zone.clone().unwrap_or_else(|| CalendarZone::default().to_string());
    let zone = inquire::Text::new("Calendar zone (local, utc or +HH:MM):")
        .with_default(&current_zone)
        .prompt()
        .context("Zone prompt was cancelled")?;
    let zone: CalendarZone = zone.parse()?;
    config.zone = Some(zone.to_string());

    let source = inquire::Select::new(
        "Location source for `forecast here`:",
        vec!["ip", "none"],
    )
    .prompt()
    .context("Location source prompt was cancelled")?;
    config.location_source = match source {
        "none" => LocationSourceKind::Disabled,
        _ => LocationSourceKind::Ip,
    };

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
