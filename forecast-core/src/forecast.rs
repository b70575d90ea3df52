//! Day grouping of interval samples.

use std::collections::HashMap;

use crate::{
    model::{DailyForecast, ForecastSample, HourlyForecast},
    time::CalendarZone,
};

/// Upper bound on the number of days returned by [`group_by_day`].
pub const MAX_FORECAST_DAYS: usize = 5;

/// Group samples into daily summaries using the host's local calendar.
pub fn group_by_day(samples: &[ForecastSample]) -> Vec<DailyForecast> {
    group_by_day_in(samples, CalendarZone::Local)
}

/// Group samples into at most [`MAX_FORECAST_DAYS`] daily summaries, ordered by day.
///
/// Each day's representative condition comes from the sample in the middle of
/// the bucket (index `len / 2`), which for a full day of 3-hour readings lands
/// around midday rather than on an overnight reading.
pub fn group_by_day_in(samples: &[ForecastSample], zone: CalendarZone) -> Vec<DailyForecast> {
    let mut buckets: HashMap<i64, Vec<&ForecastSample>> = HashMap::new();

    for sample in samples {
        buckets.entry(zone.day_start(sample.epoch_seconds)).or_default().push(sample);
    }

    let mut days: Vec<DailyForecast> = buckets
        .into_iter()
        .filter_map(|(day_start, mut bucket)| {
            bucket.sort_by_key(|s| s.epoch_seconds);
            summarize_day(day_start, &bucket, zone)
        })
        .collect();

    days.sort_by_key(|d| d.day_start_epoch_seconds);
    days.truncate(MAX_FORECAST_DAYS);
    days
}

fn summarize_day(
    day_start: i64,
    bucket: &[&ForecastSample],
    zone: CalendarZone,
) -> Option<DailyForecast> {
    let representative = bucket.get(bucket.len() / 2)?;

    let (min, max) = bucket.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.temperature), hi.max(s.temperature))
    });

    let hourly = bucket.iter().map(|s| to_hourly(s, zone)).collect();

    Some(DailyForecast {
        display_date: zone.format_date(day_start),
        day_name: zone.day_name(day_start),
        day_start_epoch_seconds: day_start,
        min_temperature_rounded: round_temperature(min),
        max_temperature_rounded: round_temperature(max),
        representative_condition: representative.condition_description.clone(),
        representative_icon_code: representative.condition_icon_code.clone(),
        hourly,
    })
}

fn to_hourly(sample: &ForecastSample, zone: CalendarZone) -> HourlyForecast {
    HourlyForecast {
        display_time: zone.format_time(sample.epoch_seconds),
        epoch_seconds: sample.epoch_seconds,
        temperature_rounded: round_temperature(sample.temperature),
        condition: sample.condition_description.clone(),
        icon_code: sample.condition_icon_code.clone(),
        humidity_percent: sample.humidity_percent,
        wind_speed_mps: sample.wind_speed_mps,
    }
}

/// Half-away-from-zero rounding, used for every displayed temperature.
pub fn round_temperature(value: f64) -> i64 {
    value.round() as i64
}
