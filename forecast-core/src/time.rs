//! Calendar helpers over epoch-second timestamps.
//!
//! The free functions interpret timestamps in the host's local timezone.
//! [`CalendarZone`] offers the same operations for an explicit zone, which is
//! what the grouping engine and the tests use to stay deterministic.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

/// Timezone used to decide which calendar day a timestamp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// Host timezone, as reported by the operating system.
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl CalendarZone {
    /// Epoch seconds of 00:00:00 on the calendar day containing `ts`.
    pub fn day_start(&self, ts: i64) -> i64 {
        match self {
            CalendarZone::Local => day_start_in(ts, &Local),
            CalendarZone::Utc => day_start_in(ts, &Utc),
            CalendarZone::Fixed(offset) => day_start_in(ts, offset),
        }
    }

    pub fn is_same_day(&self, ts1: i64, ts2: i64) -> bool {
        match self {
            CalendarZone::Local => is_same_day_in(ts1, ts2, &Local),
            CalendarZone::Utc => is_same_day_in(ts1, ts2, &Utc),
            CalendarZone::Fixed(offset) => is_same_day_in(ts1, ts2, offset),
        }
    }

    /// Full weekday name, e.g. "Monday".
    pub fn day_name(&self, ts: i64) -> String {
        self.format(ts, "%A")
    }

    /// Abbreviated weekday name, e.g. "Mon".
    pub fn short_day_name(&self, ts: i64) -> String {
        self.format(ts, "%a")
    }

    /// Date in the form "Jan 15, 2024".
    pub fn format_date(&self, ts: i64) -> String {
        self.format(ts, "%b %-d, %Y")
    }

    /// 12-hour clock time in the form "2:00 PM".
    pub fn format_time(&self, ts: i64) -> String {
        self.format(ts, "%-I:%M %p")
    }

    /// Out-of-range timestamps format as the epoch.
    fn format(&self, ts: i64, pattern: &str) -> String {
        let local = match self {
            CalendarZone::Local => local_datetime(ts, &Local),
            CalendarZone::Utc => local_datetime(ts, &Utc),
            CalendarZone::Fixed(offset) => local_datetime(ts, offset),
        };
        local.unwrap_or_default().format(pattern).to_string()
    }
}

impl fmt::Display for CalendarZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarZone::Local => f.write_str("local"),
            CalendarZone::Utc => f.write_str("utc"),
            CalendarZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for CalendarZone {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();

        match trimmed.to_lowercase().as_str() {
            "local" => Ok(CalendarZone::Local),
            "utc" | "z" => Ok(CalendarZone::Utc),
            _ => trimmed.parse::<FixedOffset>().map(CalendarZone::Fixed).map_err(|_| {
                anyhow!(
                    "Unknown calendar zone '{value}'. \
                     Use \"local\", \"utc\" or an offset such as \"+02:00\"."
                )
            }),
        }
    }
}

/// Local-timezone shorthand for [`CalendarZone::day_start`].
pub fn day_start(ts: i64) -> i64 {
    CalendarZone::Local.day_start(ts)
}

pub fn is_same_day(ts1: i64, ts2: i64) -> bool {
    CalendarZone::Local.is_same_day(ts1, ts2)
}

pub fn day_name(ts: i64) -> String {
    CalendarZone::Local.day_name(ts)
}

pub fn short_day_name(ts: i64) -> String {
    CalendarZone::Local.short_day_name(ts)
}

pub fn format_date(ts: i64) -> String {
    CalendarZone::Local.format_date(ts)
}

pub fn format_time(ts: i64) -> String {
    CalendarZone::Local.format_time(ts)
}

/// Wall-clock time of `ts` in `tz`, or `None` when either end leaves chrono's range.
fn local_datetime<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<NaiveDateTime> {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0)?.naive_utc();
    let offset = tz.offset_from_utc_datetime(&utc).fix().local_minus_utc();
    utc.checked_add_signed(Duration::seconds(i64::from(offset)))
}

/// Falls back to `ts` itself when the day cannot be represented.
fn day_start_in<Tz: TimeZone>(ts: i64, tz: &Tz) -> i64 {
    let Some(local) = local_datetime(ts, tz) else {
        return ts;
    };
    let midnight = local.date().and_time(NaiveTime::MIN);

    // Midnight can fall into a DST gap; take the first instant that exists.
    (0..24 * 60)
        .find_map(|minutes| {
            let candidate = midnight.checked_add_signed(Duration::minutes(minutes))?;
            let offset = tz.offset_from_local_datetime(&candidate).earliest()?;
            candidate.checked_sub_signed(Duration::seconds(i64::from(offset.fix().local_minus_utc())))
        })
        .map(|start| start.and_utc().timestamp())
        .filter(|&start| start <= ts)
        .unwrap_or(ts)
}

fn is_same_day_in<Tz: TimeZone>(ts1: i64, ts2: i64, tz: &Tz) -> bool {
    match (local_datetime(ts1, tz), local_datetime(ts2, tz)) {
        (Some(a), Some(b)) => a.date() == b.date(),
        _ => ts1 == ts2,
    }
}
