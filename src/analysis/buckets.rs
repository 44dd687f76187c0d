//! Calendar-aligned time buckets for the alert distribution charts.
//!
//! # Clock injection
//! Every function takes `now` explicitly instead of calling `Utc::now()`.
//! Buckets are computed in the timezone carried by `now`, so an operator in
//! IST gets day buckets that start at local midnight. Bucket instants are
//! stored in UTC so they compare directly against alert timestamps.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::MonitorError;

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Width of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hour,
    Day,
    Month,
}

/// Trailing window selectable on the alert dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRangePreset {
    #[serde(rename = "24h", alias = "last24h")]
    Last24Hours,
    #[serde(rename = "7d", alias = "last7d")]
    Last7Days,
    #[serde(rename = "30d", alias = "last30d")]
    Last30Days,
    #[serde(rename = "1y", alias = "lastYear")]
    LastYear,
}

impl TimeRangePreset {
    pub const ALL: [TimeRangePreset; 4] = [
        TimeRangePreset::Last24Hours,
        TimeRangePreset::Last7Days,
        TimeRangePreset::Last30Days,
        TimeRangePreset::LastYear,
    ];

    /// Number of buckets the preset always produces.
    pub fn bucket_count(&self) -> u32 {
        match self {
            TimeRangePreset::Last24Hours => 24,
            TimeRangePreset::Last7Days => 7,
            TimeRangePreset::Last30Days => 30,
            TimeRangePreset::LastYear => 12,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            TimeRangePreset::Last24Hours => Granularity::Hour,
            TimeRangePreset::Last7Days | TimeRangePreset::Last30Days => Granularity::Day,
            TimeRangePreset::LastYear => Granularity::Month,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TimeRangePreset::Last24Hours => "24h",
            TimeRangePreset::Last7Days => "7d",
            TimeRangePreset::Last30Days => "30d",
            TimeRangePreset::LastYear => "1y",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TimeRangePreset::Last24Hours => "Last 24 Hours",
            TimeRangePreset::Last7Days => "Last 7 Days",
            TimeRangePreset::Last30Days => "Last 30 Days",
            TimeRangePreset::LastYear => "Last Year",
        }
    }

    /// Chart x-axis caption.
    pub fn axis_label(&self) -> &'static str {
        match self.granularity() {
            Granularity::Hour => "Hour",
            Granularity::Day => "Date",
            Granularity::Month => "Month",
        }
    }
}

impl Default for TimeRangePreset {
    fn default() -> Self {
        TimeRangePreset::Last7Days
    }
}

impl fmt::Display for TimeRangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TimeRangePreset {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" | "last24h" => Ok(TimeRangePreset::Last24Hours),
            "7d" | "last7d" => Ok(TimeRangePreset::Last7Days),
            "30d" | "last30d" => Ok(TimeRangePreset::Last30Days),
            "1y" | "lastyear" => Ok(TimeRangePreset::LastYear),
            _ => Err(MonitorError::InvalidPreset(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Half-open interval `[start, end)` with its chart label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl TimeBucket {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

/// Zeroes minutes, seconds and sub-seconds of `now` in its own timezone.
///
/// Repeated calls within the same hour therefore produce identical bucket
/// boundaries.
pub fn truncate_to_hour<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<DateTime<Tz>, MonitorError> {
    now.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        .ok_or(MonitorError::TimeOutOfRange)
}

/// Builds the preset's buckets, oldest first, ending with the bucket that
/// contains `now`.
///
/// Day buckets start at local midnight and month buckets on the first of
/// the month, so a label always names a whole calendar period.
pub fn generate_buckets<Tz: TimeZone>(
    preset: TimeRangePreset,
    now: &DateTime<Tz>,
) -> Result<Vec<TimeBucket>, MonitorError> {
    let anchor = truncate_to_hour(now)?;
    let count = preset.bucket_count();
    let mut buckets = Vec::with_capacity(count as usize);

    for i in 0..count {
        let back = count - 1 - i;
        let bucket = match preset.granularity() {
            Granularity::Hour => hour_bucket(&anchor, back)?,
            Granularity::Day => day_bucket(&anchor, back)?,
            Granularity::Month => month_bucket(&anchor, back)?,
        };
        buckets.push(bucket);
    }

    Ok(buckets)
}

/// Overall `[first.start, last.end)` window covered by `buckets`.
pub fn window(buckets: &[TimeBucket]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    Some((buckets.first()?.start, buckets.last()?.end))
}

fn hour_bucket<Tz: TimeZone>(anchor: &DateTime<Tz>, back: u32) -> Result<TimeBucket, MonitorError> {
    let start = anchor
        .clone()
        .checked_sub_signed(Duration::hours(i64::from(back)))
        .ok_or(MonitorError::TimeOutOfRange)?;
    let end = start
        .clone()
        .checked_add_signed(Duration::hours(1))
        .ok_or(MonitorError::TimeOutOfRange)?;
    Ok(TimeBucket {
        label: format!("{:02}:00", start.hour()),
        start: start.with_timezone(&Utc),
        end: end.with_timezone(&Utc),
    })
}

fn day_bucket<Tz: TimeZone>(anchor: &DateTime<Tz>, back: u32) -> Result<TimeBucket, MonitorError> {
    let tz = anchor.timezone();
    let day = anchor
        .date_naive()
        .checked_sub_days(Days::new(u64::from(back)))
        .ok_or(MonitorError::TimeOutOfRange)?;
    let next = day
        .checked_add_days(Days::new(1))
        .ok_or(MonitorError::TimeOutOfRange)?;
    Ok(TimeBucket {
        start: local_midnight(&tz, day)?,
        end: local_midnight(&tz, next)?,
        label: day.format("%b %-d").to_string(),
    })
}

fn month_bucket<Tz: TimeZone>(anchor: &DateTime<Tz>, back: u32) -> Result<TimeBucket, MonitorError> {
    let tz = anchor.timezone();
    let today = anchor.date_naive();
    let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .and_then(|d| d.checked_sub_months(Months::new(back)))
        .ok_or(MonitorError::TimeOutOfRange)?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or(MonitorError::TimeOutOfRange)?;
    Ok(TimeBucket {
        start: local_midnight(&tz, first)?,
        end: local_midnight(&tz, next)?,
        label: first.format("%b").to_string(),
    })
}

/// Start of `date` in `tz`, as a UTC instant. Where a DST transition makes
/// midnight ambiguous the earlier instant wins.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>, MonitorError> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or(MonitorError::TimeOutOfRange)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(MonitorError::TimeOutOfRange)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
