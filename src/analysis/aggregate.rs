//! Per-bucket alert counts for one owner.
//!
//! `aggregate` is what the alert distribution chart draws: one row per
//! bucket, stacked by severity, with zero rows kept so the axis never
//! truncates.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::analysis::buckets::{TimeRangePreset, generate_buckets};
use crate::model::{Alert, AlertType, MonitorError};

/// Alert counts for one time bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub label: String,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub total: usize,
}

impl AggregateRow {
    fn empty(label: String) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    fn record(&mut self, alert_type: AlertType) {
        match alert_type {
            AlertType::Critical => self.critical += 1,
            AlertType::Warning => self.warning += 1,
            AlertType::Info => self.info += 1,
        }
        self.total += 1;
    }
}

/// Severity totals with no time dimension (the dashboard's summary cards).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }

    pub fn get(&self, alert_type: AlertType) -> usize {
        match alert_type {
            AlertType::Critical => self.critical,
            AlertType::Warning => self.warning,
            AlertType::Info => self.info,
        }
    }
}

/// Buckets `owner_id`'s alerts over the preset's trailing window.
///
/// Always returns exactly `preset.bucket_count()` rows, oldest first.
/// Alerts of other owners, or outside the window, are ignored.
pub fn aggregate<Tz: TimeZone>(
    alerts: &[Alert],
    owner_id: &str,
    preset: TimeRangePreset,
    now: &DateTime<Tz>,
) -> Result<Vec<AggregateRow>, MonitorError> {
    let buckets = generate_buckets(preset, now)?;
    let owned: Vec<&Alert> = alerts.iter().filter(|a| a.owner_id == owner_id).collect();

    let rows = buckets
        .into_iter()
        .map(|bucket| {
            let mut row = AggregateRow::empty(bucket.label.clone());
            for alert in owned.iter().filter(|a| bucket.contains(&a.timestamp)) {
                row.record(alert.alert_type);
            }
            row
        })
        .collect();

    Ok(rows)
}

/// Counts alerts by severity for one owner, or for everyone when `owner_id`
/// is `None`.
pub fn severity_totals(alerts: &[Alert], owner_id: Option<&str>) -> SeverityCounts {
    alerts
        .iter()
        .filter(|a| owner_id.is_none_or(|id| a.owner_id == id))
        .fold(SeverityCounts::default(), |mut acc, a| {
            match a.alert_type {
                AlertType::Critical => acc.critical += 1,
                AlertType::Warning => acc.warning += 1,
                AlertType::Info => acc.info += 1,
            }
            acc
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
