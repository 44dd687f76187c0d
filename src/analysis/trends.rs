//! Historical parameter trends: min/max/average of one parameter per bucket.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::buckets::{TimeRangePreset, generate_buckets};
use crate::model::MonitorError;

/// A timestamped reading, as kept in a plant's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Summary of one bucket. Statistics are `None` when the bucket holds no
/// samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub count: usize,
}

/// Summarises `parameter` over the preset's buckets, oldest first.
/// NaN samples are skipped.
pub fn daily_trend<Tz: TimeZone>(
    samples: &[Sample],
    parameter: &str,
    preset: TimeRangePreset,
    now: &DateTime<Tz>,
) -> Result<Vec<TrendPoint>, MonitorError> {
    let buckets = generate_buckets(preset, now)?;
    let relevant: Vec<&Sample> = samples
        .iter()
        .filter(|s| s.name == parameter && !s.value.is_nan())
        .collect();

    let points = buckets
        .into_iter()
        .map(|bucket| {
            let values: Vec<f64> = relevant
                .iter()
                .filter(|s| bucket.contains(&s.timestamp))
                .map(|s| s.value)
                .collect();
            summarise(bucket.label, &values)
        })
        .collect();

    Ok(points)
}

fn summarise(label: String, values: &[f64]) -> TrendPoint {
    if values.is_empty() {
        return TrendPoint {
            label,
            min: None,
            max: None,
            average: None,
            count: 0,
        };
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = values.iter().sum::<f64>() / values.len() as f64;
    TrendPoint {
        label,
        min: Some(min),
        max: Some(max),
        average: Some(average),
        count: values.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, value: f64, day: u32, hour: u32) -> Sample {
        Sample {
            name: name.to_string(),
            value,
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_daily_trend_summarises_each_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 14, 37, 0).unwrap();
        let samples = vec![
            sample("COD", 140.0, 14, 1),
            sample("COD", 180.0, 14, 9),
            sample("COD", 160.0, 14, 22),
            sample("BOD", 25.0, 14, 9),
            sample("COD", 150.0, 15, 3),
        ];
        let points = daily_trend(&samples, "COD", TimeRangePreset::Last7Days, &now)
            .expect("trend");

        assert_eq!(points.len(), 7);
        let mar14 = &points[5];
        assert_eq!(mar14.label, "Mar 14");
        assert_eq!(mar14.count, 3);
        assert_eq!(mar14.min, Some(140.0));
        assert_eq!(mar14.max, Some(180.0));
        assert_eq!(mar14.average, Some(160.0));
        assert_eq!(points[6].count, 1);
    }

    #[test]
    fn test_empty_days_have_no_statistics() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 14, 0, 0).unwrap();
        let points = daily_trend(&[], "pH", TimeRangePreset::Last30Days, &now).expect("trend");
        assert_eq!(points.len(), 30);
        assert!(points.iter().all(|p| p.count == 0 && p.average.is_none()));
    }

    #[test]
    fn test_nan_samples_are_skipped() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 14, 0, 0).unwrap();
        let samples = vec![sample("pH", f64::NAN, 15, 1), sample("pH", 7.0, 15, 2)];
        let points = daily_trend(&samples, "pH", TimeRangePreset::Last7Days, &now).expect("trend");
        assert_eq!(points[6].count, 1);
        assert_eq!(points[6].average, Some(7.0));
    }
}
