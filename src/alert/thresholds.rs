//! Regulatory band checking.
//!
//! Pure functions only: the user-facing notification for a breach is raised
//! by the caller (see `monitor::LiveMonitor`), never from here.

use serde::Serialize;

use crate::model::{MonitorError, ParameterLimit, Reading};
use crate::parameters::LimitTable;

/// Which side of the band a reading fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Breach {
    BelowMin,
    AboveMax,
}

/// A reading that fell outside its limit, paired with that limit for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfRangeReading {
    pub reading: Reading,
    pub limit: ParameterLimit,
    pub breach: Breach,
}

impl OutOfRangeReading {
    /// One-line description used for notifications.
    pub fn describe(&self) -> String {
        let side = match self.breach {
            Breach::BelowMin => format!("below minimum {}", self.limit.min),
            Breach::AboveMax => format!("above maximum {}", self.limit.max),
        };
        format!("{} = {:.2} is {}", self.reading.name, self.reading.value, side)
    }
}

/// Checks one reading against its limit.
///
/// Returns `Ok(None)` when the value lies inside the closed band and
/// `UnknownParameter` when the table has no entry for the reading's name.
pub fn check_reading(
    reading: &Reading,
    limits: &LimitTable,
) -> Result<Option<OutOfRangeReading>, MonitorError> {
    let limit = limits
        .get(&reading.name)
        .ok_or_else(|| MonitorError::UnknownParameter(reading.name.clone()))?;

    let breach = if reading.value < limit.min {
        Breach::BelowMin
    } else if reading.value > limit.max {
        Breach::AboveMax
    } else {
        return Ok(None);
    };

    Ok(Some(OutOfRangeReading {
        reading: reading.clone(),
        limit: *limit,
        breach,
    }))
}

/// Returns the out-of-range readings, in input order.
///
/// A single unknown parameter name fails the whole call.
pub fn evaluate(
    readings: &[Reading],
    limits: &LimitTable,
) -> Result<Vec<OutOfRangeReading>, MonitorError> {
    let mut flagged = Vec::new();
    for reading in readings {
        if let Some(out) = check_reading(reading, limits)? {
            flagged.push(out);
        }
    }
    Ok(flagged)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
