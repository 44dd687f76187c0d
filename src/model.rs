/// Core data types for the effluent treatment monitoring service.
///
/// This module defines the shared domain model imported by all other modules:
/// sensor readings, regulatory limits, alert records and the crate error type.
/// It contains no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single named sensor measurement from a treatment plant.
///
/// `name` is kept as a plain string: readings arrive from simulators and
/// HTTP endpoints, and an unrecognised name must surface as
/// `MonitorError::UnknownParameter` rather than be lost at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub name: String,
    pub value: f64,
}

impl Reading {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Limit types
// ---------------------------------------------------------------------------

/// Admissible closed interval `[min, max]` for one parameter.
///
/// Both bounds are inclusive. Registry entries are built with struct
/// literals; anything coming from configuration goes through `new`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterLimit {
    pub min: f64,
    pub max: f64,
}

impl ParameterLimit {
    /// Builds a limit, rejecting non-finite bounds and `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, MonitorError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(MonitorError::InvalidLimit { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// Alert severity, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Info,
    Warning,
    Critical,
}

impl AlertType {
    pub const ALL: [AlertType; 3] = [AlertType::Info, AlertType::Warning, AlertType::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Info => "info",
            AlertType::Warning => "warning",
            AlertType::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(AlertType::Info),
            "warning" => Ok(AlertType::Warning),
            "critical" => Ok(AlertType::Critical),
            _ => Err(MonitorError::InvalidAlertType(s.to_string())),
        }
    }
}

/// An immutable alert raised against one client (the owner).
///
/// Identity is `id`. Alerts are appended to an owner's log and never edited;
/// views filter them, nothing here deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub owner_id: String,
    pub owner_name: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the monitoring computations and the record services
/// built on top of them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonitorError {
    /// A reading references a parameter absent from the limit table.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    /// A sensor reported NaN or an infinite value.
    #[error("non-finite value for {name}: {value}")]
    NonFiniteValue { name: String, value: f64 },
    /// A time-range preset key that is not one of 24h/7d/30d/1y.
    #[error("invalid time range preset: {0}")]
    InvalidPreset(String),
    /// An alert severity other than info/warning/critical.
    #[error("invalid alert type: {0}")]
    InvalidAlertType(String),
    /// A limit with non-finite bounds or `min > max`.
    #[error("invalid limit [{min}, {max}]")]
    InvalidLimit { min: f64, max: f64 },
    /// Calendar arithmetic left the range chrono can represent, or hit a
    /// local time that does not exist in the caller's timezone.
    #[error("time out of range while building buckets")]
    TimeOutOfRange,
    /// A required field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("ticket already resolved: {0}")]
    TicketAlreadyResolved(String),
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("not found: {0}")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
