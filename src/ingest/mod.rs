/// Sources of live parameter readings.
///
/// Submodules:
/// - `simulator`: seeded random snapshots, for demos and offline runs.
/// - `api`:       blocking HTTP client for a plant gateway's readings endpoint.

pub mod api;
pub mod simulator;

use crate::model::{MonitorError, Reading};

/// Errors raised while obtaining a reading snapshot.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx response from the readings endpoint.
    #[error("HTTP status {0}")]
    Status(u16),
    /// The payload named a parameter the registry does not know.
    #[error("invalid reading: {0}")]
    Invalid(#[from] MonitorError),
}

/// Anything that can produce a fresh snapshot of a plant's readings.
pub trait ReadingSource {
    /// Short identifier used in log lines.
    fn name(&self) -> &str;

    fn next_snapshot(&mut self) -> Result<Vec<Reading>, IngestError>;
}

impl<S: ReadingSource + ?Sized> ReadingSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn next_snapshot(&mut self) -> Result<Vec<Reading>, IngestError> {
        (**self).next_snapshot()
    }
}
