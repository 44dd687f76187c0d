//! Live monitoring loop.
//!
//! Pulls a snapshot from a `ReadingSource`, runs it through the threshold
//! evaluator and raises one operator notification (a warning log line) per
//! breach. A failed poll is logged and treated as an empty poll; the next
//! cycle starts from scratch.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::alert::thresholds::{OutOfRangeReading, evaluate};
use crate::analysis::trends::Sample;
use crate::ingest::ReadingSource;
use crate::logging::{self, Component};
use crate::model::Reading;
use crate::parameters::LimitTable;

/// Result of one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    pub taken_at: DateTime<Utc>,
    pub readings: Vec<Reading>,
    pub breaches: Vec<OutOfRangeReading>,
    /// Set when the poll failed and the outcome is the empty fallback.
    pub error: Option<String>,
}

impl PollOutcome {
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.breaches.is_empty()
    }

    /// The readings stamped with the poll time, for trend history.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.readings.iter().map(|r| Sample {
            name: r.name.clone(),
            value: r.value,
            timestamp: self.taken_at,
        })
    }
}

pub struct LiveMonitor<S> {
    source: S,
    limits: LimitTable,
}

impl<S: ReadingSource> LiveMonitor<S> {
    pub fn new(source: S, limits: LimitTable) -> Self {
        Self { source, limits }
    }

    pub fn limits(&self) -> &LimitTable {
        &self.limits
    }

    /// Fetches and evaluates one snapshot.
    pub fn poll_once(&mut self) -> PollOutcome {
        let plant = self.source.name().to_string();
        let taken_at = Utc::now();

        let readings = match self.source.next_snapshot() {
            Ok(readings) => readings,
            Err(e) => {
                logging::log_fetch_failure(&plant, "snapshot", &e);
                return PollOutcome {
                    taken_at,
                    error: Some(e.to_string()),
                    ..PollOutcome::default()
                };
            }
        };

        match evaluate(&readings, &self.limits) {
            Ok(breaches) => {
                for breach in &breaches {
                    logging::log_breach(&plant, breach);
                }
                logging::log_poll_summary(&plant, readings.len(), breaches.len());
                PollOutcome {
                    taken_at,
                    readings,
                    breaches,
                    error: None,
                }
            }
            Err(e) => {
                logging::error(Component::Monitor, Some(&plant), &format!("evaluation failed: {}", e));
                PollOutcome {
                    taken_at,
                    error: Some(e.to_string()),
                    ..PollOutcome::default()
                }
            }
        }
    }

    /// Polls `cycles` times, sleeping `interval` between polls.
    pub fn run(&mut self, cycles: usize, interval: Duration) -> Vec<PollOutcome> {
        let mut outcomes = Vec::with_capacity(cycles);
        for cycle in 0..cycles {
            if cycle > 0 && !interval.is_zero() {
                thread::sleep(interval);
            }
            outcomes.push(self.poll_once());
        }
        let breaches: usize = outcomes.iter().map(|o| o.breaches.len()).sum();
        logging::info(
            Component::Monitor,
            Some(self.source.name()),
            &format!("{} polls, {} breaches", cycles, breaches),
        );
        outcomes
    }
}
