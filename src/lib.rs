//! Effluent/sewage treatment plant monitoring service
//!
//! Threshold evaluation of live parameter readings, alert aggregation into
//! time-range buckets, and the filter/sort view over a client's alerts.

pub mod alert;
pub mod analysis;
pub mod clients;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod parameters;
pub mod store;
pub mod tickets;
