/// Regulatory threshold checking for live parameter readings.
///
/// Submodules:
/// - `thresholds`: flags readings that fall outside their admissible band.

pub mod thresholds;
