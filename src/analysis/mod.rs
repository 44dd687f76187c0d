/// Derived views over alert and reading collections.
///
/// Everything here is a pure function of its inputs: callers pass a snapshot
/// and an explicit `now`, and get a fresh result back. Nothing is cached and
/// no input is mutated.
///
/// Submodules:
/// - `buckets`:   calendar-aligned time buckets for the trailing-window presets.
/// - `aggregate`: per-bucket alert counts for one owner.
/// - `view`:      search/filter/sort over the alert list.
/// - `trends`:    per-bucket min/max/average of one parameter.

pub mod aggregate;
pub mod buckets;
pub mod trends;
pub mod view;
