//! NEWS-style early-warning score calculation.
//!
//! [`catalog`] holds the scored `(min, max]` ranges per measurement type and
//! enforces that ranges of one type never overlap. [`scoring`] validates a
//! batch of measurements, matches each against the catalog and sums the
//! scores, collecting per-measurement errors instead of stopping at the first.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod output;
pub mod scoring;
