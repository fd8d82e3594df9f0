//! Background Tasks Module
//!
//! Contains background tasks that run alongside a cache.
//!
//! # Tasks
//! - Stats reporter: logs a statistics snapshot at configured intervals

mod reporter;

pub use reporter::spawn_stats_reporter;
