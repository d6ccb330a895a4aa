//! Task statistics
//!
//! Status distribution, in-progress time metrics and average completion
//! time, computed as a pure projection of the task list.

#![warn(missing_docs)]

pub mod aggregator;
pub mod snapshot;

pub use aggregator::{
    compute_stats, compute_stats_from_records, hours_between, round_one_decimal,
    Clock, FixedClock, StatsAggregator, StatsError, SystemClock,
};
pub use snapshot::{InProgressMetrics, StatsSnapshot, StatusDistribution};
