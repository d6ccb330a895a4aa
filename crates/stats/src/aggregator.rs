//! Statistics aggregation over a task list.

use std::sync::Arc;
use chrono::Utc;
use taskboard_core::{normalize_all, Task, TaskRecord, TaskStatus, Time};
use tracing::debug;

use crate::snapshot::{InProgressMetrics, StatsSnapshot, StatusDistribution};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Errors from the record-normalizing entry point.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// A record could not be turned into a task
    #[error(transparent)]
    MalformedRecord(#[from] taskboard_core::CoreError),
}

/// Source of the reference instant.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Time;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Time);

impl Clock for FixedClock {
    fn now(&self) -> Time {
        self.0
    }
}

/// Computes [`StatsSnapshot`]s.
///
/// Holds nothing but the clock used by [`StatsAggregator::compute_now`];
/// every call recomputes from the tasks it is given.
#[derive(Clone)]
pub struct StatsAggregator {
    clock: Arc<dyn Clock>,
}

impl StatsAggregator {
    /// Aggregator reading the wall clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Snapshot relative to `now`.
    pub fn compute(&self, tasks: &[Task], now: Time) -> StatsSnapshot {
        compute_stats(tasks, now)
    }

    /// Snapshot relative to the aggregator's clock.
    pub fn compute_now(&self, tasks: &[Task]) -> StatsSnapshot {
        compute_stats(tasks, self.clock.now())
    }

    /// Normalize wire records, then snapshot relative to `now`.
    pub fn compute_records(&self, records: &[TaskRecord], now: Time) -> Result<StatsSnapshot, StatsError> {
        compute_stats_from_records(records, now)
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Running sums for one pass over the tasks.
#[derive(Default)]
struct Totals {
    todo: usize,
    in_progress: usize,
    done: usize,
    lapsed_hours: f64,
    balance_hours: f64,
    completion_hours: f64,
    completed: usize,
}

impl Totals {
    fn add(&mut self, task: &Task, now: Time) {
        match task.status {
            TaskStatus::ToDo => self.todo += 1,
            TaskStatus::InProgress => {
                self.in_progress += 1;
                self.lapsed_hours += hours_between(task.start_time, now).max(0.0);
                self.balance_hours += hours_between(now, task.end_time).max(0.0);
            }
            TaskStatus::Done => {
                self.done += 1;
                // Inconsistent data can make this negative; it is kept as is.
                if let Some(actual_end) = task.actual_end_time {
                    self.completion_hours += hours_between(task.start_time, actual_end);
                    self.completed += 1;
                }
            }
        }
    }
}

/// Compute the statistics snapshot of `tasks` relative to `now`.
///
/// Pure: the same tasks and `now` always give the same snapshot.
pub fn compute_stats(tasks: &[Task], now: Time) -> StatsSnapshot {
    let mut totals = Totals::default();
    for task in tasks {
        totals.add(task, now);
    }

    let total = tasks.len();
    let share = |count: usize| (total > 0).then(|| round_one_decimal(count as f64 / total as f64 * 100.0));

    let snapshot = StatsSnapshot {
        as_of: now,
        total_tasks: total,
        status_distribution: StatusDistribution {
            todo: totals.todo,
            in_progress: totals.in_progress,
            done: totals.done,
            todo_percent: share(totals.todo),
            in_progress_percent: share(totals.in_progress),
            done_percent: share(totals.done),
        },
        in_progress_metrics: InProgressMetrics {
            total_lapsed_time: totals.lapsed_hours,
            total_balance_time: totals.balance_hours,
            task_count: totals.in_progress,
            average_lapsed_time: average(totals.lapsed_hours, totals.in_progress),
            average_balance_time: average(totals.balance_hours, totals.in_progress),
        },
        average_completion_time: average(totals.completion_hours, totals.completed),
        completed_task_count: totals.completed,
    };

    debug!(
        total = snapshot.total_tasks,
        in_progress = totals.in_progress,
        completed = totals.completed,
        "computed task statistics"
    );
    snapshot
}

/// Normalize wire records and compute their snapshot.
///
/// Fails on the first record with an unparseable field instead of producing
/// a snapshot with meaningless numbers.
pub fn compute_stats_from_records(records: &[TaskRecord], now: Time) -> Result<StatsSnapshot, StatsError> {
    let tasks = normalize_all(records)?;
    Ok(compute_stats(&tasks, now))
}

/// Signed hours from `from` to `to`, millisecond precision.
pub fn hours_between(from: Time, to: Time) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Round to one decimal place, halves away from zero.
pub fn round_one_decimal(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // collapse -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round_one_decimal(sum / count as f64)
}
