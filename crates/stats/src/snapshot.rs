//! Derived statistics over a task list.

use serde::{Deserialize, Serialize};
use taskboard_core::{TaskStatus, Time};

/// A point-in-time view of the board's statistics.
///
/// Snapshots are recomputed from the task list whenever it changes and are
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Reference instant used for lapsed/balance time
    pub as_of: Time,

    /// Number of tasks in the input
    pub total_tasks: usize,

    /// Per-status counts and shares
    pub status_distribution: StatusDistribution,

    /// Time metrics over In Progress tasks
    pub in_progress_metrics: InProgressMetrics,

    /// Mean start-to-finish duration of Done tasks, in hours (one decimal)
    pub average_completion_time: f64,

    /// Done tasks that contributed to `average_completion_time`
    pub completed_task_count: usize,
}

impl StatsSnapshot {
    /// Snapshot of an empty board.
    pub fn empty(as_of: Time) -> Self {
        Self {
            as_of,
            total_tasks: 0,
            status_distribution: StatusDistribution::default(),
            in_progress_metrics: InProgressMetrics::default(),
            average_completion_time: 0.0,
            completed_task_count: 0,
        }
    }
}

/// Task counts per status with their percentage of the total.
///
/// Percentages are `None` when there are no tasks at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDistribution {
    /// To Do count
    pub todo: usize,
    /// In Progress count
    pub in_progress: usize,
    /// Done count
    pub done: usize,
    /// Share of To Do tasks, percent with one decimal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_percent: Option<f64>,
    /// Share of In Progress tasks, percent with one decimal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress_percent: Option<f64>,
    /// Share of Done tasks, percent with one decimal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_percent: Option<f64>,
}

impl StatusDistribution {
    /// Count for one status.
    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::ToDo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }

    /// Percentage for one status.
    pub fn percent(&self, status: TaskStatus) -> Option<f64> {
        match status {
            TaskStatus::ToDo => self.todo_percent,
            TaskStatus::InProgress => self.in_progress_percent,
            TaskStatus::Done => self.done_percent,
        }
    }
}

/// Lapsed and balance time over tasks currently In Progress, in hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgressMetrics {
    /// Sum of hours elapsed since each task started
    pub total_lapsed_time: f64,
    /// Sum of hours left until each task's estimated end
    pub total_balance_time: f64,
    /// Number of In Progress tasks
    pub task_count: usize,
    /// `total_lapsed_time / task_count`, one decimal; 0 without tasks
    pub average_lapsed_time: f64,
    /// `total_balance_time / task_count`, one decimal; 0 without tasks
    pub average_balance_time: f64,
}
