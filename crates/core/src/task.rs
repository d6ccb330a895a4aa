//! Task model - the unit of work on the board.

use serde::{Deserialize, Serialize};
use crate::error::{CoreError, Result};
use crate::id::TaskId;
use crate::Time;

/// Shortest allowed title, counted in characters after trimming.
pub const TITLE_MIN_LEN: usize = 3;
/// Longest allowed title, counted in characters after trimming.
pub const TITLE_MAX_LEN: usize = 100;
/// Lowest priority.
pub const PRIORITY_MIN: u8 = 1;
/// Highest priority.
pub const PRIORITY_MAX: u8 = 5;

/// A task tracked on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Priority, 1 (lowest) to 5 (highest)
    pub priority: u8,

    /// Current status
    pub status: TaskStatus,

    /// When work started; fixed at creation
    pub start_time: Time,

    /// Estimated completion deadline
    pub end_time: Time,

    /// When the task actually reached Done
    pub actual_end_time: Option<Time>,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

/// Board status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,
    /// Finished
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// All statuses in board order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Parse a wire name.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Task {
    /// Create a To Do task starting at `start_time`.
    pub fn new(title: impl Into<String>, priority: u8, start_time: Time, end_time: Time) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into().trim().to_string(),
            priority,
            status: TaskStatus::ToDo,
            start_time,
            end_time,
            actual_end_time: None,
            created_at: start_time,
            updated_at: start_time,
        }
    }

    /// Move the task to `status` at instant `now`.
    ///
    /// Entering Done stamps `actual_end_time`; leaving Done clears it.
    /// Returns whether anything changed.
    pub fn transition_to(&mut self, status: TaskStatus, now: Time) -> bool {
        if self.status == status {
            return false;
        }

        self.actual_end_time = match status {
            TaskStatus::Done => Some(now),
            _ => None,
        };
        self.status = status;
        self.updated_at = now;
        true
    }

    /// Whether the task is finished.
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Check field ranges and the Done/actual-end-time pairing.
    pub fn validate(&self) -> Result<()> {
        let len = self.title.trim().chars().count();
        if len < TITLE_MIN_LEN {
            return Err(CoreError::validation(
                "title",
                format!("must be at least {} characters long", TITLE_MIN_LEN),
            ));
        }
        if len > TITLE_MAX_LEN {
            return Err(CoreError::validation(
                "title",
                format!("cannot exceed {} characters", TITLE_MAX_LEN),
            ));
        }

        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&self.priority) {
            return Err(CoreError::validation(
                "priority",
                format!("must be between {} and {}", PRIORITY_MIN, PRIORITY_MAX),
            ));
        }

        match (self.status, self.actual_end_time) {
            (TaskStatus::Done, None) => Err(CoreError::validation(
                "actualEndTime",
                "required once the task is Done",
            )),
            (status, Some(_)) if status != TaskStatus::Done => Err(CoreError::validation(
                "actualEndTime",
                format!("must be empty while the task is {}", status),
            )),
            _ => Ok(()),
        }
    }
}

/// Filter for querying tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Filter by status
    pub status: Option<Vec<TaskStatus>>,

    /// Filter by minimum priority
    pub min_priority: Option<u8>,
}

impl TaskFilter {
    /// Whether `task` passes the filter.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(statuses) = &self.status {
            if !statuses.contains(&task.status) {
                return false;
            }
        }
        match self.min_priority {
            Some(min) => task.priority >= min,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn sample() -> Task {
        Task::new("Write report", 3, t0(), t0() + Duration::hours(24))
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("  Padded title  ", 2, t0(), t0());
        assert_eq!(task.title, "Padded title");
        assert_eq!(task.status, TaskStatus::ToDo);
        assert!(task.actual_end_time.is_none());
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_transition_into_done_stamps_actual_end() {
        let mut task = sample();
        let now = t0() + Duration::hours(5);

        assert!(task.transition_to(TaskStatus::Done, now));
        assert_eq!(task.actual_end_time, Some(now));
        assert_eq!(task.updated_at, now);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_transition_out_of_done_clears_actual_end() {
        let mut task = sample();
        task.transition_to(TaskStatus::Done, t0() + Duration::hours(1));
        task.transition_to(TaskStatus::InProgress, t0() + Duration::hours(2));

        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.actual_end_time.is_none());
    }

    #[test]
    fn test_transition_to_same_status_is_noop() {
        let mut task = sample();
        let done_at = t0() + Duration::hours(1);
        task.transition_to(TaskStatus::Done, done_at);

        assert!(!task.transition_to(TaskStatus::Done, t0() + Duration::hours(9)));
        assert_eq!(task.actual_end_time, Some(done_at));
    }

    #[test]
    fn test_validate_title_bounds() {
        let mut task = sample();
        task.title = "ab".to_string();
        assert!(matches!(
            task.validate(),
            Err(CoreError::Validation { field: "title", .. })
        ));

        task.title = "x".repeat(101);
        assert!(task.validate().is_err());

        task.title = "x".repeat(100);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_validate_priority_bounds() {
        let mut task = sample();
        for bad in [0, 6] {
            task.priority = bad;
            assert!(matches!(
                task.validate(),
                Err(CoreError::Validation { field: "priority", .. })
            ));
        }
    }

    #[test]
    fn test_validate_done_pairing() {
        let mut task = sample();
        task.status = TaskStatus::Done;
        assert!(task.validate().is_err());

        task.status = TaskStatus::ToDo;
        task.actual_end_time = Some(t0());
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_validate_allows_end_before_start() {
        let task = Task::new("Backdated", 3, t0(), t0() - Duration::hours(5));
        assert!(task.end_time < task.start_time);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        assert_eq!(TaskStatus::from_wire("To Do"), Some(TaskStatus::ToDo));
        assert_eq!(TaskStatus::from_wire("finished"), None);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("startTime").is_some());
        assert!(value.get("actualEndTime").unwrap().is_null());
    }

    #[test]
    fn test_filter_matches() {
        let task = sample();
        let filter = TaskFilter {
            status: Some(vec![TaskStatus::Done]),
            ..Default::default()
        };
        assert!(!filter.matches(&task));

        let filter = TaskFilter {
            min_priority: Some(3),
            ..Default::default()
        };
        assert!(filter.matches(&task));
        assert!(TaskFilter::default().matches(&task));
    }
}
