//! Drag-and-drop between board columns.

use serde::Serialize;
use taskboard_core::{Task, Time};

use crate::view::{Board, ColumnId};

/// A position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DragLocation {
    /// Column
    pub column: ColumnId,
    /// Index within the column as displayed
    pub index: usize,
}

impl DragLocation {
    /// Position `index` in `column`.
    pub fn new(column: ColumnId, index: usize) -> Self {
        Self { column, index }
    }
}

/// Outcome of a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DragResult {
    /// Where the card was picked up
    pub source: DragLocation,
    /// Where it was released; `None` when dropped outside any column
    pub destination: Option<DragLocation>,
}

impl Board {
    /// Resolve a drop into the updated task to persist.
    ///
    /// Returns `None` when the card was dropped outside the board or the
    /// source position does not exist. The task takes the destination
    /// column's status at instant `now`.
    pub fn resolve_drop(&self, drag: &DragResult, now: Time) -> Option<Task> {
        let destination = drag.destination?;
        let mut task = self
            .column(drag.source.column)
            .tasks
            .get(drag.source.index)?
            .clone();

        task.transition_to(destination.column.status(), now);
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use taskboard_core::TaskStatus;
    use crate::view::BoardQuery;

    fn now() -> Time {
        Utc.with_ymd_and_hms(2024, 4, 2, 15, 0, 0).unwrap()
    }

    fn board() -> Board {
        let start = now() - Duration::hours(3);
        let mut active = Task::new("Fix login", 4, start, start + Duration::hours(8));
        active.transition_to(TaskStatus::InProgress, start);
        let mut finished = Task::new("Write docs", 2, start, start + Duration::hours(8));
        finished.transition_to(TaskStatus::Done, start + Duration::hours(1));
        let waiting = Task::new("Plan sprint", 3, start, start + Duration::hours(8));

        Board::build(&[active, finished, waiting], &BoardQuery::default())
    }

    #[test]
    fn test_drop_outside_is_noop() {
        let drag = DragResult {
            source: DragLocation::new(ColumnId::Todo, 0),
            destination: None,
        };
        assert!(board().resolve_drop(&drag, now()).is_none());
    }

    #[test]
    fn test_drop_with_bad_source_is_noop() {
        let drag = DragResult {
            source: DragLocation::new(ColumnId::Todo, 7),
            destination: Some(DragLocation::new(ColumnId::Done, 0)),
        };
        assert!(board().resolve_drop(&drag, now()).is_none());
    }

    #[test]
    fn test_drop_into_done_stamps_completion() {
        let drag = DragResult {
            source: DragLocation::new(ColumnId::InProgress, 0),
            destination: Some(DragLocation::new(ColumnId::Done, 0)),
        };

        let task = board().resolve_drop(&drag, now()).unwrap();
        assert_eq!(task.title, "Fix login");
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.actual_end_time, Some(now()));
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_drop_out_of_done_clears_completion() {
        let drag = DragResult {
            source: DragLocation::new(ColumnId::Done, 0),
            destination: Some(DragLocation::new(ColumnId::Todo, 1)),
        };

        let task = board().resolve_drop(&drag, now()).unwrap();
        assert_eq!(task.status, TaskStatus::ToDo);
        assert!(task.actual_end_time.is_none());
    }

    #[test]
    fn test_drop_within_same_column_keeps_task() {
        let board = board();
        let drag = DragResult {
            source: DragLocation::new(ColumnId::Done, 0),
            destination: Some(DragLocation::new(ColumnId::Done, 0)),
        };

        let task = board.resolve_drop(&drag, now()).unwrap();
        assert_eq!(&task, &board.column(ColumnId::Done).tasks[0]);
    }
}
