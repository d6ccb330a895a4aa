//! Board view: three status columns with search and sort applied.

use std::cmp::Ordering;
use serde::Serialize;
use taskboard_core::{Task, TaskStatus};

/// Unknown sort or column name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Not a sort mode
    #[error("unknown sort mode: {0} (expected recent, alphabetical, startTime, endTime or priority)")]
    SortBy(String),

    /// Not a column id
    #[error("unknown column: {0} (expected todo, inProgress or done)")]
    Column(String),
}

/// Ordering applied to each column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Latest start first
    #[default]
    Recent,
    /// By title, ignoring case
    Alphabetical,
    /// Earliest start first
    StartTime,
    /// Earliest deadline first
    EndTime,
    /// Highest priority first
    Priority,
}

impl SortBy {
    /// Name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Recent => "recent",
            SortBy::Alphabetical => "alphabetical",
            SortBy::StartTime => "startTime",
            SortBy::EndTime => "endTime",
            SortBy::Priority => "priority",
        }
    }

    /// Stable sort of `tasks` in this order.
    pub fn sort(&self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortBy::Recent => b.start_time.cmp(&a.start_time),
            SortBy::Alphabetical => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
            SortBy::StartTime => a.start_time.cmp(&b.start_time),
            SortBy::EndTime => a.end_time.cmp(&b.end_time),
            SortBy::Priority => b.priority.cmp(&a.priority),
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(SortBy::Recent),
            "alphabetical" => Ok(SortBy::Alphabetical),
            "startTime" => Ok(SortBy::StartTime),
            "endTime" => Ok(SortBy::EndTime),
            "priority" => Ok(SortBy::Priority),
            other => Err(ParseError::SortBy(other.to_string())),
        }
    }
}

/// One of the three board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnId {
    /// To Do tasks
    Todo,
    /// In Progress tasks
    InProgress,
    /// Done tasks
    Done,
}

impl ColumnId {
    /// Columns in display order.
    pub const ALL: [ColumnId; 3] = [ColumnId::Todo, ColumnId::InProgress, ColumnId::Done];

    /// Column id string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Todo => "todo",
            ColumnId::InProgress => "inProgress",
            ColumnId::Done => "done",
        }
    }

    /// Heading shown above the column.
    pub fn title(&self) -> &'static str {
        match self {
            ColumnId::Todo => "TO DO",
            ColumnId::InProgress => "IN PROGRESS",
            ColumnId::Done => "DONE",
        }
    }

    /// Status of the tasks the column holds.
    pub fn status(&self) -> TaskStatus {
        match self {
            ColumnId::Todo => TaskStatus::ToDo,
            ColumnId::InProgress => TaskStatus::InProgress,
            ColumnId::Done => TaskStatus::Done,
        }
    }

    /// Column holding tasks of `status`.
    pub fn for_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::ToDo => ColumnId::Todo,
            TaskStatus::InProgress => ColumnId::InProgress,
            TaskStatus::Done => ColumnId::Done,
        }
    }
}

impl std::str::FromStr for ColumnId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnId::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseError::Column(s.to_string()))
    }
}

/// Search and sort settings for building a board.
#[derive(Debug, Clone, Default)]
pub struct BoardQuery {
    /// Case-insensitive title substring; empty matches everything
    pub search: String,

    /// Ordering within each column
    pub sort_by: SortBy,
}

impl BoardQuery {
    /// Query with a search term and the default ordering.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Default::default()
        }
    }

    /// Set the ordering.
    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Whether `task` passes the search term.
    pub fn matches(&self, task: &Task) -> bool {
        self.search.is_empty() || task.title.to_lowercase().contains(&self.search.to_lowercase())
    }
}

/// A column of the board.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    /// Column id
    pub id: ColumnId,
    /// Heading
    pub title: &'static str,
    /// Tasks after search and sort
    pub tasks: Vec<Task>,
}

/// The three-column board.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    /// Columns in display order
    pub columns: Vec<Column>,
}

impl Board {
    /// Filter, sort and split `tasks` into columns.
    pub fn build(tasks: &[Task], query: &BoardQuery) -> Self {
        let mut visible: Vec<Task> = tasks.iter().filter(|t| query.matches(t)).cloned().collect();
        query.sort_by.sort(&mut visible);

        let columns = ColumnId::ALL
            .into_iter()
            .map(|id| Column {
                id,
                title: id.title(),
                tasks: visible
                    .iter()
                    .filter(|t| t.status == id.status())
                    .cloned()
                    .collect(),
            })
            .collect();

        Self { columns }
    }

    /// Column by id.
    pub fn column(&self, id: ColumnId) -> &Column {
        // columns are always built from ColumnId::ALL, in order
        &self.columns[id as usize]
    }

    /// Number of visible tasks.
    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Whether no task is visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
