//! Taskboard core data models.
//!
//! This crate defines the task record shared by the board, the document
//! store and the statistics engine.

#![warn(missing_docs)]

// Core identities
mod id;

// Tasks and their wire form
mod task;
mod record;

mod error;

// Re-exports
pub use id::*;

pub use task::{
    Task, TaskStatus, TaskFilter,
    TITLE_MIN_LEN, TITLE_MAX_LEN, PRIORITY_MIN, PRIORITY_MAX,
};
pub use record::{TaskRecord, normalize_all, parse_timestamp, format_timestamp};
pub use error::{CoreError, Result};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
