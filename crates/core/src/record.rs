//! Wire representation of a task and its normalization into [`Task`].
//!
//! Collaborators hand tasks over with timestamps as ISO-8601 strings. All
//! time arithmetic downstream works on [`Time`], so parsing happens here,
//! once, and a bad field rejects the whole record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::id::TaskId;
use crate::task::{Task, TaskStatus};
use crate::Time;

/// Forms accepted besides RFC 3339. Browser `datetime-local` inputs drop
/// the offset (and sometimes the seconds); those are read as UTC. A bare
/// date (`2024-03-01`) is midnight UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// A task as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub priority: u8,
    pub status: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub actual_end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl TaskRecord {
    /// Parse every field into a [`Task`]. The id must be a ULID.
    pub fn normalize(&self) -> Result<Task> {
        let id = self
            .id
            .parse()
            .map_err(|e| CoreError::malformed(&self.id, "id", e))?;
        self.normalize_with_id(id)
    }

    /// Like [`TaskRecord::normalize`], but an id issued elsewhere (a MongoDB
    /// ObjectId, say) is only a label: the task gets a fresh [`TaskId`].
    /// Errors still name the record by its original id.
    pub fn normalize_detached(&self) -> Result<Task> {
        let id = self.id.parse().unwrap_or_else(|_| TaskId::new());
        self.normalize_with_id(id)
    }

    fn normalize_with_id(&self, id: TaskId) -> Result<Task> {
        let status = TaskStatus::from_wire(&self.status).ok_or_else(|| {
            CoreError::malformed(&self.id, "status", format!("unknown status {:?}", self.status))
        })?;
        let start_time = self.timestamp("startTime", &self.start_time)?;
        let end_time = self.timestamp("endTime", &self.end_time)?;
        let actual_end_time = self
            .actual_end_time
            .as_deref()
            .map(|raw| self.timestamp("actualEndTime", raw))
            .transpose()?;
        let created_at = match &self.created_at {
            Some(raw) => self.timestamp("createdAt", raw)?,
            None => start_time,
        };
        let updated_at = match &self.updated_at {
            Some(raw) => self.timestamp("updatedAt", raw)?,
            None => created_at,
        };

        Ok(Task {
            id,
            title: self.title.clone(),
            priority: self.priority,
            status,
            start_time,
            end_time,
            actual_end_time,
            created_at,
            updated_at,
        })
    }

    fn timestamp(&self, field: &'static str, raw: &str) -> Result<Time> {
        parse_timestamp(raw).ok_or_else(|| {
            CoreError::malformed(&self.id, field, format!("cannot parse timestamp {:?}", raw))
        })
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            priority: task.priority,
            status: task.status.as_str().to_string(),
            start_time: format_timestamp(task.start_time),
            end_time: format_timestamp(task.end_time),
            actual_end_time: task.actual_end_time.map(format_timestamp),
            created_at: Some(format_timestamp(task.created_at)),
            updated_at: Some(format_timestamp(task.updated_at)),
        }
    }
}

/// Normalize a batch for read-only use, stopping at the first malformed
/// record. Foreign ids are accepted, see [`TaskRecord::normalize_detached`].
pub fn normalize_all(records: &[TaskRecord]) -> Result<Vec<Task>> {
    records.iter().map(TaskRecord::normalize_detached).collect()
}

/// Parse an ISO-8601 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<Time> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way clients emit them (`2024-03-01T09:00:00.000Z`).
pub fn format_timestamp(time: Time) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
