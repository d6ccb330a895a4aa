//! Task management service.

use std::sync::Arc;
use async_trait::async_trait;
use chrono::Duration;
use taskboard_core::{CoreError, Task, TaskFilter, TaskId, TaskStatus, Time};
use taskboard_stats::{Clock, StatsAggregator, StatsSnapshot, SystemClock};
use taskboard_storage::{Storage, StorageError};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::drag::DragResult;
use crate::view::{Board, BoardQuery};

/// Result alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors returned by the task service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No task with this id
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The resulting task would be invalid
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Attempt to change a field that is fixed
    #[error("{field} cannot be changed: {reason}")]
    Immutable {
        /// Field name
        field: &'static str,
        /// Why it is fixed
        reason: &'static str,
    },

    /// Storage backend failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Defaults applied to new tasks.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Title used when none is given
    pub default_title: String,
    /// Priority used when none is given
    pub default_priority: u8,
    /// Estimated duration when no end time is given
    pub default_duration: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_title: "New Task".to_string(),
            default_priority: 3,
            default_duration: Duration::hours(24),
        }
    }
}

impl ServiceConfig {
    /// Set the default title.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Set the default priority.
    pub fn with_default_priority(mut self, priority: u8) -> Self {
        self.default_priority = priority;
        self
    }

    /// Set the default estimated duration.
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }
}

/// Fields for a new task; anything left out takes the configured default.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: Option<String>,
    pub priority: Option<u8>,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub status: Option<TaskStatus>,
}

/// Partial edit of an existing task.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub priority: Option<u8>,
    /// Accepted only when equal to the current start time
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub status: Option<TaskStatus>,
}

/// Task management service.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Create a task.
    async fn create_task(&self, new_task: NewTask) -> Result<Task>;

    /// Fetch one task.
    async fn get_task(&self, id: TaskId) -> Result<Task>;

    /// List tasks matching `filter`.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Apply a partial edit. `updatedAt` moves only when a field actually
    /// changes.
    ///
    /// The task is loaded and saved in two steps, so concurrent edits of the
    /// same task are last-writer-wins.
    async fn update_task(&self, id: TaskId, update: TaskUpdate) -> Result<Task>;

    /// Change a task's status.
    async fn move_task(&self, id: TaskId, status: TaskStatus) -> Result<Task>;

    /// Apply a drag gesture made on the board built from `query`.
    async fn drop_task(&self, drag: &DragResult, query: &BoardQuery) -> Result<Option<Task>>;

    /// Delete a task.
    async fn delete_task(&self, id: TaskId) -> Result<()>;

    /// Board view over all tasks.
    async fn board(&self, query: &BoardQuery) -> Result<Board>;

    /// Statistics over all tasks, relative to the service clock.
    async fn stats(&self) -> Result<StatsSnapshot>;
}

/// Storage-backed task service.
pub struct BasicTaskService<S: Storage> {
    storage: Arc<Mutex<S>>,
    config: ServiceConfig,
    clock: Arc<dyn Clock>,
    aggregator: StatsAggregator,
}

impl<S: Storage> BasicTaskService<S> {
    /// Create a service over `storage` with default settings.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            config: ServiceConfig::default(),
            clock: Arc::new(SystemClock),
            aggregator: StatsAggregator::new(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the clock used for timestamps and statistics.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.aggregator = self.aggregator.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    async fn load(&self, id: TaskId) -> Result<Task> {
        self.storage
            .lock()
            .await
            .load_task(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    async fn all_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.storage.lock().await.list_tasks(&TaskFilter::default()).await?)
    }

    async fn persist(&self, task: &Task) -> Result<()> {
        task.validate()?;
        self.storage.lock().await.save_task(task).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: Storage + 'static> TaskService for BasicTaskService<S> {
    async fn create_task(&self, new_task: NewTask) -> Result<Task> {
        let now = self.clock.now();
        let start = new_task.start_time.unwrap_or(now);
        let end = new_task.end_time.unwrap_or(start + self.config.default_duration);
        let title = new_task.title.unwrap_or_else(|| self.config.default_title.clone());
        let priority = new_task.priority.unwrap_or(self.config.default_priority);

        let mut task = Task::new(title, priority, start, end);
        task.created_at = now;
        task.updated_at = now;
        if let Some(status) = new_task.status {
            task.transition_to(status, now);
        }

        self.persist(&task).await?;
        info!(id = %task.id, title = %task.title, "created task");
        Ok(task)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task> {
        self.load(id).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self.storage.lock().await.list_tasks(filter).await?)
    }

    async fn update_task(&self, id: TaskId, update: TaskUpdate) -> Result<Task> {
        let mut task = self.load(id).await?;
        let now = self.clock.now();

        if update.start_time.is_some_and(|start| start != task.start_time) {
            return Err(ServiceError::Immutable {
                field: "startTime",
                reason: "it is fixed when the task is created",
            });
        }

        let stays_done = task.is_done() && update.status.map_or(true, |s| s == TaskStatus::Done);
        if let Some(end) = update.end_time {
            if end != task.end_time {
                if stays_done {
                    return Err(ServiceError::Immutable {
                        field: "endTime",
                        reason: "the task is already Done",
                    });
                }
                task.end_time = end;
                task.updated_at = now;
            }
        }

        if let Some(title) = update.title {
            let title = title.trim();
            if title != task.title {
                task.title = title.to_string();
                task.updated_at = now;
            }
        }
        if let Some(priority) = update.priority {
            if priority != task.priority {
                task.priority = priority;
                task.updated_at = now;
            }
        }
        if let Some(status) = update.status {
            task.transition_to(status, now);
        }

        self.persist(&task).await?;
        info!(id = %task.id, "updated task");
        Ok(task)
    }

    async fn move_task(&self, id: TaskId, status: TaskStatus) -> Result<Task> {
        let mut task = self.load(id).await?;
        let from = task.status;
        if task.transition_to(status, self.clock.now()) {
            self.persist(&task).await?;
            info!(id = %task.id, %from, to = %status, "moved task");
        }
        Ok(task)
    }

    async fn drop_task(&self, drag: &DragResult, query: &BoardQuery) -> Result<Option<Task>> {
        let board = self.board(query).await?;
        let Some(task) = board.resolve_drop(drag, self.clock.now()) else {
            debug!(?drag, "drop ignored");
            return Ok(None);
        };

        self.persist(&task).await?;
        info!(id = %task.id, to = %task.status, "dropped task");
        Ok(Some(task))
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.storage.lock().await.delete_task(id).await.map_err(|e| match e {
            StorageError::NotFound(_) => ServiceError::NotFound(id),
            other => ServiceError::Storage(other),
        })?;
        info!(id = %id, "deleted task");
        Ok(())
    }

    async fn board(&self, query: &BoardQuery) -> Result<Board> {
        let tasks = self.all_tasks().await?;
        Ok(Board::build(&tasks, query))
    }

    async fn stats(&self) -> Result<StatsSnapshot> {
        let tasks = self.all_tasks().await?;
        Ok(self.aggregator.compute_now(&tasks))
    }
}
