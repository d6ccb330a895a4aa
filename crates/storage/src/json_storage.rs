//! JSON file storage implementation.
//!
//! Stores one pretty-printed JSON document per task under `<root>/tasks/`,
//! named by the task's ULID.

use std::path::{Path, PathBuf};
use taskboard_core::{Task, TaskFilter, TaskId};
use tokio::fs;
use tracing::{debug, warn};
use super::{Storage, StorageError, Result};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the `tasks/` directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("tasks")).await?;
        debug!(root = %root.display(), "opened task store");
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn task_path(&self, id: TaskId) -> PathBuf {
        self.root.join("tasks").join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_task(&mut self, task: &Task) -> Result<()> {
        let path = self.task_path(task.id);
        let json = serde_json::to_string_pretty(task)?;
        fs::write(&path, json.as_bytes()).await?;
        debug!(id = %task.id, "saved task");
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        read_json(&self.task_path(id)).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let all: Vec<Task> = list_dir(&self.root.join("tasks")).await?;
        let mut tasks: Vec<Task> = all.into_iter().filter(|t| filter.matches(t)).collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        match fs::remove_file(self.task_path(id)).await {
            Ok(()) => {
                debug!(id = %id, "deleted task");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable task file"),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use taskboard_core::TaskStatus;

    fn create_test_task(title: &str, offset_h: i64) -> Task {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::hours(offset_h);
        Task::new(title, 3, start, start + Duration::hours(24))
    }

    #[tokio::test]
    async fn test_task_operations() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let task = create_test_task("Write tests", 0);
        storage.save_task(&task).await.unwrap();

        let loaded = storage.load_task(task.id).await.unwrap().unwrap();
        assert_eq!(loaded, task);

        storage.delete_task(task.id).await.unwrap();
        assert!(storage.load_task(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_task() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let err = storage.delete_task(TaskId::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let later = create_test_task("Later task", 5);
        let mut earlier = create_test_task("Earlier task", 0);
        earlier.transition_to(TaskStatus::InProgress, earlier.start_time);
        storage.save_task(&later).await.unwrap();
        storage.save_task(&earlier).await.unwrap();

        let all = storage.list_tasks(&TaskFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![earlier.id, later.id]);

        let filter = TaskFilter {
            status: Some(vec![TaskStatus::ToDo]),
            ..Default::default()
        };
        let todo = storage.list_tasks(&filter).await.unwrap();
        assert_eq!(todo.len(), 1);
        assert_eq!(todo[0].id, later.id);
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        storage.save_task(&create_test_task("Valid task", 0)).await.unwrap();

        std::fs::write(dir.path().join("tasks").join("broken.json"), b"{ nope").unwrap();
        std::fs::write(dir.path().join("tasks").join("notes.txt"), b"hello").unwrap();

        let all = storage.list_tasks(&TaskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
