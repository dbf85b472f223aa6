use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{normalize_description, Task, TaskStore};
use crate::error::TaskError;

/// In-memory task store, used by handler tests that want no disk.
///
/// New tasks are pushed to the front so listing matches the SQLite ordering
/// (newest first) without a sort.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.read().await.clone())
    }

    async fn create_task(&self, description: &str) -> Result<Task, TaskError> {
        let description = normalize_description(description)?;
        let task = Task {
            id: Uuid::new_v4().to_string(),
            description,
            created_at: Utc::now().to_rfc3339(),
        };
        self.tasks.write().await.insert(0, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> Result<bool, TaskError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() < before)
    }

    async fn ping(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn close(&self) {}
}
