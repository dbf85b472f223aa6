pub mod memory;

pub use memory::MemoryTaskStore;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::TaskError;

/// A single to-do item, as persisted and as serialized on the wire.
///
/// Column names are snake_case in SQLite; the wire shape is camelCase.
#[derive(Debug, Clone, PartialEq, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub description: String,
    pub created_at: String,
}

/// Persistence operations behind the task endpoints.
///
/// Object-safe so the router runs against SQLite in production and the
/// in-memory store in handler tests.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks, newest first.
    async fn list_tasks(&self) -> Result<Vec<Task>, TaskError>;

    /// Validate and persist a new task, returning the stored record.
    /// The description is trimmed before the empty check and before storage.
    async fn create_task(&self, description: &str) -> Result<Task, TaskError>;

    /// Delete by id. `Ok(false)` means no such task existed.
    async fn delete_task(&self, id: &str) -> Result<bool, TaskError>;

    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), TaskError>;

    /// Release the underlying connection. Called once on shutdown.
    async fn close(&self);
}

/// Trim a raw description and reject it if nothing remains.
pub fn normalize_description(raw: &str) -> Result<String, TaskError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

// ─── SQLite store ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Connect to `db_url` (e.g. `sqlite://tasks.db?mode=rwc`) and run
    /// migrations.
    pub async fn connect(db_url: &str) -> Result<Self, TaskError> {
        Self::connect_with_slow_query(db_url, 0).await
    }

    /// Connect with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds; queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn connect_with_slow_query(
        db_url: &str,
        slow_query_ms: u64,
    ) -> Result<Self, TaskError> {
        let mut opts = SqliteConnectOptions::from_str(db_url)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        sqlx::migrate!("src/storage/migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, TaskError> {
        // id breaks ties between tasks created within the same timestamp.
        Ok(sqlx::query_as(
            "SELECT id, description, created_at FROM tasks ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_task(&self, description: &str) -> Result<Task, TaskError> {
        let description = normalize_description(description)?;
        let task = Task {
            id: Uuid::new_v4().to_string(),
            description,
            created_at: Utc::now().to_rfc3339(),
        };
        // Single round-trip: the returned record is the one whose values were
        // bound into the INSERT.
        sqlx::query("INSERT INTO tasks (id, description, created_at) VALUES (?, ?, ?)")
            .bind(&task.id)
            .bind(&task.description)
            .bind(&task.created_at)
            .execute(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> Result<bool, TaskError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), TaskError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

// ─── Disconnected store ───────────────────────────────────────────────────────

/// Stand-in store installed when no database URL is configured or the startup
/// connect failed. Every operation reports the store as unavailable; the
/// process keeps serving so /health can surface the state.
pub struct DisconnectedStore;

#[async_trait]
impl TaskStore for DisconnectedStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, TaskError> {
        Err(TaskError::StoreUnavailable)
    }

    async fn create_task(&self, description: &str) -> Result<Task, TaskError> {
        // A bad payload is still the caller's error, connected or not.
        normalize_description(description)?;
        Err(TaskError::StoreUnavailable)
    }

    async fn delete_task(&self, _id: &str) -> Result<bool, TaskError> {
        Err(TaskError::StoreUnavailable)
    }

    async fn ping(&self) -> Result<(), TaskError> {
        Err(TaskError::StoreUnavailable)
    }

    async fn close(&self) {}
}
