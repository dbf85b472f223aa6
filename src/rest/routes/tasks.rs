// rest/routes/tasks.rs: task CRUD routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::TaskError;
use crate::AppContext;

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match ctx.store.list_tasks().await {
        Ok(tasks) => Ok(Json(json!(tasks))),
        Err(e) => Err(e.into_http(ctx.config.debug_errors)),
    }
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub description: Option<String>,
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    // A missing field deserializes to None and fails validation below, the
    // same as an empty description. A body that is not JSON at all is
    // rejected here so the client still gets the structured error shape.
    let description = match body {
        Ok(Json(req)) => req.description.unwrap_or_default(),
        Err(rejection) => {
            return Err(
                TaskError::Validation(format!("invalid request body: {}", rejection.body_text()))
                    .into_http(ctx.config.debug_errors),
            )
        }
    };

    match ctx.store.create_task(&description).await {
        Ok(task) => Ok((StatusCode::CREATED, Json(json!(task)))),
        Err(e) => Err(e.into_http(ctx.config.debug_errors)),
    }
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    match ctx.store.delete_task(&id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(TaskError::NotFound(id).into_http(ctx.config.debug_errors)),
        Err(e) => Err(e.into_http(ctx.config.debug_errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::memory::MemoryTaskStore;
    use crate::storage::DisconnectedStore;

    /// Handlers run against the in-memory store, no HTTP involved.
    fn memory_ctx() -> Arc<AppContext> {
        Arc::new(AppContext {
            config: Arc::new(test_config(false)),
            store: Arc::new(MemoryTaskStore::new()),
            started_at: std::time::Instant::now(),
        })
    }

    fn test_config(debug_errors: bool) -> Config {
        Config {
            port: 0,
            bind_address: "127.0.0.1".to_string(),
            db_url: None,
            log: "error".to_string(),
            log_format: "pretty".to_string(),
            debug_errors,
            observability: Default::default(),
        }
    }

    fn request(description: Option<&str>) -> Result<Json<CreateTaskRequest>, JsonRejection> {
        Ok(Json(CreateTaskRequest {
            description: description.map(str::to_string),
        }))
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let ctx = memory_ctx();

        let (status, Json(created)) = create_task(State(ctx.clone()), request(Some("buy milk")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["description"], "buy milk");
        assert!(created["id"].is_string());
        assert!(created["createdAt"].is_string());

        let Json(listed) = list_tasks(State(ctx)).await.unwrap();
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn create_trims_before_storing() {
        let ctx = memory_ctx();
        let (_, Json(created)) = create_task(State(ctx), request(Some("  buy milk  ")))
            .await
            .unwrap();
        assert_eq!(created["description"], "buy milk");
    }

    #[tokio::test]
    async fn create_rejects_missing_and_blank_descriptions() {
        let ctx = memory_ctx();

        for body in [request(None), request(Some("")), request(Some("   "))] {
            let (status, Json(err)) = create_task(State(ctx.clone()), body).await.unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(err["error"], "validation_error");
        }

        // Nothing was persisted by the rejected requests.
        let Json(listed) = list_tasks(State(ctx)).await.unwrap();
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_existing_returns_no_content() {
        let ctx = memory_ctx();
        let (_, Json(created)) = create_task(State(ctx.clone()), request(Some("buy milk")))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let status = delete_task(State(ctx.clone()), Path(id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(listed) = list_tasks(State(ctx)).await.unwrap();
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_id_maps_to_not_found() {
        let ctx = memory_ctx();
        let (status, Json(err)) = delete_task(State(ctx), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["error"], "not_found");
    }

    #[tokio::test]
    async fn store_failures_stay_generic_without_debug_errors() {
        let ctx = Arc::new(AppContext {
            config: Arc::new(test_config(false)),
            store: Arc::new(DisconnectedStore),
            started_at: std::time::Instant::now(),
        });

        let (status, Json(err)) = list_tasks(State(ctx)).await.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err["error"], "store_error");
        assert_eq!(err["message"], "internal server error");
    }

    #[tokio::test]
    async fn store_failures_carry_detail_with_debug_errors() {
        let ctx = Arc::new(AppContext {
            config: Arc::new(test_config(true)),
            store: Arc::new(DisconnectedStore),
            started_at: std::time::Instant::now(),
        });

        let (_, Json(err)) = list_tasks(State(ctx)).await.unwrap_err();
        assert_eq!(err["message"], "store is not connected");
    }
}
