// rest/mod.rs: HTTP API server.
//
// Axum router over the task store.
//
// Endpoints:
//   GET    /tasks
//   POST   /tasks
//   DELETE /tasks/{id}
//   GET    /health

pub mod routes;

use anyhow::Result;
use axum::{
    http::{StatusCode, Uri},
    routing::{delete, get},
    Json, Router,
};
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::TaskError;
use crate::AppContext;

/// Bind the listener and serve until `shutdown` resolves. In-flight requests
/// drain before this returns.
pub async fn start_rest_server(
    ctx: Arc<AppContext>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/{id}", delete(routes::tasks::delete_task))
        .route("/health", get(routes::health::health))
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Unmatched paths get the structured error body instead of axum's bare 404.
async fn route_not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    TaskError::RouteNotFound(uri.path().to_string()).into_http(false)
}
