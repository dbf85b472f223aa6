use crate::AppContext;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// Always answers 200; the body says whether the store is reachable.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    let store_ok = ctx.store.ping().await.is_ok();
    Json(json!({
        "status": if store_ok { "ok" } else { "degraded" },
        "store": if store_ok { "connected" } else { "disconnected" },
        "uptime_secs": uptime,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
