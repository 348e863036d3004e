// SPDX-License-Identifier: MIT

//! HTTP API over the record store and the workflow compiler

mod agents;
mod chat;
pub mod error;
mod workflows;

use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adk::error::AgentOpsError;
use crate::agentops::config::Settings;
use crate::agentops::store::RecordStore;
use crate::agentops::workflow::WorkflowBuilder;

pub use error::ApiError;

/// Shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub builder: WorkflowBuilder,
}

impl AppState {
    pub fn new(store: RecordStore, builder: WorkflowBuilder) -> Self {
        Self { store, builder }
    }
}

/// Routes without transport layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/v1/chat", post(chat::chat))
        .route(
            "/api/v1/agents",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route(
            "/api/v1/agents/",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route(
            "/api/v1/agents/{id}",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route(
            "/api/v1/workflows",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route(
            "/api/v1/workflows/",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route(
            "/api/v1/workflows/{id}",
            get(workflows::get_workflow).delete(workflows::delete_workflow),
        )
        .route("/api/v1/workflows/{id}/run", post(workflows::run_workflow))
        .route(
            "/api/v1/workflows/{id}/run/stream",
            post(workflows::stream_workflow),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub async fn serve(settings: &Settings, state: AppState) -> Result<(), AgentOpsError> {
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.allowed_origins));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "AgentOps AI Backend is running" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
