// SPDX-License-Identifier: MIT

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::agentops::models::{Agent, AgentDraft, AgentPatch};

fn not_found() -> ApiError {
    ApiError::NotFound("Agent not found".to_string())
}

pub(super) async fn create_agent(
    State(state): State<AppState>,
    Json(draft): Json<AgentDraft>,
) -> Json<Agent> {
    let agent = state.store.create_agent(draft).await;
    log::info!("Created agent {} ({})", agent.id, agent.name);
    Json(agent)
}

pub(super) async fn list_agents(State(state): State<AppState>) -> Json<Vec<Agent>> {
    Json(state.store.list_agents().await)
}

pub(super) async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Agent>, ApiError> {
    state.store.get_agent(id).await.map(Json).ok_or_else(not_found)
}

pub(super) async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<AgentPatch>,
) -> Result<Json<Agent>, ApiError> {
    state
        .store
        .update_agent(id, patch)
        .await
        .map(Json)
        .ok_or_else(not_found)
}

pub(super) async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.store.delete_agent(id).await {
        return Err(not_found());
    }
    log::info!("Deleted agent {}", id);
    Ok(Json(json!({ "ok": true })))
}
