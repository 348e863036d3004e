// SPDX-License-Identifier: MIT

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use super::error::ApiError;
use super::AppState;
use crate::agentops::models::{Workflow, WorkflowDraft};
use crate::agentops::workflow::{ExecutionState, RunEvent};

async fn find_workflow(state: &AppState, id: i64) -> Result<Workflow, ApiError> {
    state
        .store
        .get_workflow(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Workflow not found".to_string()))
}

pub(super) async fn create_workflow(
    State(state): State<AppState>,
    Json(draft): Json<WorkflowDraft>,
) -> Json<Workflow> {
    let workflow = state.store.create_workflow(draft).await;
    log::info!("Created workflow {} ({})", workflow.id, workflow.name);
    Json(workflow)
}

pub(super) async fn list_workflows(State(state): State<AppState>) -> Json<Vec<Workflow>> {
    Json(state.store.list_workflows().await)
}

pub(super) async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Workflow>, ApiError> {
    find_workflow(&state, id).await.map(Json)
}

pub(super) async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.store.delete_workflow(id).await {
        return Err(ApiError::NotFound("Workflow not found".to_string()));
    }
    log::info!("Deleted workflow {}", id);
    Ok(Json(json!({ "ok": true })))
}

pub(super) async fn run_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let workflow = find_workflow(&state, id).await?;
    let agents = state.store.agent_table().await;

    log::info!("Running workflow {} ({})", workflow.id, workflow.name);
    let outcome = state
        .builder
        .run(&workflow, &agents, ExecutionState::default())
        .await
        .map_err(ApiError::from_workflow)?;

    Ok(Json(json!({
        "status": "success",
        "results": outcome.results,
        "messages": outcome.messages,
    })))
}

pub(super) async fn stream_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let workflow = find_workflow(&state, id).await?;
    let agents = state.store.agent_table().await;
    let chain = state
        .builder
        .compile(&workflow, &agents)
        .map_err(ApiError::from_workflow)?;
    let (tx, rx) = mpsc::channel::<RunEvent>(100);

    tokio::spawn(async move {
        log::info!("Starting streaming run for workflow {}", workflow.id);
        if let Err(e) = chain.invoke_stream(ExecutionState::default(), tx).await {
            log::error!("Streaming run of workflow {} failed: {}", workflow.id, e);
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        Ok(Event::default()
            .json_data(&event)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(1))))
}
