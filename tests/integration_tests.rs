//! Integration tests for workflow compilation, execution and the HTTP API
//!
//! These tests drive the public API end to end using mock components.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::ServiceExt;

use agentops_rs::adk::error::{BoxError, ModelError, WorkflowError};
use agentops_rs::adk::model::{ChatMessage, ChatRole, GenerationConfig, Model};
use agentops_rs::agentops::loader::CatalogLoader;
use agentops_rs::agentops::models::{Agent, AgentDraft, RawTasks, Workflow, WorkflowDraft};
use agentops_rs::agentops::server::{router, AppState};
use agentops_rs::agentops::store::RecordStore;
use agentops_rs::agentops::workflow::graph::END;
use agentops_rs::agentops::workflow::{
    normalize_tasks, AgentTable, ExecutionState, ModelWorker, PlaceholderWorker, RunEvent,
    StepContext, StepWorker, WorkflowBuilder,
};

// ============================================================================
// Mock Components
// ============================================================================

/// Counts invocations and answers with the instruction
#[derive(Default)]
struct CountingWorker {
    calls: AtomicUsize,
}

#[async_trait]
impl StepWorker for CountingWorker {
    fn name(&self) -> &str {
        "counting"
    }

    async fn perform(&self, ctx: StepContext<'_>) -> Result<String, BoxError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("#{} {}: {}", n, ctx.agent.name, ctx.instruction))
    }
}

/// Fails whenever the instruction mentions "explode"
struct FlakyWorker;

#[async_trait]
impl StepWorker for FlakyWorker {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn perform(&self, ctx: StepContext<'_>) -> Result<String, BoxError> {
        if ctx.instruction.contains("explode") {
            return Err(format!("{} exploded", ctx.agent.name).into());
        }
        Ok(ctx.instruction.to_uppercase())
    }
}

/// Model that records every request and replies with a fixed text
#[derive(Default)]
struct RecordingModel {
    requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

#[async_trait]
impl Model for RecordingModel {
    async fn generate(
        &self,
        model_name: &str,
        messages: &[ChatMessage],
        _config: Option<&GenerationConfig>,
    ) -> Result<String, ModelError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push((model_name.to_string(), messages.to_vec()));
        Ok(format!("reply {}", requests.len()))
    }
}

static CATALOG: Lazy<String> = Lazy::new(|| {
    r#"
agents:
  - id: 1
    name: Assistant
    system_prompt: "You are a helpful assistant."
  - id: 2
    name: Research Agent
    model: gpt-4o-mini
    system_prompt: "Research thoroughly."
workflows:
  - id: 1
    name: Greeting
    tasks:
      - { step: 1, agent_id: 1, instruction: "Say hello" }
      - { step: 2, agent_id: 1, instruction: "Say goodbye" }
  - id: 2
    name: Research
    tasks: '[{"step": 2, "agentId": 1, "prompt": "Summarize"}, {"step": 1, "agent_id": 2, "instruction": "Find sources"}]'
  - id: 3
    name: Orphaned
    tasks:
      - { step: 1, agent_id: 42, instruction: "Nobody home" }
"#
    .to_string()
});

fn agent(id: i64, name: &str) -> Agent {
    Agent::from_draft(
        id,
        AgentDraft {
            name: name.to_string(),
            description: None,
            model: "gpt-4o".to_string(),
            system_prompt: format!("You are {}.", name),
        },
    )
}

fn workflow(tasks: Value) -> Workflow {
    let tasks = match tasks {
        Value::Array(items) => RawTasks::List(items),
        Value::String(encoded) => RawTasks::Encoded(encoded),
        other => panic!("Unexpected tasks value {}", other),
    };
    Workflow::from_draft(
        1,
        WorkflowDraft {
            name: "Test Workflow".to_string(),
            description: None,
            status: Default::default(),
            tasks,
        },
    )
}

fn placeholder_builder() -> WorkflowBuilder {
    WorkflowBuilder::new(Arc::new(PlaceholderWorker))
}

async fn seeded_store() -> RecordStore {
    let store = RecordStore::new();
    CatalogLoader::parse_yaml(&CATALOG)
        .unwrap()
        .seed(&store)
        .await;
    store
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

// ============================================================================
// Compilation Scenarios
// ============================================================================

#[tokio::test]
async fn test_same_agent_twice_overwrites_result() {
    let wf = workflow(json!([
        {"step": 1, "agent_id": 1, "instruction": "Say hello"},
        {"step": 2, "agent_id": 1, "instruction": "Say goodbye"}
    ]));
    let agents: AgentTable = vec![agent(1, "Assistant")].into_iter().collect();

    let outcome = placeholder_builder()
        .run(&wf, &agents, ExecutionState::default())
        .await
        .unwrap();

    assert_eq!(outcome.messages.len(), 2);
    assert!(outcome
        .messages
        .iter()
        .all(|m| m.name.as_deref() == Some("Assistant") && m.role == "assistant"));
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(
        outcome.results["Assistant"],
        "Processed 'Say goodbye' by Assistant"
    );
}

#[test]
fn test_missing_agent_task_dropped_after_sorting() {
    let wf = workflow(json!([
        {"step": 2, "agent_id": 99, "instruction": "X"},
        {"step": 1, "agent_id": 1, "instruction": "Y"}
    ]));
    let agents: AgentTable = vec![agent(1, "Assistant")].into_iter().collect();

    let chain = placeholder_builder().compile(&wf, &agents).unwrap();

    assert_eq!(chain.len(), 1);
    assert_eq!(chain.entry(), "step_1_Assistant");
    assert_eq!(chain.nodes()[0].instruction(), "Y");
    assert_eq!(chain.nodes()[0].agent().id, 1);
}

#[test]
fn test_encoded_list_normalizes_like_native_list() {
    let encoded = RawTasks::Encoded(r#"[{"step":1,"agent_id":1,"instruction":"Hi"}]"#.to_string());
    let native = RawTasks::List(vec![json!({"step": 1, "agent_id": 1, "instruction": "Hi"})]);

    assert_eq!(
        normalize_tasks(&encoded).unwrap(),
        normalize_tasks(&native).unwrap()
    );
}

#[tokio::test]
async fn test_empty_task_list_never_reaches_the_worker() {
    let worker = Arc::new(CountingWorker::default());
    let builder = WorkflowBuilder::new(worker.clone());
    let agents: AgentTable = vec![agent(1, "Assistant")].into_iter().collect();

    let result = builder
        .run(&workflow(json!([])), &agents, ExecutionState::default())
        .await;

    assert!(matches!(result, Err(WorkflowError::EmptyChain(_))));
    assert_eq!(worker.calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_normalized_order_is_stable() {
    let raw = RawTasks::List(vec![
        json!({"step": 3, "agent_id": 1, "instruction": "c"}),
        json!({"step": 1, "agent_id": 1, "instruction": "a1"}),
        json!({"step": 2, "agent_id": 1, "instruction": "b"}),
        json!({"step": 1, "agent_id": 1, "instruction": "a2"}),
        json!({"agent_id": 1, "instruction": "zero"}),
        json!({"step": 1, "agent_id": 1, "instruction": "a3"}),
    ]);

    let tasks = normalize_tasks(&raw).unwrap();
    let order: Vec<&str> = tasks.iter().map(|t| t.instruction.as_str()).collect();
    assert_eq!(order, vec!["zero", "a1", "a2", "a3", "b", "c"]);
    assert!(tasks.windows(2).all(|w| w[0].step <= w[1].step));
}

#[test]
fn test_chain_stays_connected_over_resolved_tasks() {
    let wf = workflow(json!([
        {"step": 1, "agent_id": 1, "instruction": "a"},
        {"step": 2, "agent_id": 7, "instruction": "gone"},
        {"step": 3, "agentId": 2, "instruction": "b"},
        {"step": 4, "agent_id": "nope", "instruction": "bad ref"},
        {"step": 5, "agent_id": 3, "instruction": "c"}
    ]));
    let agents: AgentTable = vec![agent(1, "A"), agent(2, "Agent B"), agent(3, "C")]
        .into_iter()
        .collect();

    let chain = placeholder_builder().compile(&wf, &agents).unwrap();

    assert_eq!(chain.node_ids(), vec!["step_1_A", "step_3_Agent_B", "step_5_C"]);
    let edges = chain.edges();
    assert_eq!(edges.len(), 3);
    for pair in edges.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    assert_eq!(edges[0].from, chain.entry());
    assert_eq!(edges[2].to, END);
}

#[tokio::test]
async fn test_results_and_messages_track_resolvable_tasks() {
    let wf = workflow(json!([
        {"step": 1, "agent_id": 1, "instruction": "first"},
        {"step": 2, "agent_id": 2, "instruction": "second"},
        {"step": 3, "agent_id": 9, "instruction": "missing"},
        {"step": 4, "agent_id": 1, "instruction": "third"}
    ]));
    let agents: AgentTable = vec![agent(1, "Writer"), agent(2, "Editor")]
        .into_iter()
        .collect();
    let worker = Arc::new(CountingWorker::default());

    let outcome = WorkflowBuilder::new(worker.clone())
        .run(&wf, &agents, ExecutionState::default())
        .await
        .unwrap();

    assert_eq!(worker.calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.messages.len(), 3);
    let contents: Vec<&str> = outcome.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["#1 Writer: first", "#2 Editor: second", "#3 Writer: third"]
    );
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results["Writer"], "#3 Writer: third");
    assert_eq!(outcome.results["Editor"], "#2 Editor: second");
}

#[tokio::test]
async fn test_step_failure_aborts_run() {
    let wf = workflow(json!([
        {"step": 1, "agent_id": 1, "instruction": "fine"},
        {"step": 2, "agent_id": 2, "instruction": "explode now"},
        {"step": 3, "agent_id": 1, "instruction": "never"}
    ]));
    let agents: AgentTable = vec![agent(1, "Calm"), agent(2, "Volatile")]
        .into_iter()
        .collect();

    let err = WorkflowBuilder::new(Arc::new(FlakyWorker))
        .run(&wf, &agents, ExecutionState::default())
        .await
        .unwrap_err();

    match &err {
        WorkflowError::StepFailed { node_id, .. } => assert_eq!(node_id, "step_2_Volatile"),
        other => panic!("Expected StepFailed, got {:?}", other),
    }
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_stream_emits_events_in_order() {
    let wf = workflow(json!([
        {"step": 1, "agent_id": 1, "instruction": "a"},
        {"step": 2, "agent_id": 2, "instruction": "b"}
    ]));
    let agents: AgentTable = vec![agent(1, "One"), agent(2, "Two")].into_iter().collect();
    let (tx, mut rx) = mpsc::channel(16);

    let chain = placeholder_builder().compile(&wf, &agents).unwrap();
    let state = chain
        .invoke_stream(ExecutionState::default(), tx)
        .await
        .unwrap();
    assert_eq!(state.messages.len(), 2);

    let mut kinds = Vec::new();
    while let Some(event) = rx.recv().await {
        kinds.push(match event {
            RunEvent::StepStarted { node_id, .. } => format!("start {}", node_id),
            RunEvent::StepCompleted { node_id, .. } => format!("done {}", node_id),
            RunEvent::Finished { state } => format!("finished {}", state.current_agent),
            RunEvent::Failed { error, .. } => format!("failed {}", error),
        });
    }
    assert_eq!(
        kinds,
        vec![
            "start step_1_One",
            "done step_1_One",
            "start step_2_Two",
            "done step_2_Two",
            "finished Two",
        ]
    );
}

// ============================================================================
// Model Worker
// ============================================================================

#[tokio::test]
async fn test_model_worker_threads_prior_outputs() {
    let model = Arc::new(RecordingModel::default());
    let builder = WorkflowBuilder::new(Arc::new(ModelWorker::new(model.clone(), None)));
    let store = seeded_store().await;
    let research = store.get_workflow(2).await.unwrap();

    let outcome = builder
        .run(&research, &store.agent_table().await, ExecutionState::default())
        .await
        .unwrap();

    assert_eq!(outcome.results["Research Agent"], "reply 1");
    assert_eq!(outcome.results["Assistant"], "reply 2");

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);

    let (model_name, first) = &requests[0];
    assert_eq!(model_name, "gpt-4o-mini");
    assert_eq!(first[0], ChatMessage::system("Research thoroughly."));
    assert_eq!(first.last().unwrap(), &ChatMessage::user("Find sources"));

    let (model_name, second) = &requests[1];
    assert_eq!(model_name, "gpt-4o");
    assert!(second
        .iter()
        .any(|m| m.role == ChatRole::Assistant && m.content.contains("reply 1")));
    assert_eq!(second.last().unwrap(), &ChatMessage::user("Summarize"));
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_workflows_compile_or_fail_cleanly() {
    let store = seeded_store().await;
    let agents = store.agent_table().await;
    let builder = placeholder_builder();

    let greeting = builder
        .compile(&store.get_workflow(1).await.unwrap(), &agents)
        .unwrap();
    assert_eq!(
        greeting.node_ids(),
        vec!["step_1_Assistant", "step_2_Assistant"]
    );

    let research = builder
        .compile(&store.get_workflow(2).await.unwrap(), &agents)
        .unwrap();
    assert_eq!(
        research.node_ids(),
        vec!["step_1_Research_Agent", "step_2_Assistant"]
    );

    let orphaned = builder.compile(&store.get_workflow(3).await.unwrap(), &agents);
    assert!(matches!(orphaned, Err(WorkflowError::EmptyChain(_))));
}

#[tokio::test]
async fn test_deleted_agent_becomes_unresolved() {
    let store = seeded_store().await;
    assert!(store.delete_agent(2).await);

    let chain = placeholder_builder()
        .compile(
            &store.get_workflow(2).await.unwrap(),
            &store.agent_table().await,
        )
        .unwrap();
    assert_eq!(chain.node_ids(), vec!["step_2_Assistant"]);
}

// ============================================================================
// HTTP API
// ============================================================================

async fn app() -> Router {
    router(AppState::new(seeded_store().await, placeholder_builder()))
}

#[tokio::test]
async fn test_http_run_workflow() {
    let (status, body) = send(app().await, "POST", "/api/v1/workflows/1/run", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["results"]["Assistant"],
        "Processed 'Say goodbye' by Assistant"
    );
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    assert_eq!(body["messages"][0]["name"], "Assistant");
}

#[tokio::test]
async fn test_http_run_errors() {
    let (status, body) = send(app().await, "POST", "/api/v1/workflows/3/run", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to build graph:"));

    let (status, body) = send(app().await, "POST", "/api/v1/workflows/404/run", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Workflow not found");

    let flaky = router(AppState::new(
        seeded_store().await,
        WorkflowBuilder::new(Arc::new(FlakyWorker)),
    ));
    let app = flaky.clone();
    let (_, created) = send(
        app,
        "POST",
        "/api/v1/workflows/",
        Some(json!({
            "name": "Doomed",
            "tasks": [{"step": 1, "agent_id": 1, "instruction": "explode"}]
        })),
    )
    .await;
    let uri = format!("/api/v1/workflows/{}/run", created["id"]);
    let (status, body) = send(flaky, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Workflow execution failed:"));
}

#[tokio::test]
async fn test_http_malformed_encoded_tasks_is_bad_request() {
    let app = app().await;
    let (status, created) = send(
        app.clone(),
        "POST",
        "/api/v1/workflows",
        Some(json!({"name": "Broken", "tasks": "[{not json"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["tasks"], "[{not json");

    let uri = format!("/api/v1/workflows/{}/run", created["id"]);
    let (status, _) = send(app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_http_agent_crud() {
    let app = app().await;

    let (status, created) = send(
        app.clone(),
        "POST",
        "/api/v1/agents/",
        Some(json!({"name": "Critic", "system_prompt": "Be harsh."})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], 3);
    assert_eq!(created["model"], "gpt-4o");

    let (status, updated) = send(
        app.clone(),
        "PUT",
        "/api/v1/agents/3",
        Some(json!({"description": "Reviews drafts"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Critic");
    assert_eq!(updated["description"], "Reviews drafts");

    let (_, list) = send(app.clone(), "GET", "/api/v1/agents", None).await;
    assert_eq!(list.as_array().unwrap().len(), 3);

    let (status, body) = send(app.clone(), "DELETE", "/api/v1/agents/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = send(app, "GET", "/api/v1/agents/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Agent not found");
}

#[tokio::test]
async fn test_http_workflow_crud() {
    let app = app().await;

    let (_, fetched) = send(app.clone(), "GET", "/api/v1/workflows/2", None).await;
    assert_eq!(fetched["name"], "Research");
    assert_eq!(fetched["status"], "draft");

    let (status, body) = send(app.clone(), "DELETE", "/api/v1/workflows/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, _) = send(app, "DELETE", "/api/v1/workflows/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_http_chat() {
    let (status, body) = send(
        app().await,
        "POST",
        "/api/v1/chat",
        Some(json!({"messages": [
            {"role": "system", "content": "ignored role"},
            {"role": "user", "content": "Hello there"}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"role": "assistant", "content": "Echo: Hello there"}));

    let (status, body) = send(
        app().await,
        "POST",
        "/api/v1/chat",
        Some(json!({"messages": [{"content": "no role"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid message format");
}

#[tokio::test]
async fn test_http_stream_run() {
    let (status, body) = send(app().await, "POST", "/api/v1/workflows/1/run/stream", None).await;
    assert_eq!(status, StatusCode::OK);

    let text = body.as_str().unwrap();
    assert!(text.contains("\"event\":\"step_started\""));
    assert!(text.contains("step_2_Assistant"));
    assert!(text.contains("\"event\":\"finished\""));
}

#[tokio::test]
async fn test_http_stream_rejects_uncompilable_workflow() {
    let (status, body) = send(app().await, "POST", "/api/v1/workflows/3/run/stream", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Failed to build graph: Workflow 'Orphaned' has no resolvable tasks"
    );

    let (status, _) = send(app().await, "POST", "/api/v1/workflows/404/run/stream", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
