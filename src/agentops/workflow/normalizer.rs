// SPDX-License-Identifier: MIT

//! Task normalization - converts a raw task collection into ordered descriptors

use serde::Deserialize;
use serde_json::Value;

use super::types::TaskDescriptor;
use crate::adk::error::WorkflowError;
use crate::agentops::models::RawTasks;

/// A task entry as clients write it, with both accepted spellings
#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    step: Option<Scalar>,
    #[serde(default)]
    agent_id: Option<Value>,
    #[serde(default, rename = "agentId")]
    agent_id_alias: Option<Value>,
    #[serde(default)]
    instruction: Option<Value>,
    #[serde(default)]
    prompt: Option<Value>,
}

/// Numbers arrive as integers, floats or numeric strings depending on the client
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Null, false, zero and empty values count as "not given"
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Instructions are free text; other JSON values are rendered as text
fn render_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Any reference that is not integral leaves the task unresolved
fn agent_ref(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Scalar {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Scalar::Float(_) => None,
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Decode the raw collection and return descriptors sorted by `step`
///
/// The sort is stable: tasks sharing a step keep their submitted order.
pub fn normalize_tasks(raw: &RawTasks) -> Result<Vec<TaskDescriptor>, WorkflowError> {
    let decoded;
    let items: &[Value] = match raw {
        RawTasks::List(items) => items,
        RawTasks::Encoded(text) => {
            decoded = serde_json::from_str::<Vec<Value>>(text)
                .map_err(WorkflowError::MalformedTasks)?;
            &decoded
        }
    };

    let mut tasks = items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_task(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    tasks.sort_by_key(|t| t.step);
    Ok(tasks)
}

fn normalize_task(index: usize, item: &Value) -> Result<TaskDescriptor, WorkflowError> {
    if !item.is_object() {
        return Err(WorkflowError::InvalidTask {
            index,
            reason: format!("expected an object, found {}", item),
        });
    }

    let raw = RawTask::deserialize(item).map_err(|e| WorkflowError::InvalidTask {
        index,
        reason: e.to_string(),
    })?;

    let step = match &raw.step {
        None => 0,
        Some(value) => value.as_i64().ok_or_else(|| WorkflowError::InvalidTask {
            index,
            reason: format!("step {:?} is not an integer", value),
        })?,
    };

    let agent_id = raw
        .agent_id
        .as_ref()
        .filter(|v| !is_blank(v))
        .or(raw.agent_id_alias.as_ref())
        .and_then(agent_ref);

    let instruction = raw
        .instruction
        .filter(|v| !is_blank(v))
        .or(raw.prompt.filter(|v| !is_blank(v)))
        .map(render_text)
        .unwrap_or_default();

    Ok(TaskDescriptor {
        step,
        agent_id,
        instruction,
    })
}
