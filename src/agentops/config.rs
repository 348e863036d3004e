// SPDX-License-Identifier: MIT

//! Runtime settings read from the environment
//!
//! `.env` is loaded by the binary before `Settings::from_env` runs, so every
//! variable below can live there too.

use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::adk::error::AgentOpsError;
use crate::adk::model::openai::OpenAIModel;
use crate::adk::model::GenerationConfig;
use crate::agentops::workflow::{ModelWorker, PlaceholderWorker, StepWorker};

/// Origins of the local dev frontends
static DEFAULT_ALLOWED_ORIGINS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "http://localhost",
        "http://localhost:5173",
        "http://localhost:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8000",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// Which step worker compiled workflows use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerKind {
    #[default]
    Placeholder,
    Model,
}

impl FromStr for WorkerKind {
    type Err = AgentOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "placeholder" | "stub" => Ok(WorkerKind::Placeholder),
            "model" | "llm" | "openai" => Ok(WorkerKind::Model),
            other => Err(AgentOpsError::config(format!("Unknown worker kind: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub catalog: Option<PathBuf>,
    pub worker: WorkerKind,
    pub allowed_origins: Vec<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            catalog: None,
            worker: WorkerKind::default(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.clone(),
            openai_api_key: None,
            openai_base_url: None,
            temperature: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, AgentOpsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AgentOpsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(host) = lookup("AGENTOPS_HOST") {
            settings.host = host;
        }
        if let Some(port) = lookup("AGENTOPS_PORT") {
            settings.port = port
                .parse()
                .map_err(|_| AgentOpsError::config(format!("Invalid AGENTOPS_PORT: {}", port)))?;
        }
        settings.catalog = lookup("AGENTOPS_CATALOG").map(PathBuf::from);
        if let Some(worker) = lookup("AGENTOPS_WORKER") {
            settings.worker = worker.parse()?;
        }
        if let Some(origins) = lookup("AGENTOPS_ALLOWED_ORIGINS") {
            settings.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        settings.openai_api_key = lookup("OPENAI_API_KEY");
        settings.openai_base_url = lookup("OPENAI_BASE_URL");
        if let Some(temp) = lookup("MODEL_TEMPERATURE") {
            let temp = temp.parse().map_err(|_| {
                AgentOpsError::config(format!("Invalid MODEL_TEMPERATURE: {}", temp))
            })?;
            settings.temperature = Some(temp);
        }

        Ok(settings)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the step worker selected by `worker`
    pub fn step_worker(&self) -> Result<Arc<dyn StepWorker>, AgentOpsError> {
        match self.worker {
            WorkerKind::Placeholder => Ok(Arc::new(PlaceholderWorker)),
            WorkerKind::Model => {
                let model =
                    OpenAIModel::new(self.openai_api_key.clone(), self.openai_base_url.clone())?;
                let config = self.temperature.map(|t| GenerationConfig {
                    temperature: Some(t),
                    ..Default::default()
                });
                Ok(Arc::new(ModelWorker::new(Arc::new(model), config)))
            }
        }
    }
}
