#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use research_chat_backend::agent::{
    AgentDefinition, AgentError, AgentInputItem, AgentRunner, RunResult, TraceMetadata,
};
use research_chat_backend::config::Config;
use research_chat_backend::routes::create_routes;
use research_chat_backend::state::AppState;

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    NoOutput,
    Fail(String),
}

/// Agent runner double that records every call
pub struct StubRunner {
    reply: Reply,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<Vec<AgentInputItem>>>,
    pub traces: Mutex<Vec<TraceMetadata>>,
}

impl StubRunner {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay: None,
            calls: Mutex::new(Vec::new()),
            traces: Mutex::new(Vec::new()),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn slow(text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(text.to_string()),
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
            traces: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_input(&self) -> Vec<AgentInputItem> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AgentRunner for StubRunner {
    async fn run(
        &self,
        _agent: &AgentDefinition,
        input: Vec<AgentInputItem>,
        trace: &TraceMetadata,
    ) -> Result<RunResult, AgentError> {
        self.calls.lock().unwrap().push(input);
        self.traces.lock().unwrap().push(trace.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Text(text) => Ok(RunResult {
                final_output: Some(text.clone()),
            }),
            Reply::NoOutput => Ok(RunResult { final_output: None }),
            Reply::Fail(message) => Err(AgentError::api_error(503, message.clone())),
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.api_key = "sk-test".to_string();
    config.trace.workflow_id = "wf_test".to_string();
    config.system_config.static_dir = "does-not-exist".to_string();
    config
}

pub fn app_with(config: Config, runner: Arc<StubRunner>) -> Router {
    create_routes(AppState::with_runner(config, runner))
}

pub fn app(runner: Arc<StubRunner>) -> Router {
    app_with(test_config(), runner)
}
