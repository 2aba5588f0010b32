use std::sync::Arc;

use crate::agent::{AgentRunner, ResponsesRunner};
use crate::config::Config;
use crate::orchestrator::TurnOrchestrator;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<TurnOrchestrator>,
}

impl AppState {
    /// Build the production state backed by the Responses API
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let runner = ResponsesRunner::new(
            config.provider.api_key.clone(),
            config.provider.base_url.clone(),
            config.system_config.request_timeout(),
        )?;
        Ok(Self::with_runner(config, Arc::new(runner)))
    }

    /// Build state around any runner, e.g. a stub in tests
    pub fn with_runner(config: Config, runner: Arc<dyn AgentRunner>) -> Self {
        let orchestrator = TurnOrchestrator::new(
            runner,
            config.agent_definition(),
            config.trace_metadata(),
        );
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        }
    }
}
