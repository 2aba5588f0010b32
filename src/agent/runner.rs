use async_trait::async_trait;

use super::error::AgentError;
use super::types::{AgentDefinition, AgentInputItem, RunResult, TraceMetadata};

/// Interface for a hosted agent runtime.
///
/// A run takes the full conversation context and returns once the agent has
/// produced its final answer. Tool use happens on the remote side.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(
        &self,
        agent: &AgentDefinition,
        input: Vec<AgentInputItem>,
        trace: &TraceMetadata,
    ) -> Result<RunResult, AgentError>;
}
