use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::agent::{AgentDefinition, AgentError, AgentInputItem, AgentRunner, TraceMetadata};
use crate::history::{to_agent_input, ChatTurn};

#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Message is required")]
    EmptyMessage,

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Runs one user turn against the agent service
pub struct TurnOrchestrator {
    runner: Arc<dyn AgentRunner>,
    agent: AgentDefinition,
    trace: TraceMetadata,
}

impl TurnOrchestrator {
    pub fn new(runner: Arc<dyn AgentRunner>, agent: AgentDefinition, trace: TraceMetadata) -> Self {
        info!(
            "TurnOrchestrator initialized: agent='{}', model={}, workflow_id='{}'",
            agent.name, agent.model, trace.workflow_id
        );
        Self {
            runner,
            agent,
            trace,
        }
    }

    /// Adapted history followed by the new user message
    pub fn build_context(history: &[ChatTurn], message: &str) -> Vec<AgentInputItem> {
        let mut context = to_agent_input(history);
        context.push(AgentInputItem::user(message));
        context
    }

    /// Send the conversation plus `message` to the agent and return its
    /// final text. Exactly one call is made; nothing is retried.
    pub async fn run_turn(&self, history: &[ChatTurn], message: &str) -> Result<String, TurnError> {
        if message.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        let context = Self::build_context(history, message);
        let span = info_span!(
            "turn",
            request_id = %Uuid::new_v4(),
            workflow_id = %self.trace.workflow_id,
            items = context.len()
        );

        let result = self
            .runner
            .run(&self.agent, context, &self.trace)
            .instrument(span.clone())
            .await
            .map_err(|e| {
                span.in_scope(|| error!("Agent run failed: {}", e));
                e
            })?;

        match result.final_output {
            Some(text) if !text.is_empty() => {
                span.in_scope(|| info!("Agent returned {} chars", text.chars().count()));
                Ok(text)
            }
            _ => {
                span.in_scope(|| error!("Agent run produced no final output"));
                Err(TurnError::Agent(AgentError::NoFinalOutput))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentTool, ModelSettings, RunResult, WebSearchTool};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingRunner {
        calls: Mutex<Vec<(Vec<AgentInputItem>, TraceMetadata)>>,
        reply: Option<String>,
    }

    impl RecordingRunner {
        fn new(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply: reply.map(str::to_string),
            })
        }
    }

    #[async_trait]
    impl AgentRunner for RecordingRunner {
        async fn run(
            &self,
            _agent: &AgentDefinition,
            input: Vec<AgentInputItem>,
            trace: &TraceMetadata,
        ) -> Result<RunResult, AgentError> {
            self.calls.lock().unwrap().push((input, trace.clone()));
            Ok(RunResult {
                final_output: self.reply.clone(),
            })
        }
    }

    fn orchestrator(runner: Arc<RecordingRunner>) -> TurnOrchestrator {
        TurnOrchestrator::new(
            runner,
            AgentDefinition {
                name: "My agent".to_string(),
                instructions: "Research things.".to_string(),
                model: "gpt-4.1".to_string(),
                tools: vec![AgentTool::WebSearch(WebSearchTool::default())],
                model_settings: ModelSettings::default(),
            },
            TraceMetadata {
                source: "agent-builder".to_string(),
                workflow_id: "wf_test".to_string(),
            },
        )
    }

    #[test]
    fn test_build_context_appends_message_last() {
        let history = vec![ChatTurn::user("A"), ChatTurn::assistant("B")];
        let context = TurnOrchestrator::build_context(&history, "C");
        let texts: Vec<String> = context.iter().map(AgentInputItem::text).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert!(context[2].is_user());
    }

    #[tokio::test]
    async fn test_empty_message_makes_no_call() {
        let runner = RecordingRunner::new(Some("unused"));
        let result = orchestrator(runner.clone()).run_turn(&[], "").await;
        assert!(matches!(result, Err(TurnError::EmptyMessage)));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_call_with_trace() {
        let runner = RecordingRunner::new(Some("answer"));
        let text = orchestrator(runner.clone())
            .run_turn(&[ChatTurn::system("local only")], "question")
            .await
            .unwrap();
        assert_eq!(text, "answer");

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (input, trace) = &calls[0];
        assert_eq!(input.len(), 1);
        assert_eq!(input[0].text(), "question");
        assert_eq!(trace.workflow_id, "wf_test");
        assert_eq!(trace.source, "agent-builder");
    }

    #[tokio::test]
    async fn test_missing_or_empty_output_is_failure() {
        for reply in [None, Some("")] {
            let runner = RecordingRunner::new(reply);
            let result = orchestrator(runner).run_turn(&[], "question").await;
            assert!(matches!(
                result,
                Err(TurnError::Agent(AgentError::NoFinalOutput))
            ));
        }
    }
}
