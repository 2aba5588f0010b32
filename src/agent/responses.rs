use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::AgentError;
use super::runner::AgentRunner;
use super::types::{AgentDefinition, AgentInputItem, AgentTool, RunResult, TraceMetadata};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Agent runner backed by the OpenAI Responses API.
///
/// The hosted `web_search` tool is executed server side, so one request
/// covers the whole run.
pub struct ResponsesRunner {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ResponseRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: Vec<AgentInputItem>,
    tools: &'a [AgentTool],
    metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Vec<OutputPart>,
}

#[derive(Debug, Deserialize)]
struct OutputPart {
    #[serde(rename = "type")]
    part_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ResponseBody {
    fn final_output(&self) -> Option<String> {
        let text: String = self
            .output
            .iter()
            .filter(|item| item.item_type == "message")
            .filter(|item| item.role.as_deref().unwrap_or("assistant") == "assistant")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.part_type == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl ResponsesRunner {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AgentError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Network { source: e })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Initialized ResponsesRunner: base_url={}", base_url);

        Ok(Self {
            api_key,
            base_url,
            http_client,
        })
    }

    fn headers(&self) -> Result<HeaderMap, AgentError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| AgentError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: String) -> AgentError {
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => body,
    };

    match status {
        StatusCode::BAD_REQUEST => AgentError::invalid_request(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::authentication(message),
        StatusCode::PAYLOAD_TOO_LARGE => AgentError::invalid_request("Request too large"),
        StatusCode::TOO_MANY_REQUESTS => AgentError::rate_limit(message, retry_after),
        _ => AgentError::api_error(status.as_u16(), message),
    }
}

#[async_trait]
impl AgentRunner for ResponsesRunner {
    async fn run(
        &self,
        agent: &AgentDefinition,
        input: Vec<AgentInputItem>,
        trace: &TraceMetadata,
    ) -> Result<RunResult, AgentError> {
        let url = format!("{}/v1/responses", self.base_url);
        let settings = &agent.model_settings;
        let request = ResponseRequest {
            model: &agent.model,
            instructions: &agent.instructions,
            input,
            tools: &agent.tools,
            metadata: trace.to_map(),
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_output_tokens: settings.max_tokens,
            store: settings.store,
        };

        debug!(
            "Running agent '{}' on {} with {} input items",
            agent.name,
            agent.model,
            request.input.len()
        );

        let response = self
            .http_client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let error = error_for_status(status, retry_after, body);
            warn!("Agent service returned {}: {}", status, error);
            return Err(error);
        }

        let body: ResponseBody = response
            .json()
            .await
            .map_err(|e| AgentError::malformed(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = &body.error {
            return Err(AgentError::api_error(status.as_u16(), error.message.clone()));
        }
        // Partial output of an unfinished run is never surfaced
        if let Some(run_status) = body.status.as_deref() {
            debug!("Agent run finished with status {}", run_status);
            if run_status != "completed" {
                let reason = body
                    .incomplete_details
                    .as_ref()
                    .and_then(|details| details.reason.clone())
                    .unwrap_or_else(|| "no reason given".to_string());
                warn!("Agent run ended as {}: {}", run_status, reason);
                return Err(AgentError::incomplete(run_status, reason));
            }
        }

        Ok(RunResult {
            final_output: body.final_output(),
        })
    }
}
