use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Completion state of an input or output item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Completed,
    InProgress,
    Incomplete,
}

/// Content part of a user item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    InputText { text: String },
}

/// Content part of an assistant item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputContent {
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<Value>,
    },
}

/// One conversation item as the agent service expects it.
///
/// Assistant items must carry a `status`; the service rejects prior
/// assistant turns without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum AgentInputItem {
    User {
        content: Vec<InputContent>,
    },
    Assistant {
        status: ItemStatus,
        content: Vec<OutputContent>,
    },
}

impl AgentInputItem {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: vec![InputContent::InputText { text: text.into() }],
        }
    }

    /// A finished assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            status: ItemStatus::Completed,
            content: vec![OutputContent::OutputText {
                text: text.into(),
                annotations: Vec::new(),
            }],
        }
    }

    /// Concatenated text of every content part
    pub fn text(&self) -> String {
        match self {
            Self::User { content } => content
                .iter()
                .map(|InputContent::InputText { text }| text.as_str())
                .collect(),
            Self::Assistant { content, .. } => content
                .iter()
                .map(|OutputContent::OutputText { text, .. }| text.as_str())
                .collect(),
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            Self::Assistant {
                status: ItemStatus::Completed,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    Medium,
    High,
}

impl Default for SearchContextSize {
    fn default() -> Self {
        Self::Medium
    }
}

/// Location hint for the web search tool. Only the `approximate` kind exists
/// and every geographic field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    #[serde(rename = "type", default = "default_location_type")]
    pub location_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn default_location_type() -> String {
    "approximate".to_string()
}

impl UserLocation {
    pub fn approximate() -> Self {
        Self {
            location_type: default_location_type(),
            country: None,
            region: None,
            city: None,
            timezone: None,
        }
    }
}

impl Default for UserLocation {
    fn default() -> Self {
        Self::approximate()
    }
}

/// Hosted web search tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchTool {
    #[serde(default)]
    pub search_context_size: SearchContextSize,
    #[serde(default = "UserLocation::approximate")]
    pub user_location: UserLocation,
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self {
            search_context_size: SearchContextSize::Medium,
            user_location: UserLocation::approximate(),
        }
    }
}

/// Tools an agent may be given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentTool {
    WebSearch(WebSearchTool),
}

/// Optional sampling settings forwarded with each run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
}

/// Fixed agent configuration used for every turn
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDefinition {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<AgentTool>,
    pub model_settings: ModelSettings,
}

pub const TRACE_SOURCE_KEY: &str = "__trace_source__";
pub const WORKFLOW_ID_KEY: &str = "workflow_id";

/// Correlation tags attached to a run. Not interpreted locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceMetadata {
    pub source: String,
    pub workflow_id: String,
}

impl TraceMetadata {
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (TRACE_SOURCE_KEY.to_string(), self.source.clone()),
            (WORKFLOW_ID_KEY.to_string(), self.workflow_id.clone()),
        ])
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    pub final_output: Option<String>,
}
