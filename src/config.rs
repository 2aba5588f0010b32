use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::agent::{
    AgentDefinition, AgentTool, ModelSettings, TraceMetadata, WebSearchTool, DEFAULT_BASE_URL,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Front-end assets, served when the directory exists
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SystemConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Credentials and endpoint of the agent service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub web_search: WebSearchTool,
    #[serde(default = "default_model_settings")]
    pub model_settings: ModelSettings,
}

fn default_agent_name() -> String {
    "My agent".to_string()
}

fn default_instructions() -> String {
    "あなたは、プロのWEBエンジニア向けの技術リサーチャーです。 \
     ユーザーから依頼された技術トピックについて、Web検索(Browsing)ツールを使って最新の情報を調査します。 \
     調査結果は、複数の情報源を比較・分析し、メリット・デメリット、主要なポイントを簡潔にまとめて日本語で回答してください。"
        .to_string()
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_model_settings() -> ModelSettings {
    ModelSettings {
        temperature: Some(1.0),
        top_p: Some(1.0),
        max_tokens: Some(2048),
        store: Some(true),
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            instructions: default_instructions(),
            model: default_model(),
            web_search: WebSearchTool::default(),
            model_settings: default_model_settings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default = "default_trace_source")]
    pub source: String,
    #[serde(default)]
    pub workflow_id: String,
}

fn default_trace_source() -> String {
    "agent-builder".to_string()
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            source: default_trace_source(),
            workflow_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarterPrompt {
    pub label: String,
    pub prompt: String,
}

/// Settings handed to the embeddable chat widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub domain_key: Option<String>,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_prompts")]
    pub prompts: Vec<StarterPrompt>,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_greeting() -> String {
    "技術記事リサーチャー".to_string()
}

fn default_prompts() -> Vec<StarterPrompt> {
    vec![
        StarterPrompt {
            label: "React vs Vue".to_string(),
            prompt: "ReactとVueの最新の比較を詳細に教えて".to_string(),
        },
        StarterPrompt {
            label: "Next.js 15 の新機能".to_string(),
            prompt: "Next.js 15の主要な新機能をまとめて".to_string(),
        },
    ]
}

fn default_placeholder() -> String {
    "技術トピックを入力してください...".to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            domain_key: None,
            greeting: default_greeting(),
            prompts: default_prompts(),
            placeholder: default_placeholder(),
        }
    }
}

/// Replace `${VAR}` placeholders. Unset variables become empty strings so
/// that required values fail validation instead of leaking the placeholder.
pub fn substitute_env_vars(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

impl Config {
    /// Load a YAML or JSON file, picked by extension
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            bail!("Configuration file not found: {}", path);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let content = substitute_env_vars(&raw, |name| std::env::var(name).ok());

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") || path_lower.ends_with(".jsonld") {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON configuration: {}", path))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML configuration: {}", path))?
        };
        Ok(config)
    }

    /// Environment variables win over file values
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.provider.api_key = key;
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(workflow_id) = non_empty("WORKFLOW_ID") {
            self.trace.workflow_id = workflow_id;
        }
        if let Some(domain_key) = non_empty("CHATKIT_DOMAIN_KEY") {
            self.widget.domain_key = Some(domain_key);
        }
        if let Some(port) = non_empty("PORT") {
            self.system_config.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        }
        Ok(())
    }

    /// Startup checks. A failure here must stop the server from binding.
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.is_empty() {
            bail!("OPENAI_API_KEY is not set. Set it in the environment or in provider.api_key");
        }
        if self.agent.model.is_empty() {
            bail!("agent.model cannot be empty");
        }
        if self.widget.enabled && self.widget.domain_key.as_deref().unwrap_or("").is_empty() {
            bail!("CHATKIT_DOMAIN_KEY is not set. The chat widget requires a domain key");
        }
        Ok(())
    }

    pub fn agent_definition(&self) -> AgentDefinition {
        AgentDefinition {
            name: self.agent.name.clone(),
            instructions: self.agent.instructions.clone(),
            model: self.agent.model.clone(),
            tools: vec![AgentTool::WebSearch(self.agent.web_search.clone())],
            model_settings: self.agent.model_settings.clone(),
        }
    }

    pub fn trace_metadata(&self) -> TraceMetadata {
        TraceMetadata {
            source: self.trace.source.clone(),
            workflow_id: self.trace.workflow_id.clone(),
        }
    }
}
