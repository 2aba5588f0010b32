use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::UNKNOWN_ERROR;
use crate::handlers::{ChatRequest, ChatResponse};
use crate::history::ChatTurn;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("A request is already in progress")]
    Busy,

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// In-memory conversation bound to one chat endpoint.
///
/// Only one submission may be outstanding at a time; a second call while
/// one is pending returns [`ClientError::Busy`] without touching the
/// conversation.
pub struct ChatSession {
    http: reqwest::Client,
    endpoint: String,
    turns: Mutex<Vec<ChatTurn>>,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatSession {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            turns: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Snapshot of the conversation so far
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.lock_turns().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn lock_turns(&self) -> std::sync::MutexGuard<'_, Vec<ChatTurn>> {
        self.turns.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, user: &str, reply: ChatTurn) {
        let mut turns = self.lock_turns();
        turns.push(ChatTurn::user(user));
        turns.push(reply);
    }

    /// Send `message` with the whole conversation and append the outcome.
    ///
    /// Failures are appended as a `system` turn so the session keeps going.
    pub async fn send(&self, message: &str) -> Result<String, ClientError> {
        if message.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let request = ChatRequest {
            message: Some(message.to_string()),
            history: Some(self.turns()),
        };
        debug!("Sending chat turn to {}", self.endpoint);

        match self.exchange(&request).await {
            Ok(reply) => {
                self.record(message, ChatTurn::assistant(reply.as_str()));
                Ok(reply)
            }
            Err(error) => {
                warn!("Chat turn failed: {}", error);
                self.record(message, ChatTurn::system(format!("Error: {}", error)));
                Err(error)
            }
        }
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let response = self.http.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        if status.is_success() {
            let body: ChatResponse = response.json().await?;
            return Ok(body.response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        let message = if message.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
