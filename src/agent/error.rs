use thiserror::Error;

/// Failures reported by an agent runner
#[derive(Error, Debug)]
pub enum AgentError {
    /// Authentication failed (HTTP 401/403)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Rejected request (HTTP 400)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Any other non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// Body could not be decoded
    #[error("Malformed response: {message}")]
    Malformed { message: String },

    /// The run stopped before completing, e.g. at the output token limit
    #[error("Agent run {status}: {reason}")]
    Incomplete { status: String, reason: String },

    /// The run finished without any final text
    #[error("Agent returned no final output")]
    NoFinalOutput,
}

impl AgentError {
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn api_error<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn incomplete<S: Into<String>, R: Into<String>>(status: S, reason: R) -> Self {
        Self::Incomplete {
            status: status.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
