use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::history::ChatTurn;
use crate::state::AppState;

/// Body of a chat request. `history` may be absent or `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatTurn>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected chat request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let message = request.message.unwrap_or_default();
    if message.is_empty() {
        warn!("Chat request without a message");
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    let history = request.history.unwrap_or_default();
    info!("Chat turn: {} prior turns", history.len());

    let response = state.orchestrator.run_turn(&history, &message).await?;
    Ok(Json(ChatResponse { response }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Public widget settings. The domain key is a publishable value.
pub async fn widget_config(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let widget = &state.config.widget;
    if !widget.enabled {
        return Err(ApiError::NotFound("Chat widget is not enabled".to_string()));
    }

    Ok(Json(json!({
        "api": {
            "url": crate::routes::CHATKIT_PATH,
            "domainKey": widget.domain_key.clone().unwrap_or_default(),
        },
        "startScreen": {
            "greeting": widget.greeting,
            "prompts": widget.prompts,
        },
        "composer": {
            "placeholder": widget.placeholder,
        },
    })))
}
