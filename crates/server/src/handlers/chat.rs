//! # Assistant Handlers
//!
//! `/chat` answers one user turn; `/route` only reports where a prompt would go.
//! The client owns the conversation and sends the prior turns with every call.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::{ChatRequest, ChatResponse, RouteRequest, RouteResponse};
use axum::{
    extract::{Query, State},
    Json,
};
use farmassist::Conversation;
use serde_json::json;
use tracing::info;

/// Answers one user turn.
///
/// Every assistant condition (no rows, invalid SQL, store or model failure)
/// comes back as a `200` with the user-facing text.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    info!(
        "Received chat prompt: '{}' ({} prior turns)",
        payload.prompt,
        payload.history.len()
    );
    let history = Conversation::from(payload.history);
    let reply = app_state.assistant.respond(&payload.prompt, &history).await;

    let debug_info = if debug_params.debug.unwrap_or(false) {
        Some(json!({
            "route": app_state.assistant.route(&payload.prompt),
            "generated_sql": reply.generated_sql,
            "rows": serde_json::to_value(&reply.rows).map_err(farmassist::PromptError::from)?,
        }))
    } else {
        None
    };

    Ok(wrap_response(
        ChatResponse {
            text: reply.text,
            kind: reply.kind,
        },
        debug_params,
        debug_info,
    ))
}

/// Reports the route a prompt would take without calling any external service.
pub async fn route_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<RouteRequest>,
) -> Json<ApiResponse<RouteResponse>> {
    let route = app_state.assistant.route(&payload.prompt);
    Json(ApiResponse {
        debug: None,
        result: RouteResponse { route },
    })
}
