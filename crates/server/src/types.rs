use farmassist::{ReplyKind, Route, Turn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

// --- /chat ---

/// One user turn plus everything said before it.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
    pub kind: ReplyKind,
}

// --- /route ---

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub route: Route,
}
