//! # API Route Handlers
//!
//! The Axum route handlers for `farmassist-server`, split into the service
//! endpoints (`general`) and the assistant endpoints (`chat`).

pub mod chat;
pub mod general;

pub use chat::*;
pub use general::*;

use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, Json};
use serde_json::Value;

/// Wraps a successful result in the standard `ApiResponse`, including debug
/// information only when `?debug=true` was requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}
