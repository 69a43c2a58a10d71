//! # FarmAssist
//!
//! A chat assistant over insemination records. Each user turn is routed either
//! to the database path, where a completion service writes SQL that is
//! validated, executed and rendered, or to a plain conversational completion.
//!
//! The library keeps no conversation state. Callers pass the prior turns in
//! with every call and append the new prompt and reply themselves.

pub mod assistant;
pub mod bridge;
pub mod constants;
pub mod errors;
pub mod format;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod sql;
pub mod types;

pub use assistant::{Assistant, AssistantBuilder};
pub use bridge::{normalize_row, normalize_rows, BridgeError, QueryOutcome, SqlBridge};
pub use errors::PromptError;
pub use format::{OutputFormat, RenderMode, RowRenderer};
pub use router::{route, KeywordRouter, QueryRouter, Route};
pub use sql::{clean_sql_response, validate_sql, SqlValidationError, StatementPolicy};
pub use types::{
    AssistantReply, ChatMessage, CompletionParams, Conversation, MetricProxy, ReplyKind, Role,
    Row, TableSpec, Turn,
};
