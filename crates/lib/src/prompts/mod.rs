//! # Prompt Template Modules
//!
//! Prompt templates used by the assistant. Only the database path carries a
//! system instruction; conversational turns are sent without one.

pub mod query;

pub use query::{
    build_query_system_prompt, render_proxy_rules, render_second_example, QUERY_SYSTEM_PROMPT,
};
