//! # Query Router
//!
//! Decides whether a user message needs the database. The default
//! implementation is a keyword heuristic over the table's column names; any
//! `Fn(&str) -> bool` can be plugged in instead.

use crate::constants::DEFAULT_COLUMNS;
use serde::{Deserialize, Serialize};

/// The two possible routing outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Database,
    General,
}

/// A predicate deciding whether a prompt is database-related.
pub trait QueryRouter: Send + Sync {
    fn is_database_related(&self, prompt: &str) -> bool;

    fn route(&self, prompt: &str) -> Route {
        if self.is_database_related(prompt) {
            Route::Database
        } else {
            Route::General
        }
    }
}

impl<F> QueryRouter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_database_related(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Routes to the database when any keyword occurs anywhere in the prompt,
/// ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRouter {
    keywords: Vec<String>,
}

impl KeywordRouter {
    /// Keywords are lower-cased; empty ones are dropped so they cannot match
    /// every prompt.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordRouter {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

impl QueryRouter for KeywordRouter {
    fn is_database_related(&self, prompt: &str) -> bool {
        let prompt = prompt.to_lowercase();
        self.keywords.iter().any(|k| prompt.contains(k.as_str()))
    }
}

/// Routes a prompt with the default keyword vocabulary.
pub fn route(prompt: &str) -> Route {
    KeywordRouter::default().route(prompt)
}
