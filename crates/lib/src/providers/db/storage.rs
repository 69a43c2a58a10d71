use crate::{errors::PromptError, types::Row};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a relational store.
///
/// Implementations open a fresh connection for every query and release it on
/// every exit path. Connection failures are reported as
/// [`PromptError::StorageConnection`], query failures as
/// [`PromptError::StorageQueryFailed`].
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite", "PostgreSQL").
    fn name(&self) -> &str;

    /// Executes a single read query and returns its rows in result-set order.
    ///
    /// Null values are returned as `Value::Null`; normalisation for display
    /// happens in the bridge.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, PromptError>;
}

dyn_clone::clone_trait_object!(Storage);
