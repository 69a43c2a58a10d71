//! # NL-to-SQL Bridge
//!
//! Asks the completion service for a query, passes it through the validation
//! gate, runs it against the store and normalises the rows. Every failure is
//! classified as a [`BridgeError`] whose `Display` is the text shown to the
//! user; nothing escapes to the caller as a fault.

use crate::{
    constants::{
        MSG_DB_ERROR_PREFIX, MSG_NO_RESULTS, MSG_SQL_ERROR_PREFIX, MSG_TRANSPORT_RETRY,
        MSG_UNEXPECTED_PREFIX, NULL_PLACEHOLDER,
    },
    errors::PromptError,
    providers::{ai::AiProvider, db::storage::Storage},
    sql::{validate_sql, SqlValidationError, StatementPolicy},
    types::{build_messages, CompletionParams, Conversation, Row},
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a database turn did not produce rows.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The completion call failed.
    #[error("{msg}", msg = MSG_TRANSPORT_RETRY)]
    Transport(#[source] PromptError),
    /// The completion did not pass the validation gate.
    #[error("{prefix}: {0}", prefix = MSG_SQL_ERROR_PREFIX)]
    Validation(SqlValidationError),
    /// The store rejected or failed the query, including connectivity loss.
    #[error("{prefix}: {0}", prefix = MSG_DB_ERROR_PREFIX)]
    QueryExecution(String),
    /// The query ran but matched nothing.
    #[error("{msg}", msg = MSG_NO_RESULTS)]
    Empty,
    #[error("{prefix}: {0}", prefix = MSG_UNEXPECTED_PREFIX)]
    Unexpected(String),
}

impl BridgeError {
    /// True when the model answered with prose instead of SQL, which sends the
    /// turn down the conversational fallback.
    pub fn is_not_sql(&self) -> bool {
        matches!(self, BridgeError::Validation(e) if e.is_not_sql())
    }

    /// The text shown to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<SqlValidationError> for BridgeError {
    fn from(err: SqlValidationError) -> Self {
        BridgeError::Validation(err)
    }
}

/// The shell-facing result of a database turn: rows or a message.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Vec<Row>),
    Message(String),
}

impl From<Result<Vec<Row>, BridgeError>> for QueryOutcome {
    fn from(result: Result<Vec<Row>, BridgeError>) -> Self {
        match result {
            Ok(rows) => QueryOutcome::Rows(rows),
            Err(e) => QueryOutcome::Message(e.user_message()),
        }
    }
}

/// Replaces every null value with `"N/A"`, keeping keys and their order.
pub fn normalize_row(row: Row) -> Row {
    row.into_iter()
        .map(|(key, value)| match value {
            Value::Null => (key, Value::String(NULL_PLACEHOLDER.to_string())),
            other => (key, other),
        })
        .collect()
}

/// Normalises every row, keeping the store's row order.
pub fn normalize_rows(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter().map(normalize_row).collect()
}

#[derive(Clone, Debug)]
pub struct SqlBridge {
    ai_provider: Box<dyn AiProvider>,
    storage: Box<dyn Storage>,
    system_prompt: String,
    policy: StatementPolicy,
    params: CompletionParams,
}

impl SqlBridge {
    pub fn new(
        ai_provider: Box<dyn AiProvider>,
        storage: Box<dyn Storage>,
        system_prompt: String,
        policy: StatementPolicy,
    ) -> Self {
        Self {
            ai_provider,
            storage,
            system_prompt,
            policy,
            params: CompletionParams::SQL,
        }
    }

    /// Overrides the deterministic SQL sampling parameters.
    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn policy(&self) -> StatementPolicy {
        self.policy
    }

    /// Generates a query for `prompt` and returns it once it passes the gate.
    pub async fn translate(
        &self,
        prompt: &str,
        history: &Conversation,
    ) -> Result<String, BridgeError> {
        let messages = build_messages(Some(&self.system_prompt), history, prompt);
        debug!(prompt = %prompt, turns = history.len(), "--> Requesting SQL from AI provider");

        let raw = self
            .ai_provider
            .complete(&messages, &self.params)
            .await
            .map_err(|e| {
                error!("Failed to obtain SQL from AI provider: {e}");
                BridgeError::Transport(e)
            })?;
        debug!("<-- Raw completion: {}", raw);

        let sql = validate_sql(&raw, self.policy).map_err(|e| {
            warn!("Completion rejected by the validation gate: {e}");
            BridgeError::from(e)
        })?;
        info!(sql = %sql, "Generated SQL");
        Ok(sql)
    }

    /// Runs an already validated query and normalises the rows.
    pub async fn execute(&self, sql: &str) -> Result<Vec<Row>, BridgeError> {
        let rows = self.storage.fetch_rows(sql).await.map_err(|e| {
            error!("Query execution error on {}: {e}", self.storage.name());
            match e {
                PromptError::StorageConnection(_) | PromptError::StorageQueryFailed(_) => {
                    BridgeError::QueryExecution(e.to_string())
                }
                other => BridgeError::Unexpected(other.to_string()),
            }
        })?;

        if rows.is_empty() {
            info!("Query returned no rows.");
            return Err(BridgeError::Empty);
        }
        Ok(normalize_rows(rows))
    }

    /// Translates `prompt` into SQL, runs it and returns the normalised rows.
    pub async fn translate_and_run(
        &self,
        prompt: &str,
        history: &Conversation,
    ) -> Result<Vec<Row>, BridgeError> {
        let sql = self.translate(prompt, history).await?;
        self.execute(&sql).await
    }
}
