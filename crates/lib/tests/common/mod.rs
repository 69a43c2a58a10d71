#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared mocks and fixtures for the library tests. The mocks record every
//! call so tests can assert on the exact messages and sampling parameters that
//! reached the completion service.

use async_trait::async_trait;
use dotenvy::dotenv;
use farmassist::providers::ai::AiProvider;
use farmassist::providers::db::{sqlite::SqliteProvider, storage::Storage};
use farmassist::types::{ChatMessage, CompletionParams, Row};
use farmassist::PromptError;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

/// One recorded completion call.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub params: CompletionParams,
}

// --- Mock AI Provider ---

/// Answers calls from a scripted queue, in order.
///
/// An `Err` entry simulates a transport failure. An empty queue returns a
/// fixed default reply.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<RecordedCall>>>,
    responses: Arc<RwLock<Vec<Result<String, String>>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self::scripted(responses.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn scripted(responses: Vec<Result<String, String>>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.call_history.read().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, PromptError> {
        self.call_history.write().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            params: *params,
        });

        match self.responses.write().unwrap().pop() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(PromptError::AiApi(message)),
            None => Ok("Default mock response".to_string()),
        }
    }
}

// --- Mock Storage Providers ---

/// Fails every query with the given error kind.
#[derive(Clone, Debug)]
pub enum FailingStorage {
    Connection(String),
    Query(String),
}

#[async_trait]
impl Storage for FailingStorage {
    fn name(&self) -> &str {
        "FailingDB"
    }

    async fn fetch_rows(&self, _sql: &str) -> Result<Vec<Row>, PromptError> {
        match self {
            FailingStorage::Connection(msg) => Err(PromptError::StorageConnection(msg.clone())),
            FailingStorage::Query(msg) => Err(PromptError::StorageQueryFailed(msg.clone())),
        }
    }
}

/// Records every executed statement and returns no rows.
#[derive(Clone, Debug, Default)]
pub struct RecordingStorage {
    pub executed: Arc<RwLock<Vec<String>>>,
}

#[async_trait]
impl Storage for RecordingStorage {
    fn name(&self) -> &str {
        "RecordingDB"
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, PromptError> {
        self.executed.write().unwrap().push(sql.to_string());
        Ok(Vec::new())
    }
}

// --- Fixtures ---

pub const SEED_SQL: &str = "
    CREATE TABLE inseminacoes (
        fazenda TEXT,
        numero_animal TEXT,
        protocolo TEXT,
        touro TEXT,
        inseminador TEXT,
        ecc REAL,
        prenhez TEXT
    );
    INSERT INTO inseminacoes VALUES ('Santa Fé', '101', 'P1', 'Touro A', 'João', 3.5, 'sim');
    INSERT INTO inseminacoes VALUES ('Santa Fé', '102', 'P1', 'Touro B', 'João', 3.0, 'não');
    INSERT INTO inseminacoes VALUES ('Boa Vista', '201', 'P2', 'Touro A', NULL, 2.75, 'sim');
    INSERT INTO inseminacoes VALUES ('Boa Vista', '202', 'P1', NULL, 'Maria', NULL, NULL);
    INSERT INTO inseminacoes VALUES ('São José', '301', 'P3', 'Touro C', 'Maria', 3.25, 'sim');
";

/// An isolated in-memory store seeded with a small `inseminacoes` table.
pub async fn seeded_sqlite() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    provider
        .initialize_with_data(SEED_SQL)
        .await
        .expect("Failed to seed inseminacoes");
    provider
}
