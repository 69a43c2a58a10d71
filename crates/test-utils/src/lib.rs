use anyhow::Result;
use async_trait::async_trait;
use farmassist::errors::PromptError;
use farmassist::providers::ai::AiProvider;
use farmassist::types::{ChatMessage, CompletionParams};
use std::sync::{Arc, Mutex};
use turso::Database;

// --- Fixtures ---

/// Schema of the insemination records table.
pub const CREATE_INSEMINACOES_SQL: &str = "CREATE TABLE IF NOT EXISTS inseminacoes (
    fazenda TEXT,
    estado TEXT,
    municipio TEXT,
    numero_animal TEXT,
    lote TEXT,
    raça TEXT,
    categoria TEXT,
    ecc REAL,
    ciclicidade TEXT,
    protocolo TEXT,
    implante_p4 TEXT,
    empresa TEXT,
    gnrh_na_ia TEXT,
    pgf_no_d0 TEXT,
    dose_pgf_retirada TEXT,
    marca_pgf_retirada TEXT,
    dose_ce TEXT,
    ecg TEXT,
    dose_ecg TEXT,
    touro TEXT,
    raça_touro TEXT,
    empresa_touro TEXT,
    inseminador TEXT,
    num_iatf INTEGER,
    dg TEXT,
    vazia_com_ou_sem_cl TEXT,
    perda TEXT
)";

/// Sample rows: three farms, some null cells.
pub const SAMPLE_INSEMINACOES_SQL: &[&str] = &[
    "INSERT INTO inseminacoes (fazenda, estado, numero_animal, protocolo, touro, inseminador, ecc, num_iatf, dg) VALUES ('Santa Fé', 'MT', '101', 'P1', 'Touro A', 'João', 3.5, 1, 'prenha')",
    "INSERT INTO inseminacoes (fazenda, estado, numero_animal, protocolo, touro, inseminador, ecc, num_iatf, dg) VALUES ('Santa Fé', 'MT', '102', 'P1', 'Touro B', 'João', 3.0, 2, 'vazia')",
    "INSERT INTO inseminacoes (fazenda, estado, numero_animal, protocolo, touro, inseminador, ecc, num_iatf, dg) VALUES ('Boa Vista', 'GO', '201', 'P2', 'Touro A', NULL, 2.75, 1, 'prenha')",
    "INSERT INTO inseminacoes (fazenda, estado, numero_animal, protocolo, touro, inseminador, ecc, num_iatf, dg) VALUES ('Boa Vista', 'GO', '202', 'P1', NULL, 'Maria', NULL, 1, NULL)",
    "INSERT INTO inseminacoes (fazenda, estado, numero_animal, protocolo, touro, inseminador, ecc, num_iatf, dg) VALUES ('São José', 'MS', '301', 'P3', 'Touro C', 'Maria', 3.25, 3, 'prenha')",
];

// --- Test Setup ---

/// A database seeded with the `inseminacoes` fixture.
pub struct TestSetup {
    pub db: Database,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database with the fixture loaded.
    pub async fn new() -> Result<Self> {
        Self::at(":memory:").await
    }

    /// Creates (or opens) the database at `path` and loads the fixture.
    pub async fn at(path: &str) -> Result<Self> {
        let db = turso::Builder::new_local(path).build().await?;
        seed_inseminacoes(&db).await?;
        Ok(Self { db })
    }
}

/// Creates the `inseminacoes` table in `db` and inserts the sample rows.
pub async fn seed_inseminacoes(db: &Database) -> Result<()> {
    let conn = db.connect()?;
    conn.execute(CREATE_INSEMINACOES_SQL, ()).await?;
    for statement in SAMPLE_INSEMINACOES_SQL {
        conn.execute(statement, ()).await?;
    }
    Ok(())
}

// --- Mock AI Provider ---

/// A completion provider that replies from a scripted queue and records calls.
///
/// Replies are consumed in order; once the queue is empty every call fails
/// with an `AiApi` error.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<(Vec<ChatMessage>, CompletionParams)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next unanswered call.
    pub fn add_response(&self, response: &str) {
        self.responses.lock().unwrap().push(response.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(Vec<ChatMessage>, CompletionParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, PromptError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), *params));

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(PromptError::AiApi(
                "MockAiProvider: no response programmed".to_string(),
            ));
        }
        Ok(responses.remove(0))
    }
}
