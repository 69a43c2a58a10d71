//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port, backed by a temporary
//! SQLite file seeded with the `inseminacoes` fixture and configured to call
//! an `httpmock::MockServer` as its completion service.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use farmassist_server::{
    config, router,
    state::{build_app_state, AppState},
};
use farmassist_test_utils::TestSetup;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub db_path: PathBuf,
    pub app_state: AppState,
    _db_file: NamedTempFile,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with the default configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_config("").await
    }

    /// Spawns the server, appending `extra_yaml` to the generated `config.yml`.
    pub async fn spawn_with_config(extra_yaml: &str) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start();
        let db_file = NamedTempFile::new()?;
        let db_path = db_file.path().to_path_buf();
        let db_path_str = db_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("temp path is not UTF-8"))?;

        // Seed the fixture, then release the handle before the server opens it.
        drop(TestSetup::at(db_path_str).await?);

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_url: "{db_path_str}"
storage: sqlite
provider:
  provider: "openai"
  api_url: "{}"
  api_key: null
  model_name: "mock-chat-model"
{extra_yaml}
"#,
            mock_server.url(CHAT_COMPLETIONS_PATH),
        );
        File::create(&config_path)?.write_all(config_content.as_bytes())?;

        let config_path_str = config_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("temp path is not UTF-8"))?;
        let config = config::get_config(Some(config_path_str))?;
        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            db_path,
            app_state: app_state_for_harness,
            _db_file: db_file,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// POSTs `body` to `path` and returns the status and parsed JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<(u16, Value)> {
        let response = self
            .client
            .post(format!("{}{path}", self.address))
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// An OpenAI-style chat completion body carrying `content`.
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}
