//! # Application State
//!
//! The shared state handed to every request handler, and the logic that builds
//! it from the configuration at startup.

use crate::config::{AppConfig, StorageKind};
use farmassist::{
    providers::{
        db::{sqlite::SqliteProvider, storage::Storage},
        factory::create_provider,
    },
    router::KeywordRouter,
    Assistant,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
///
/// The assistant is stateless between turns, so one instance serves every
/// request concurrently.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub assistant: Arc<Assistant>,
}

/// Opens the configured relational store.
async fn build_storage(config: &AppConfig) -> anyhow::Result<Box<dyn Storage>> {
    match config.storage {
        StorageKind::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.db_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Ok(Box::new(SqliteProvider::new(&config.db_url).await?))
        }
        #[cfg(feature = "postgres")]
        StorageKind::Postgres => Ok(Box::new(
            farmassist::providers::db::postgres::PostgresProvider::new(config.db_url.clone()),
        )),
        #[cfg(not(feature = "postgres"))]
        StorageKind::Postgres => Err(anyhow::anyhow!(
            "storage 'postgres' requires the server to be built with the 'postgres' feature"
        )),
    }
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = create_provider(&config.provider)?;
    let storage = build_storage(&config).await?;
    info!(
        storage = storage.name(),
        table = %config.table.name,
        policy = ?config.statement_policy,
        "Building assistant."
    );

    let mut builder = Assistant::builder()
        .ai_provider(ai_provider)
        .storage_provider(storage)
        .table(config.table.clone())
        .metric_proxies(config.metric_proxies.clone())
        .statement_policy(config.statement_policy)
        .render_mode(config.render.render_mode())
        .output_format(config.render.format);

    if let Some(keywords) = &config.router.keywords {
        builder = builder.router(Box::new(KeywordRouter::new(keywords)));
    }

    Ok(AppState {
        config: Arc::new(config),
        assistant: Arc::new(builder.build()?),
    })
}
