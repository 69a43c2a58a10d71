//! # Application Configuration
//!
//! Defines the configuration of `farmassist-server` and loads it from
//! programmatic defaults, an optional `config.yml` and environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use farmassist::{
    constants::{DEFAULT_DB_FILE, DEFAULT_FOCUS_COLUMN},
    format::{OutputFormat, RenderMode},
    providers::factory::ProviderConfig,
    sql::StatementPolicy,
    types::{MetricProxy, TableSpec},
};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::sync::LazyLock;
use tracing::info;

/// Unprefixed variables that override top-level keys.
const TOP_LEVEL_ENV_VARS: &[&str] = &["PORT", "DB_URL"];

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Which relational store backs the assistant.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Postgres,
}

/// Router settings. Without keywords the table's column names are used.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RouterConfig {
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

/// How result rows are rendered.
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Rows containing this column render only its value. An empty value or
    /// `null` renders every field.
    #[serde(default = "default_focus_column")]
    pub focus_column: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            focus_column: default_focus_column(),
            format: OutputFormat::default(),
        }
    }
}

impl RenderConfig {
    pub fn render_mode(&self) -> RenderMode {
        match self.focus_column.as_deref().map(str::trim) {
            Some(column) if !column.is_empty() => RenderMode::FocusColumn(column.to_string()),
            _ => RenderMode::AllFields,
        }
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// A SQLite file path or a PostgreSQL URL. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    #[serde(default)]
    pub storage: StorageKind,
    /// The completion service used for every call.
    #[serde(default = "default_provider")]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub table: TableSpec,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub statement_policy: StatementPolicy,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default = "default_metric_proxies")]
    pub metric_proxies: Vec<MetricProxy>,
}

fn default_port() -> u16 {
    9090
}

fn default_db_url() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_provider() -> ProviderConfig {
    ProviderConfig {
        provider: "openai".to_string(),
        api_url: None,
        api_key: None,
        model_name: None,
    }
}

fn default_focus_column() -> Option<String> {
    Some(DEFAULT_FOCUS_COLUMN.to_string())
}

fn default_metric_proxies() -> Vec<MetricProxy> {
    vec![MetricProxy::protocol_frequency()]
}

// Reads a file and substitutes `${VAR}` placeholders from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    Ok(Some(substitute_env(&content)))
}

/// Replaces every `${VAR}` with the value of `VAR`, or an empty string.
pub fn substitute_env(content: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures| {
            env::var(&caps["var"]).unwrap_or_default()
        })
        .to_string()
}

/// Loads the application configuration.
///
/// Layers, lowest precedence first:
/// - defaults declared on [`AppConfig`];
/// - `config.yml` next to the crate manifest, or `config_path_override`;
/// - `PORT` and `DB_URL` for the top-level keys;
/// - `FARMASSIST_...` variables for nested keys (e.g. `FARMASSIST_PROVIDER__API_KEY`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let default_path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
            match read_and_substitute(&default_path)? {
                Some(content) => {
                    info!("Loading configuration from '{default_path}'.");
                    builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
                }
                None => info!("'{default_path}' not found. Using defaults and environment."),
            }
        }
    }

    let top_level: config::Map<String, String> = TOP_LEVEL_ENV_VARS
        .iter()
        .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect();

    let settings = builder
        .add_source(
            Environment::default()
                .source(Some(top_level))
                .try_parsing(true),
        )
        .add_source(
            Environment::with_prefix("FARMASSIST")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
