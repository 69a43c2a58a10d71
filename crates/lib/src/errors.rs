use thiserror::Error;

/// Custom error types for the library.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider is missing or misconfigured: {0}")]
    MissingAiProvider(String),
    #[error("Storage provider is missing")]
    MissingStorageProvider,
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("{0}")]
    StorageQueryFailed(String),
    #[error("JSON error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}
