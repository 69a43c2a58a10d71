//! # AI Provider Factory
//!
//! Builds a completion provider from its configuration entry, so the server and
//! any other consumer share one construction path.

use crate::{
    errors::PromptError,
    providers::ai::{
        gemini::GeminiProvider,
        openai::{OpenAiProvider, DEFAULT_OPENAI_API_URL},
        AiProvider,
    },
};
use serde::Deserialize;
use tracing::info;

/// The configuration of a completion provider.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider: "openai" (any compatible endpoint, alias "local") or "gemini".
    pub provider: String,
    /// The API URL. Derived from the provider type and model when absent.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Creates a provider instance from `config`.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    let api_url = config.api_url.clone().filter(|url| !url.trim().is_empty());
    let api_key = config.api_key.clone().filter(|key| !key.trim().is_empty());

    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "openai" | "local" => {
            let api_url = api_url.unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string());
            info!("Configuring OpenAI-compatible provider with URL: {}", api_url);
            Box::new(OpenAiProvider::new(
                api_url,
                api_key,
                config.model_name.clone(),
            )?)
        }
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "api_key is required for the gemini provider.".to_string(),
                )
            })?;
            let api_url = match api_url {
                Some(url) => url,
                None => {
                    let model_name = config.model_name.as_deref().ok_or_else(|| {
                        PromptError::MissingAiProvider(
                            "model_name or api_url is required for the gemini provider."
                                .to_string(),
                        )
                    })?;
                    GeminiProvider::api_url_for_model(model_name)
                }
            };
            info!("Configuring Gemini provider with URL: {}", api_url);
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "Unsupported AI provider type '{other}'."
            )))
        }
    };

    Ok(provider)
}
