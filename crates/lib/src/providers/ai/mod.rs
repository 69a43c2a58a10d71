pub mod gemini;
pub mod openai;

use crate::errors::PromptError;
use crate::types::{ChatMessage, CompletionParams};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a chat completion service.
///
/// Implementations receive the full, ordered message list (system instruction,
/// prior turns and the new user message) and return the text of one completion.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
