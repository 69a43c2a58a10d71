//! # The Assistant
//!
//! `Assistant` is the entry point for one user turn. It routes the prompt,
//! drives the [`SqlBridge`] for database questions, falls back to a
//! conversational answer when the model declines to write SQL, and renders the
//! result. It holds no conversation state; the caller passes the history in.

use crate::{
    bridge::SqlBridge,
    constants::MSG_COMPLETION_ERROR_PREFIX,
    errors::PromptError,
    format::{OutputFormat, RenderMode, RowRenderer},
    prompts::build_query_system_prompt,
    providers::{ai::AiProvider, db::storage::Storage},
    router::{KeywordRouter, QueryRouter, Route},
    sql::StatementPolicy,
    types::{
        build_messages, AssistantReply, CompletionParams, Conversation, MetricProxy, ReplyKind,
        TableSpec,
    },
};
use tracing::{error, info};

pub struct Assistant {
    router: Box<dyn QueryRouter>,
    bridge: SqlBridge,
    ai_provider: Box<dyn AiProvider>,
    renderer: RowRenderer,
    general_params: CompletionParams,
    fallback_params: CompletionParams,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("bridge", &self.bridge)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::new()
    }

    /// Routes `prompt` without calling any external service.
    pub fn route(&self, prompt: &str) -> Route {
        self.router.route(prompt)
    }

    pub fn bridge(&self) -> &SqlBridge {
        &self.bridge
    }

    /// Answers one user turn.
    ///
    /// `history` holds the prior turns only; `prompt` is the new user message.
    /// Every failure is turned into reply text, so this never errors.
    pub async fn respond(&self, prompt: &str, history: &Conversation) -> AssistantReply {
        match self.route(prompt) {
            Route::Database => {
                info!("[respond] Prompt routed to the database.");
                self.answer_from_database(prompt, history).await
            }
            Route::General => {
                info!("[respond] Prompt routed to general conversation.");
                self.converse(prompt, history, &self.general_params).await
            }
        }
    }

    async fn answer_from_database(&self, prompt: &str, history: &Conversation) -> AssistantReply {
        let sql = match self.bridge.translate(prompt, history).await {
            Ok(sql) => sql,
            Err(e) if e.is_not_sql() => {
                info!("[respond] Model declined to write SQL. Falling back to conversation.");
                return self.converse(prompt, history, &self.fallback_params).await;
            }
            Err(e) => return AssistantReply::message(e.user_message(), None),
        };

        match self.bridge.execute(&sql).await {
            Ok(rows) => AssistantReply {
                text: self.renderer.render(&rows),
                kind: ReplyKind::Rows,
                generated_sql: Some(sql),
                rows: Some(rows),
            },
            Err(e) => AssistantReply::message(e.user_message(), Some(sql)),
        }
    }

    async fn converse(
        &self,
        prompt: &str,
        history: &Conversation,
        params: &CompletionParams,
    ) -> AssistantReply {
        let messages = build_messages(None, history, prompt);
        match self.ai_provider.complete(&messages, params).await {
            Ok(text) => AssistantReply::conversation(text.trim()),
            Err(e) => {
                error!("Conversational completion failed: {e}");
                AssistantReply::message(format!("{MSG_COMPLETION_ERROR_PREFIX}: {e}"), None)
            }
        }
    }
}

/// A builder for [`Assistant`].
///
/// Only the AI provider and the storage provider are required; everything
/// else defaults to the insemination records setup.
pub struct AssistantBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    storage_provider: Option<Box<dyn Storage>>,
    router: Option<Box<dyn QueryRouter>>,
    table: TableSpec,
    metric_proxies: Vec<MetricProxy>,
    system_prompt: Option<String>,
    policy: StatementPolicy,
    render_mode: RenderMode,
    output_format: OutputFormat,
    sql_params: CompletionParams,
    general_params: CompletionParams,
    fallback_params: CompletionParams,
}

impl Default for AssistantBuilder {
    fn default() -> Self {
        Self {
            ai_provider: None,
            storage_provider: None,
            router: None,
            table: TableSpec::default(),
            metric_proxies: vec![MetricProxy::protocol_frequency()],
            system_prompt: None,
            policy: StatementPolicy::default(),
            render_mode: RenderMode::default(),
            output_format: OutputFormat::default(),
            sql_params: CompletionParams::SQL,
            general_params: CompletionParams::GENERAL,
            fallback_params: CompletionParams::FALLBACK,
        }
    }
}

impl AssistantBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ai_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    pub fn storage_provider(mut self, provider: Box<dyn Storage>) -> Self {
        self.storage_provider = Some(provider);
        self
    }

    /// Replaces the keyword router built from the table columns.
    pub fn router(mut self, router: Box<dyn QueryRouter>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn table(mut self, table: TableSpec) -> Self {
        self.table = table;
        self
    }

    pub fn metric_proxies(mut self, proxies: Vec<MetricProxy>) -> Self {
        self.metric_proxies = proxies;
        self
    }

    /// Uses `prompt` verbatim instead of rendering the built-in template.
    pub fn system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    pub fn statement_policy(mut self, policy: StatementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn sql_params(mut self, params: CompletionParams) -> Self {
        self.sql_params = params;
        self
    }

    pub fn general_params(mut self, params: CompletionParams) -> Self {
        self.general_params = params;
        self
    }

    pub fn fallback_params(mut self, params: CompletionParams) -> Self {
        self.fallback_params = params;
        self
    }

    pub fn build(self) -> Result<Assistant, PromptError> {
        let ai_provider = self
            .ai_provider
            .ok_or_else(|| PromptError::MissingAiProvider("no AI provider set".to_string()))?;
        let storage_provider = self
            .storage_provider
            .ok_or(PromptError::MissingStorageProvider)?;

        let router = self
            .router
            .unwrap_or_else(|| Box::new(KeywordRouter::new(&self.table.columns)));
        let system_prompt = self
            .system_prompt
            .unwrap_or_else(|| build_query_system_prompt(&self.table, &self.metric_proxies));

        let bridge = SqlBridge::new(
            ai_provider.clone(),
            storage_provider,
            system_prompt,
            self.policy,
        )
        .with_params(self.sql_params);

        Ok(Assistant {
            router,
            bridge,
            ai_provider,
            renderer: RowRenderer::new(self.render_mode, self.output_format),
            general_params: self.general_params,
            fallback_params: self.fallback_params,
        })
    }
}
