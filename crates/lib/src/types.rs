use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single result row: column name to JSON value, in result-set column order.
pub type Row = Map<String, Value>;

/// The speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message exchange unit, as owned by the chat shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The conversation state a caller passes into every core call.
///
/// The core only reads it. Appending the new prompt and the returned reply is
/// the caller's job, so no state survives between calls inside the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

// --- Completion service wire types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message as sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        };
        Self {
            role,
            content: turn.content.clone(),
        }
    }
}

/// Builds the message list for a completion call: an optional system
/// instruction, every prior turn in order, then the new user message.
pub fn build_messages(
    system_instruction: Option<&str>,
    history: &Conversation,
    prompt: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if let Some(system) = system_instruction {
        messages.push(ChatMessage::system(system));
    }
    messages.extend(history.turns().iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(prompt));
    messages
}

/// Sampling parameters for a single completion call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

impl CompletionParams {
    /// Deterministic sampling used to generate SQL.
    pub const SQL: Self = Self {
        temperature: 0.0,
        max_tokens: Some(500),
        top_p: Some(0.9),
    };

    /// Used when the model declined to write SQL and the turn is answered
    /// conversationally instead.
    pub const FALLBACK: Self = Self {
        temperature: 0.2,
        max_tokens: None,
        top_p: None,
    };

    /// Open-ended conversation.
    pub const GENERAL: Self = Self {
        temperature: 0.7,
        max_tokens: None,
        top_p: None,
    };
}

// --- Table description ---

/// The queried table and its columns, embedded verbatim in the SQL prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<String>,
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            name: crate::constants::DEFAULT_TABLE_NAME.to_string(),
            columns: crate::constants::DEFAULT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Tells the model which available column stands in for a metric the table
/// does not record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricProxy {
    /// The metric the user may ask about, e.g. "eficácia".
    pub metric: String,
    /// The column whose value frequency is used instead.
    pub column: String,
    /// Extra wording appended to the rule.
    #[serde(default)]
    pub description: Option<String>,
}

impl MetricProxy {
    /// Ranks `protocolo` by frequency when asked for protocol effectiveness.
    pub fn protocol_frequency() -> Self {
        Self {
            metric: "eficácia".to_string(),
            column: "protocolo".to_string(),
            description: Some(
                "o valor mais comum é o mais amplamente utilizado e, portanto, pode ser considerado o \"melhor avaliado\"".to_string(),
            ),
        }
    }
}

// --- Replies ---

/// Which path produced an [`AssistantReply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Rows were returned by the store and rendered.
    Rows,
    /// The database path ended in a user-facing condition message.
    Message,
    /// A free-text completion (general path or fallback).
    Conversation,
}

/// The single value returned to the shell for one user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
    pub kind: ReplyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
}

impl AssistantReply {
    pub fn conversation(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ReplyKind::Conversation,
            generated_sql: None,
            rows: None,
        }
    }

    pub fn message(text: impl Into<String>, generated_sql: Option<String>) -> Self {
        Self {
            text: text.into(),
            kind: ReplyKind::Message,
            generated_sql,
            rows: None,
        }
    }
}
