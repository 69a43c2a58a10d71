//! # SQL Validation Gate
//!
//! Cleans the raw completion text and decides whether it may be executed.
//! A reply that does not start with a known SQL verb is the model declining to
//! write SQL; the caller treats that as a cue to answer conversationally.

use crate::constants::MSG_NOT_SQL;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

/// Verbs that mark a completion as SQL.
pub const SQL_VERBS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "WITH"];

/// Verbs executed under [`StatementPolicy::ReadOnly`].
pub const READ_ONLY_VERBS: &[&str] = &["SELECT", "WITH"];

/// Keywords that make a read-only statement write, wherever they occur
/// outside literals and comments (e.g. `WITH t AS (...) DELETE FROM ...`).
pub const MUTATING_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE"];

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:sql\b)?").expect("code fence pattern is valid"));

/// Which recognised statements may reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementPolicy {
    /// Only `SELECT` and `WITH`.
    #[default]
    ReadOnly,
    /// Every verb in [`SQL_VERBS`].
    Permissive,
}

impl StatementPolicy {
    fn allows(self, verb: &str) -> bool {
        match self {
            StatementPolicy::ReadOnly => READ_ONLY_VERBS.contains(&verb),
            StatementPolicy::Permissive => SQL_VERBS.contains(&verb),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlValidationError {
    /// The completion is prose, not SQL.
    #[error("{msg}", msg = MSG_NOT_SQL)]
    NotSql,
    #[error("o comando `{0}` não é permitido em modo somente leitura.")]
    ForbiddenStatement(String),
    #[error("apenas uma instrução SQL é permitida por consulta.")]
    MultipleStatements,
}

impl SqlValidationError {
    /// True when the model chose not to return SQL at all.
    pub fn is_not_sql(&self) -> bool {
        matches!(self, SqlValidationError::NotSql)
    }
}

/// Removes every code-fence marker (with an optional `sql` tag) and the
/// surrounding whitespace.
pub fn clean_sql_response(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Returns the leading SQL verb of already-cleaned text, if any.
pub fn leading_verb(cleaned: &str) -> Option<&'static str> {
    let upper = cleaned.to_uppercase();
    SQL_VERBS.iter().copied().find(|verb| upper.starts_with(verb))
}

/// Cleans `raw` and checks it against the gate and `policy`.
///
/// On success the cleaned statement is returned unchanged otherwise.
pub fn validate_sql(raw: &str, policy: StatementPolicy) -> Result<String, SqlValidationError> {
    let cleaned = clean_sql_response(raw);
    let verb = leading_verb(&cleaned).ok_or(SqlValidationError::NotSql)?;

    if !policy.allows(verb) {
        return Err(SqlValidationError::ForbiddenStatement(verb.to_string()));
    }

    let tokens = code_tokens(&cleaned);
    if has_multiple_statements(&tokens) {
        return Err(SqlValidationError::MultipleStatements);
    }
    if policy == StatementPolicy::ReadOnly {
        if let Some(keyword) = mutating_keyword(&tokens) {
            return Err(SqlValidationError::ForbiddenStatement(keyword.to_string()));
        }
    }
    Ok(cleaned)
}

/// The parts of a statement that are code: words and statement separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Semicolon,
}

/// Splits `sql` into code tokens, skipping quoted literals and identifiers,
/// `--` line comments and `/* */` block comments.
fn code_tokens(sql: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            // A doubled quote closes and reopens, which skips the same span.
            '\'' | '"' | '`' => {
                for (_, q) in chars.by_ref() {
                    if q == c {
                        break;
                    }
                }
            }
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                for (_, q) in chars.by_ref() {
                    if q == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                for (_, q) in chars.by_ref() {
                    if prev == '*' && q == '/' {
                        break;
                    }
                    prev = q;
                }
            }
            ';' => tokens.push(Token::Semicolon),
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, n)) = chars.peek() {
                    if !(n.is_alphanumeric() || n == '_') {
                        break;
                    }
                    end = i + n.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Word(&sql[start..end]));
            }
            _ => {}
        }
    }
    tokens
}

/// True when code follows a `;`.
fn has_multiple_statements(tokens: &[Token<'_>]) -> bool {
    tokens
        .iter()
        .skip_while(|t| **t != Token::Semicolon)
        .any(|t| matches!(t, Token::Word(_)))
}

fn mutating_keyword(tokens: &[Token<'_>]) -> Option<&'static str> {
    tokens.iter().find_map(|t| match t {
        Token::Word(word) => MUTATING_KEYWORDS
            .iter()
            .copied()
            .find(|k| word.eq_ignore_ascii_case(k)),
        Token::Semicolon => None,
    })
}
