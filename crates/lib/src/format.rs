//! # Result Rendering
//!
//! Turns normalised rows into the text shown in the chat window.
//!
//! [`RenderMode::FocusColumn`] is the farm listing mode: a row that has the
//! focus column renders as that single value; other rows render every field,
//! one per line, followed by a separator.

use crate::{constants::DEFAULT_FOCUS_COLUMN, types::Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How each row is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "column")]
pub enum RenderMode {
    /// Render only this column's value for rows that contain it.
    FocusColumn(String),
    /// Render every key/value pair of every row.
    AllFields,
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::FocusColumn(DEFAULT_FOCUS_COLUMN.to_string())
    }
}

/// The markup of the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Html,
    PlainText,
}

const ACCENT: &str = "#64ffda";
const PLAIN_SEPARATOR: &str = "----------";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowRenderer {
    pub mode: RenderMode,
    pub format: OutputFormat,
}

impl RowRenderer {
    pub fn new(mode: RenderMode, format: OutputFormat) -> Self {
        Self { mode, format }
    }

    pub fn render(&self, rows: &[Row]) -> String {
        match self.format {
            OutputFormat::Html => self.render_html(rows),
            OutputFormat::PlainText => self.render_plain(rows),
        }
    }

    fn focus_value<'a>(&self, row: &'a Row) -> Option<&'a Value> {
        match &self.mode {
            RenderMode::FocusColumn(column) => row.get(column),
            RenderMode::AllFields => None,
        }
    }

    fn render_html(&self, rows: &[Row]) -> String {
        let mut out = String::from("<div style='font-family: sans-serif;'>");
        for row in rows {
            if let Some(value) = self.focus_value(row) {
                out.push_str(&format!(
                    "<p><span style='color:{ACCENT};'>{}</span></p>",
                    escape_html(&display_value(value))
                ));
            } else {
                for (key, value) in row {
                    out.push_str(&format!(
                        "<p><strong>{}:</strong> <span style='color:{ACCENT};'>{}</span></p>",
                        escape_html(key),
                        escape_html(&display_value(value))
                    ));
                }
                out.push_str(&format!("<hr style='border-top: 1px dashed {ACCENT};'>"));
            }
        }
        out.push_str("</div>");
        out
    }

    fn render_plain(&self, rows: &[Row]) -> String {
        let mut lines: Vec<String> = Vec::new();
        for row in rows {
            if let Some(value) = self.focus_value(row) {
                lines.push(display_value(value));
            } else {
                lines.extend(
                    row.iter()
                        .map(|(key, value)| format!("{key}: {}", display_value(value))),
                );
                lines.push(PLAIN_SEPARATOR.to_string());
            }
        }
        lines.join("\n")
    }
}

/// Strings render without quotes; everything else as JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_values() {
        assert_eq!(escape_html("<b>A&B</b>"), "&lt;b&gt;A&amp;B&lt;/b&gt;");
    }
}
