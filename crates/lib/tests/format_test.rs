//! # Result Rendering Tests
//!
//! Checks the farm listing mode, the all-fields mode, and both output formats.

use farmassist::format::{OutputFormat, RenderMode, RowRenderer};
use farmassist::types::Row;
use serde_json::json;

fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().expect("fixture must be an object")
}

#[test]
fn test_focus_rows_render_only_the_farm() {
    let rows = vec![
        row(json!({"fazenda": "Santa Fé", "total_animais": 2})),
        row(json!({"fazenda": "Boa Vista", "total_animais": 2})),
    ];
    let html = RowRenderer::default().render(&rows);

    assert_eq!(
        html,
        "<div style='font-family: sans-serif;'>\
         <p><span style='color:#64ffda;'>Santa Fé</span></p>\
         <p><span style='color:#64ffda;'>Boa Vista</span></p>\
         </div>"
    );
    assert!(!html.contains("total_animais"));
}

#[test]
fn test_rows_without_focus_column_render_every_field() {
    let rows = vec![row(json!({"protocolo": "P1", "protocolo_count": 3}))];
    let html = RowRenderer::default().render(&rows);

    assert_eq!(
        html,
        "<div style='font-family: sans-serif;'>\
         <p><strong>protocolo:</strong> <span style='color:#64ffda;'>P1</span></p>\
         <p><strong>protocolo_count:</strong> <span style='color:#64ffda;'>3</span></p>\
         <hr style='border-top: 1px dashed #64ffda;'>\
         </div>"
    );
}

#[test]
fn test_all_fields_mode_ignores_the_focus_column() {
    let rows = vec![row(json!({"fazenda": "Santa Fé", "touro": "Touro A"}))];
    let renderer = RowRenderer::new(RenderMode::AllFields, OutputFormat::PlainText);
    assert_eq!(
        renderer.render(&rows),
        "fazenda: Santa Fé\ntouro: Touro A\n----------"
    );
}

#[test]
fn test_custom_focus_column() {
    let rows = vec![
        row(json!({"touro": "Touro A", "fazenda": "Santa Fé"})),
        row(json!({"touro": "Touro B"})),
    ];
    let renderer = RowRenderer::new(
        RenderMode::FocusColumn("touro".to_string()),
        OutputFormat::PlainText,
    );
    assert_eq!(renderer.render(&rows), "Touro A\nTouro B");
}

#[test]
fn test_plain_text_mixes_focus_and_full_rows() {
    let rows = vec![
        row(json!({"fazenda": "Santa Fé"})),
        row(json!({"ecc": 3.5, "prenhez": "N/A"})),
    ];
    let renderer = RowRenderer::new(RenderMode::default(), OutputFormat::PlainText);
    assert_eq!(
        renderer.render(&rows),
        "Santa Fé\necc: 3.5\nprenhez: N/A\n----------"
    );
}

#[test]
fn test_html_values_are_escaped() {
    let rows = vec![row(json!({"fazenda": "<script>alert('x')</script>"}))];
    let html = RowRenderer::default().render(&rows);
    assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
}

#[test]
fn test_render_mode_deserializes_from_config_shape() {
    let mode: RenderMode =
        serde_json::from_value(json!({"mode": "focus_column", "column": "touro"})).unwrap();
    assert_eq!(mode, RenderMode::FocusColumn("touro".to_string()));

    let mode: RenderMode = serde_json::from_value(json!({"mode": "all_fields"})).unwrap();
    assert_eq!(mode, RenderMode::AllFields);
}
