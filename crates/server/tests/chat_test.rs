//! # Chat Endpoint Tests
//!
//! Drives `/chat` end to end: the server calls a mocked OpenAI-compatible
//! completion service and queries a seeded SQLite file.
//!
//! Mocks are told apart by their sampling parameters: only SQL generation sends
//! `max_tokens`, the fallback uses temperature 0.2 and general chat 0.7.

mod common;

use common::{completion_body, TestApp, CHAT_COMPLETIONS_PATH};
use farmassist::constants::{MSG_NO_RESULTS, MSG_TRANSPORT_RETRY};
use httpmock::Method::POST;
use serde_json::json;

#[tokio::test]
async fn test_chat_lists_farms_as_html() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    let sql_mock = app.mock_server.mock(|when, then| {
        when.method(POST)
            .path(CHAT_COMPLETIONS_PATH)
            .body_contains("\"max_tokens\":500")
            .body_contains("\"role\":\"system\"")
            .body_contains("Quais fazendas temos?");
        then.status(200).json_body(completion_body(
            "```sql\nSELECT DISTINCT fazenda FROM inseminacoes ORDER BY fazenda LIMIT 10;\n```",
        ));
    });

    let (status, body) = app
        .post_json("/chat", &json!({"prompt": "Quais fazendas temos?", "history": []}))
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["result"]["kind"], "rows");
    assert_eq!(
        body["result"]["text"],
        "<div style='font-family: sans-serif;'>\
         <p><span style='color:#64ffda;'>Boa Vista</span></p>\
         <p><span style='color:#64ffda;'>Santa Fé</span></p>\
         <p><span style='color:#64ffda;'>São José</span></p>\
         </div>"
    );
    assert!(body.get("debug").is_none());
    sql_mock.assert_hits(1);
}

#[tokio::test]
async fn test_chat_debug_includes_sql_and_normalised_rows() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.mock_server.mock(|when, then| {
        when.method(POST)
            .path(CHAT_COMPLETIONS_PATH)
            .body_contains("\"max_tokens\":500");
        then.status(200).json_body(completion_body(
            "SELECT numero_animal, touro FROM inseminacoes WHERE numero_animal = '202'",
        ));
    });

    let (status, body) = app
        .post_json(
            "/chat?debug=true",
            &json!({"prompt": "Qual o touro do animal 202?"}),
        )
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["result"]["kind"], "rows");
    assert_eq!(body["debug"]["route"], "database");
    assert_eq!(
        body["debug"]["generated_sql"],
        "SELECT numero_animal, touro FROM inseminacoes WHERE numero_animal = '202'"
    );
    assert_eq!(
        body["debug"]["rows"],
        json!([{"numero_animal": "202", "touro": "N/A"}])
    );
}

#[tokio::test]
async fn test_chat_empty_result_message() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.mock_server.mock(|when, then| {
        when.method(POST).path(CHAT_COMPLETIONS_PATH);
        then.status(200).json_body(completion_body(
            "SELECT fazenda FROM inseminacoes WHERE estado = 'AC'",
        ));
    });

    let (status, body) = app
        .post_json("/chat", &json!({"prompt": "Quais fazendas ficam no Acre?"}))
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["result"]["kind"], "message");
    assert_eq!(body["result"]["text"], MSG_NO_RESULTS);
}

#[tokio::test]
async fn test_chat_prose_falls_back_with_history() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    let sql_mock = app.mock_server.mock(|when, then| {
        when.method(POST)
            .path(CHAT_COMPLETIONS_PATH)
            .body_contains("\"max_tokens\":500");
        then.status(200)
            .json_body(completion_body("Não consigo responder isso com os dados disponíveis."));
    });
    let fallback_mock = app.mock_server.mock(|when, then| {
        when.method(POST)
            .path(CHAT_COMPLETIONS_PATH)
            .body_contains("\"temperature\":0.2")
            .body_contains("Meu nome é Ana");
        then.status(200)
            .json_body(completion_body("  Não tenho dados de clima, Ana.  "));
    });

    let (status, body) = app
        .post_json(
            "/chat",
            &json!({
                "prompt": "Como está o clima na fazenda?",
                "history": [
                    {"role": "user", "content": "Meu nome é Ana"},
                    {"role": "assistant", "content": "Olá, Ana!"}
                ]
            }),
        )
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["result"]["kind"], "conversation");
    assert_eq!(body["result"]["text"], "Não tenho dados de clima, Ana.");
    sql_mock.assert_hits(1);
    fallback_mock.assert_hits(1);
}

#[tokio::test]
async fn test_chat_general_prompt_uses_higher_temperature() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    let general_mock = app.mock_server.mock(|when, then| {
        when.method(POST)
            .path(CHAT_COMPLETIONS_PATH)
            .body_contains("\"temperature\":0.7")
            .body_contains("What's the weather today?");
        then.status(200)
            .json_body(completion_body("I can't check the weather."));
    });

    let (status, body) = app
        .post_json("/chat?debug=true", &json!({"prompt": "What's the weather today?"}))
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["result"]["kind"], "conversation");
    assert_eq!(body["result"]["text"], "I can't check the weather.");
    assert_eq!(body["debug"]["route"], "general");
    assert!(body["debug"]["generated_sql"].is_null());
    general_mock.assert_hits(1);
}

#[tokio::test]
async fn test_chat_completion_outage_is_not_a_server_error() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.mock_server.mock(|when, then| {
        when.method(POST).path(CHAT_COMPLETIONS_PATH);
        then.status(503).body("upstream unavailable");
    });

    let (status, body) = app
        .post_json("/chat", &json!({"prompt": "Qual fazenda tem mais animais?"}))
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["result"]["kind"], "message");
    assert_eq!(body["result"]["text"], MSG_TRANSPORT_RETRY);
}

#[tokio::test]
async fn test_chat_refuses_mutation_by_default() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    let mut delete_mock = app.mock_server.mock(|when, then| {
        when.method(POST).path(CHAT_COMPLETIONS_PATH);
        then.status(200)
            .json_body(completion_body("DELETE FROM inseminacoes"));
    });

    let (status, body) = app
        .post_json("/chat", &json!({"prompt": "Apague todas as fazendas"}))
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["result"]["kind"], "message");
    let text = body["result"]["text"].as_str().unwrap();
    assert!(text.starts_with("Erro na consulta SQL: "), "got: {text}");

    delete_mock.assert_hits(1);
    delete_mock.delete();

    // The table is untouched.
    app.mock_server.mock(|when, then| {
        when.method(POST).path(CHAT_COMPLETIONS_PATH);
        then.status(200)
            .json_body(completion_body("SELECT COUNT(*) AS total FROM inseminacoes"));
    });
    let (_, body) = app
        .post_json("/chat?debug=true", &json!({"prompt": "Quantos animais tem cada fazenda?"}))
        .await
        .unwrap();
    assert_eq!(body["debug"]["rows"], json!([{"total": 5}]));
}

#[tokio::test]
async fn test_plain_text_all_fields_config() {
    let app = TestApp::spawn_with_config(
        r#"
render:
  focus_column: ""
  format: plain_text
"#,
    )
    .await
    .expect("Failed to spawn test app");
    app.mock_server.mock(|when, then| {
        when.method(POST).path(CHAT_COMPLETIONS_PATH);
        then.status(200).json_body(completion_body(
            "SELECT fazenda, numero_animal FROM inseminacoes WHERE numero_animal = '301'",
        ));
    });

    let (_, body) = app
        .post_json("/chat", &json!({"prompt": "Dados da fazenda do animal 301"}))
        .await
        .unwrap();
    assert_eq!(
        body["result"]["text"],
        "fazenda: São José\nnumero_animal: 301\n----------"
    );
}
