mod common;

use std::time::{Duration, Instant};

use causa_completion::prompt::{
    DocumentAnalysisPrompt, LegalSearchPrompt, SearchMode, SearchResults,
};
use causa_completion::transport::TransportError;
use causa_completion::wire::ChatRole;
use causa_completion::{
    CompletionClient, CompletionFailure, CompletionRequest, ExpectedShape, FencedBlock,
    JSON_ONLY_INSTRUCTION, MalformedReason, ResponseFormat, ValueKind,
};
use common::{ScriptedTransport, StalledTransport, envelope};
use serde_json::json;

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest::new(prompt, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn well_formed_json_succeeds_with_raw_text() {
    let raw = r#"{"results": [{"titulo": "A"}, {"titulo": "B"}]}"#;
    let client = CompletionClient::with_transport(ScriptedTransport::ok(raw));

    let completion = client
        .complete(request("q"), &ExpectedShape::array("results"))
        .await
        .unwrap();

    assert_eq!(
        completion.structured,
        serde_json::from_str::<serde_json::Value>(raw).unwrap()
    );
    assert_eq!(completion.raw_text, raw);
    assert_eq!(completion.model.as_deref(), Some("gpt-4o-mini"));
}

#[tokio::test]
async fn fenced_and_prose_wrapped_json_is_recovered() {
    let raw = "Claro! Segue o resultado:\n```json\n{\"results\": []}\n```\nEspero ter ajudado.";
    let client = CompletionClient::with_transport(ScriptedTransport::ok(raw));

    let completion = client
        .complete(request("q"), &ExpectedShape::array("results"))
        .await
        .unwrap();

    assert_eq!(completion.structured, json!({"results": []}));
    assert_eq!(completion.raw_text, raw);
}

#[tokio::test]
async fn fenced_block_recovery_ignores_trailing_example() {
    let raw = "```json\n{\"results\": []}\n```\nExemplo de item: {\"titulo\": \"...\"}";
    let client =
        CompletionClient::with_transport(ScriptedTransport::ok(raw)).with_recovery(FencedBlock);

    let completion = client
        .complete(request("q"), &ExpectedShape::array("results"))
        .await
        .unwrap();
    assert_eq!(completion.structured, json!({"results": []}));

    // The default stage spans both objects and cannot parse the result.
    let client = CompletionClient::with_transport(ScriptedTransport::ok(raw));
    let failure = client
        .complete(request("q"), &ExpectedShape::array("results"))
        .await
        .unwrap_err();
    assert!(matches!(
        failure,
        CompletionFailure::MalformedOutput(MalformedReason::Parse(_))
    ));
}

#[tokio::test]
async fn deadline_cancels_a_stalled_exchange() {
    let transport = StalledTransport::default();
    let client = CompletionClient::with_transport(transport.clone());
    let request = CompletionRequest::new("q", Duration::from_millis(50)).unwrap();

    let started = Instant::now();
    let failure = client
        .complete(request, &ExpectedShape::new())
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(
        failure,
        CompletionFailure::Timeout {
            deadline: Duration::from_millis(50)
        }
    );
    assert!(elapsed < Duration::from_millis(200), "took {elapsed:?}");
    assert!(transport.was_cancelled());
    assert!(transport.was_dropped());
}

#[tokio::test]
async fn transport_timeout_is_reported_as_timeout() {
    let client = CompletionClient::with_transport(ScriptedTransport::error(TransportError::Timeout));
    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();
    assert!(matches!(failure, CompletionFailure::Timeout { .. }));
}

#[tokio::test]
async fn connection_failure_is_transport() {
    let client = CompletionClient::with_transport(ScriptedTransport::error(
        TransportError::Connect("connection refused".into()),
    ));
    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();
    assert_eq!(
        failure,
        CompletionFailure::Transport("connection refused".into())
    );
    assert!(failure.is_retryable());
}

#[tokio::test]
async fn unauthorized_is_distinct_from_server_error() {
    let client = CompletionClient::with_transport(ScriptedTransport::status(
        401,
        r#"{"error":{"message":"Incorrect API key provided"}}"#,
    ));
    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();
    assert_eq!(failure, CompletionFailure::Unauthorized { status: 401 });

    let client = CompletionClient::with_transport(ScriptedTransport::status(403, "forbidden"));
    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();
    assert_eq!(failure, CompletionFailure::Unauthorized { status: 403 });

    let body = r#"{"error":{"message":"The server had an error"}}"#;
    let client = CompletionClient::with_transport(ScriptedTransport::status(500, body));
    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();
    assert_eq!(
        failure,
        CompletionFailure::Upstream {
            status: 500,
            body: body.to_owned()
        }
    );
}

#[tokio::test]
async fn unexpected_shape_is_malformed() {
    let client = CompletionClient::with_transport(ScriptedTransport::ok(r#"{"unexpected": 1}"#));
    let failure = client
        .complete(request("q"), &ExpectedShape::array("results"))
        .await
        .unwrap_err();

    assert!(matches!(
        failure,
        CompletionFailure::MalformedOutput(MalformedReason::StructureMismatch(_))
    ));
    let CompletionFailure::MalformedOutput(reason) = failure else {
        unreachable!();
    };
    assert!(reason.to_string().starts_with("structure mismatch"));
}

#[tokio::test]
async fn wrong_kind_is_malformed() {
    let client =
        CompletionClient::with_transport(ScriptedTransport::ok(r#"{"results": "nenhum"}"#));
    let failure = client
        .complete(request("q"), &ExpectedShape::array("results"))
        .await
        .unwrap_err();
    assert!(failure.to_string().contains("structure mismatch"));
}

#[tokio::test]
async fn text_without_object_is_malformed() {
    let client = CompletionClient::with_transport(ScriptedTransport::ok(
        "Desculpe, não encontrei resultados.",
    ));
    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();
    assert_eq!(
        failure,
        CompletionFailure::MalformedOutput(MalformedReason::NoJsonObject)
    );
}

#[tokio::test]
async fn broken_json_is_malformed() {
    let client =
        CompletionClient::with_transport(ScriptedTransport::ok(r#"{"results": [1, 2,}"#));
    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();
    assert!(matches!(
        failure,
        CompletionFailure::MalformedOutput(MalformedReason::Parse(_))
    ));
}

#[tokio::test]
async fn empty_content_is_empty_output() {
    for body in [
        envelope(""),
        envelope("   \n"),
        json!({"choices": [{"message": {"content": null}}]}).to_string(),
        json!({"choices": []}).to_string(),
    ] {
        let client = CompletionClient::with_transport(ScriptedTransport::status(200, body));
        let failure = client
            .complete(request("q"), &ExpectedShape::new())
            .await
            .unwrap_err();
        assert_eq!(failure, CompletionFailure::EmptyOutput);
    }
}

#[tokio::test]
async fn request_body_carries_messages_and_options() {
    let transport = ScriptedTransport::ok("{}");
    let client = CompletionClient::with_transport(transport.clone()).with_default_model("gpt-4o");
    let request = CompletionRequest::builder()
        .with_prompt("jurisprudência sobre dano moral")
        .with_system_instruction("Responda em português.")
        .with_temperature(0.2)
        .with_max_output_tokens(512u32)
        .with_deadline(Duration::from_secs(5))
        .build()
        .unwrap();

    client.complete(request, &ExpectedShape::new()).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let body = &sent[0];
    assert_eq!(body.model, "gpt-4o");
    assert_eq!(body.temperature, 0.2);
    assert_eq!(body.max_tokens, 512);
    assert_eq!(body.response_format, Some(ResponseFormat::JsonObject));
    assert_eq!(body.messages[0].role, ChatRole::System);
    assert!(body.messages[0].content.starts_with(JSON_ONLY_INSTRUCTION));
    assert!(body.messages[0].content.ends_with("Responda em português."));
    assert_eq!(body.messages[1].role, ChatRole::User);
    assert_eq!(body.messages[1].content, "jurisprudência sobre dano moral");
}

#[tokio::test]
async fn failures_are_never_retried() {
    let transport = ScriptedTransport::status(503, "overloaded");
    let client = CompletionClient::with_transport(transport.clone());

    let failure = client
        .complete(request("q"), &ExpectedShape::new())
        .await
        .unwrap_err();

    assert!(failure.is_retryable());
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn nested_values_are_not_validated() {
    let client = CompletionClient::with_transport(ScriptedTransport::ok(
        r#"{"resumo": "ok", "pontos_chave": [1, {"x": null}]}"#,
    ));
    let shape = ExpectedShape::new()
        .require("resumo", ValueKind::String)
        .require("pontos_chave", ValueKind::Array);

    assert!(client.complete(request("q"), &shape).await.is_ok());
}

#[tokio::test]
async fn dano_moral_search_returns_first_precedent() {
    let raw = "Aqui está:\n```json\n{\"results\":[{\"titulo\":\"Caso X\",\"tribunal\":\"STJ\"}]}\n```";
    let client = CompletionClient::with_transport(ScriptedTransport::ok(raw));

    let completion = client
        .complete(
            request("jurisprudência sobre dano moral"),
            &ExpectedShape::array("results"),
        )
        .await
        .unwrap();

    assert_eq!(completion.structured["results"][0]["titulo"], "Caso X");
    assert_eq!(completion.raw_text, raw);

    let typed: SearchResults = completion.deserialize().unwrap();
    assert_eq!(typed.results[0].tribunal, "STJ");
}

#[tokio::test]
async fn search_prompt_runs_end_to_end() {
    let transport = ScriptedTransport::ok(
        r#"{"results": [{"titulo": "REsp 1.234", "tribunal": "STJ", "link": "https://stj.jus.br"}]}"#,
    );
    let client = CompletionClient::with_transport(transport.clone());

    let prompt = LegalSearchPrompt::new("dano moral").with_mode(SearchMode::Deep);
    let typed = client.run_prompt(prompt).await.unwrap().unwrap();

    assert_eq!(typed.data.results.len(), 1);
    assert_eq!(
        typed.data.results[0].link.as_deref(),
        Some("https://stj.jus.br")
    );
    assert!(transport.sent()[0].messages[1].content.contains("dano moral"));
}

#[tokio::test]
async fn nested_nulls_do_not_fail_typed_search() {
    let client = CompletionClient::with_transport(ScriptedTransport::ok(
        r#"{"results":[{"titulo":"Caso X","tribunal":null,"link":null}]}"#,
    ));

    let typed = client
        .run_prompt(LegalSearchPrompt::new("dano moral"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(typed.data.results[0].titulo, "Caso X");
    assert!(typed.data.results[0].tribunal.is_empty());
    assert!(typed.data.results[0].link.is_none());
}

#[tokio::test]
async fn nested_nulls_do_not_fail_typed_analysis() {
    let client = CompletionClient::with_transport(ScriptedTransport::ok(
        r#"{"resumo":"Contrato de locação","pontos_chave":[],"riscos":null,"prazos":null}"#,
    ));

    let typed = client
        .run_prompt(DocumentAnalysisPrompt::new("CONTRATO DE LOCAÇÃO..."))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(typed.data.resumo, "Contrato de locação");
    assert!(typed.data.riscos.is_empty());
}

#[tokio::test]
async fn typed_decode_failure_is_malformed() {
    let client = CompletionClient::with_transport(ScriptedTransport::ok(r#"{"results": [42]}"#));
    let failure = client
        .run_prompt(LegalSearchPrompt::new("q"))
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(
        failure,
        CompletionFailure::MalformedOutput(MalformedReason::Decode(_))
    ));
}

#[tokio::test]
async fn blank_query_fails_before_dispatch() {
    let transport = ScriptedTransport::ok("{}");
    let client = CompletionClient::with_transport(transport.clone());

    assert!(client.run_prompt(LegalSearchPrompt::new(" ")).await.is_err());
    assert!(transport.sent().is_empty());
}
