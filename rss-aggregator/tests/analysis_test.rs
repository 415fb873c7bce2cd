mod common;

use common::{init_tracing, Route, TestServer, UNREACHABLE};
use interfaces::FALLBACK_LABEL;
use rss_aggregator::{AiConfig, AnalysisClient, ProviderKind};
use std::time::Duration;

fn config_for(kind: ProviderKind, base_url: &str) -> AiConfig {
    AiConfig::new(kind, Some("test-key".to_string())).with_base_url(base_url)
}

#[tokio::test]
async fn openai_response_is_used() {
    init_tracing();
    let server = TestServer::start(vec![(
        "/v1/chat/completions",
        vec![Route::json(
            r#"{"choices":[{"message":{"role":"assistant","content":"**MARKET PERFORMANCE**\nStocks rose."}}],
               "usage":{"prompt_tokens":100,"completion_tokens":20,"total_tokens":120}}"#,
        )],
    )])
    .await;

    let client = AnalysisClient::new(&config_for(ProviderKind::OpenAi, &server.base_url()));
    let result = client.generate_analysis("Summarize the market").await;
    client.close();

    assert_eq!(result.text, "**MARKET PERFORMANCE**\nStocks rose.");
    assert_eq!(result.provider_label, "OpenAI GPT-5-MINI (medium reasoning, medium verbosity)");
    assert!(!result.is_fallback());

    let request = &server.requests()[0];
    assert!(request.head.contains("authorization: bearer test-key"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["model"], "gpt-5-mini");
    assert_eq!(body["max_completion_tokens"], 4000);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Summarize the market");
}

#[tokio::test]
async fn anthropic_response_is_used() {
    init_tracing();
    let server = TestServer::start(vec![(
        "/v1/messages",
        vec![Route::json(
            r#"{"content":[{"type":"text","text":"Bonds rallied."}],"usage":{"input_tokens":5,"output_tokens":3}}"#,
        )],
    )])
    .await;

    let client = AnalysisClient::new(&config_for(ProviderKind::Anthropic, &server.base_url()));
    let result = client.generate_analysis("prompt").await;

    assert_eq!(result.text, "Bonds rallied.");
    assert_eq!(result.provider_label, "Anthropic claude-3-5-haiku-20241022");

    let request = &server.requests()[0];
    assert!(request.head.contains("x-api-key: test-key"));
    assert!(request.head.contains("anthropic-version: 2023-06-01"));
}

#[tokio::test]
async fn gemini_response_is_used() {
    init_tracing();
    let server = TestServer::start(vec![(
        "/v1beta/models/gemini-2.5-flash:generateContent",
        vec![Route::json(
            r#"{"candidates":[{"content":{"parts":[{"text":"Gold hit a record."}]}}]}"#,
        )],
    )])
    .await;

    let client = AnalysisClient::new(&config_for(ProviderKind::Gemini, &server.base_url()));
    let result = client.generate_analysis("prompt").await;

    assert_eq!(result.text, "Gold hit a record.");
    assert_eq!(result.provider_label, "Google gemini-2.5-flash");
    assert!(server.requests()[0].target.ends_with("?key=test-key"));
}

#[tokio::test]
async fn failures_fall_back_to_basic_analysis() {
    init_tracing();
    let server = TestServer::start(vec![
        (
            "/empty/v1/chat/completions",
            vec![Route::json(r#"{"choices":[{"message":{"content":"   "}}]}"#)],
        ),
        ("/missing/v1/chat/completions", vec![Route::json("{}")]),
        ("/garbled/v1/chat/completions", vec![Route::json("<html>oops</html>")]),
        (
            "/error/v1/chat/completions",
            vec![Route::status(500).with_body(r#"{"error":{"message":"overloaded"}}"#)],
        ),
    ])
    .await;

    let bases = [
        server.url("/empty"),
        server.url("/missing"),
        server.url("/garbled"),
        server.url("/error"),
        UNREACHABLE.to_string(),
    ];

    for base in bases {
        let client = AnalysisClient::new(&config_for(ProviderKind::OpenAi, &base));
        let result = client.generate_analysis("prompt").await;
        assert_eq!(result.provider_label, FALLBACK_LABEL, "base {base}");
        assert!(result.provider_label.contains("Basic Analysis"));
        assert!(result.text.starts_with("**MARKET PERFORMANCE**"));
    }
}

#[tokio::test]
async fn provider_timeout_falls_back() {
    init_tracing();
    let server = TestServer::start(vec![(
        "/v1/messages",
        vec![Route::json(r#"{"content":[{"text":"late"}]}"#).delayed(Duration::from_secs(3))],
    )])
    .await;

    let mut config = config_for(ProviderKind::Anthropic, &server.base_url());
    config.timeout_seconds = 1;
    let client = AnalysisClient::new(&config);
    let result = client.generate_analysis("prompt").await;

    assert!(result.is_fallback());
}

#[tokio::test]
async fn missing_key_never_calls_the_api() {
    init_tracing();
    let server = TestServer::start(vec![]).await;
    let config = AiConfig::new(ProviderKind::OpenAi, None).with_base_url(server.base_url());

    let client = AnalysisClient::new(&config);
    assert!(!client.has_provider());
    assert!(client.generate_analysis("prompt").await.is_fallback());
    assert!(server.requests().is_empty());
}
