use serde_json::json;
use steamsnap::agent::{AgentError, Generate, Summariser};
use steamsnap::gemini::{GeminiClient, GenerationConfig};
use steamsnap::{Sentiment, Summary};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/models/gemini-test:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("secret", "gemini-test", server.uri(), GenerationConfig::deterministic(256)).unwrap()
}

fn text_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test]
async fn generate_posts_prompt_with_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "secret"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Say hi" }] }],
            "generationConfig": { "topK": 1, "maxOutputTokens": 256 }
        })))
        .respond_with(text_reply("hi"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client(&server).generate("Say hi").await.unwrap(), "hi");
}

#[tokio::test]
async fn error_status_is_a_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).generate("Say hi").await.unwrap_err();
    match err {
        AgentError::RequestFailed(msg) => {
            assert!(msg.contains("429"), "{}", msg);
            assert!(msg.contains("quota exhausted"), "{}", msg);
        }
        other => panic!("expected request failure, got {}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_a_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).generate("Say hi").await.unwrap_err();
    assert!(matches!(err, AgentError::RequestFailed(ref msg) if msg.contains("malformed")), "{}", err);
}

#[tokio::test]
async fn empty_candidates_are_a_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client(&server).generate("Say hi").await.unwrap_err();
    assert!(matches!(err, AgentError::RequestFailed(_)));
}

#[tokio::test]
async fn summariser_reads_fenced_reply_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(text_reply(
            "```json\n{\"sentiment\": \"negative\", \"tldr\": \"Buggy launch ruins an otherwise promising survival crafting game\"}\n```",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let summary = Summariser::new(client(&server)).summarise("Crashes every hour").await.unwrap();
    assert_eq!(
        summary,
        Summary::new(Sentiment::Neg, "Buggy launch ruins an otherwise promising survival crafting game")
    );
}
