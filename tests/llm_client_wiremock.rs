use review_sentiment::config::LlmConfig;
use review_sentiment::model::{GenerationRequest, LlmClient, TextGenerator};
use review_sentiment::sentiment::{RetryPolicy, SentimentAnalyzer};
use review_sentiment::types::{AnalysisMode, SentimentLabel};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client(provider: &str, server: &MockServer) -> LlmClient {
    let config = LlmConfig {
        provider: provider.to_string(),
        api_key: "test-key".to_string(),
        base_url: Some(server.uri()),
        timeout_secs: 5,
        ..LlmConfig::default()
    };
    LlmClient::from_config(&config).unwrap()
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}

#[tokio::test]
async fn gemini_sends_json_mode_and_returns_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("{\"label\": \"Positive\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let text = client("gemini", &server)
        .generate(&GenerationRequest::json("hello", 0.1))
        .await
        .unwrap();
    assert_eq!(text, "{\"label\": \"Positive\"}");
}

#[tokio::test]
async fn gemini_without_candidates_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client("gemini", &server)
        .generate(&GenerationRequest::json("hello", 0.1))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Empty response from Gemini"));
    assert!(!err.is_parse_failure());
}

#[tokio::test]
async fn openai_requests_json_object_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "{}" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client("openai", &server)
        .generate(&GenerationRequest::json("hello", 0.1))
        .await
        .unwrap();
    assert_eq!(text, "{}");
}

#[tokio::test]
async fn error_status_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = client("gemini", &server)
        .generate(&GenerationRequest::json("hello", 0.1))
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("429"), "{}", msg);
    assert!(msg.contains("quota exhausted"), "{}", msg);
}

#[tokio::test]
async fn analyzer_end_to_end_over_http() {
    let server = MockServer::start().await;
    let payload = json!({
        "label": "negative",
        "confidence": 1.4,
        "explanation": "Strong dislike.",
        "evidence_phrases": ["waste of time"]
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(&payload)))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = SentimentAnalyzer::new(
        Box::new(client("gemini", &server)),
        RetryPolicy::immediate(),
    );
    let result = analyzer
        .analyze("A complete waste of time.", AnalysisMode::Strict)
        .await;

    assert_eq!(result.label, SentimentLabel::Negative);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.evidence_phrases, vec!["waste of time"]);

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("A complete waste of time."));
}

#[tokio::test]
async fn analyzer_gives_up_after_three_malformed_replies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("I think it's positive")))
        .expect(3)
        .mount(&server)
        .await;

    let analyzer = SentimentAnalyzer::new(
        Box::new(client("gemini", &server)),
        RetryPolicy::immediate(),
    );
    let outcome = analyzer
        .analyze_detailed("Pretty good.", AnalysisMode::Lenient)
        .await;

    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.result.label, SentimentLabel::Neutral);
    assert!(outcome
        .result
        .explanation
        .contains("JSON parsing error"));
}
