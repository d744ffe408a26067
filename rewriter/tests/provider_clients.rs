//! Drives the real provider clients against an in-process fake provider.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use seo_rewriter::{
    ActiveConfig, ConfigSource, GeminiService, LlmClient, LlmSettings, OpenAiService, Provider,
    RewriteError, RewriteRequest, RewriteService, RewriteSettings, TransportErrorKind,
};

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    query: HashMap<String, String>,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct FakeProvider {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn openai_handler(
    State(fake): State<FakeProvider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.captured.lock().unwrap().push(Captured {
        path: "chat/completions".to_string(),
        query: HashMap::new(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (fake.status, Json(fake.reply.clone()))
}

async fn gemini_handler(
    State(fake): State<FakeProvider>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.captured.lock().unwrap().push(Captured {
        path: call,
        query,
        authorization: None,
        body,
    });
    (fake.status, Json(fake.reply.clone()))
}

/// Starts a fake provider and returns its base URL plus the captured requests.
async fn spawn_provider(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let fake = FakeProvider {
        status,
        reply,
        captured: captured.clone(),
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(openai_handler))
        .route("/v1beta/models/:call", post(gemini_handler))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), captured)
}

fn openai(base: &str, key: &str) -> OpenAiService {
    OpenAiService::new(reqwest::Client::new(), key, &format!("{}/v1", base), "gpt-4o")
}

fn gemini(base: &str, key: &str) -> GeminiService {
    GeminiService::new(
        reqwest::Client::new(),
        key,
        &format!("{}/v1beta", base),
        "gemini-2.5-flash",
    )
}

fn openai_reply(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

fn gemini_reply(text: &str) -> Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
}

fn transport_kind(err: RewriteError) -> TransportErrorKind {
    match err {
        RewriteError::Transport { kind, .. } => kind,
        other => panic!("expected a transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn openai_client_requests_json_mode() {
    let (base, captured) = spawn_provider(StatusCode::OK, openai_reply(r#"{"ok": true}"#)).await;

    let text = openai(&base, "sk-test").generate_json("escreva algo").await.unwrap();
    assert_eq!(text, r#"{"ok": true}"#);

    let captured = captured.lock().unwrap();
    let request = &captured[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer sk-test"));
    assert_eq!(request.body["model"], "gpt-4o");
    assert_eq!(request.body["response_format"]["type"], "json_object");
    assert_eq!(request.body["max_tokens"], 4000);
    assert_eq!(request.body["messages"][0]["role"], "user");
    assert_eq!(request.body["messages"][0]["content"], "escreva algo");
}

#[tokio::test]
async fn gemini_client_sends_key_and_generation_config() {
    let (base, captured) = spawn_provider(StatusCode::OK, gemini_reply(r#"{"ok": true}"#)).await;

    let text = gemini(&base, "g-key").generate_json("escreva algo").await.unwrap();
    assert_eq!(text, r#"{"ok": true}"#);

    let captured = captured.lock().unwrap();
    let request = &captured[0];
    assert_eq!(request.path, "gemini-2.5-flash:generateContent");
    assert_eq!(request.query.get("key").map(String::as_str), Some("g-key"));
    assert_eq!(request.body["contents"][0]["parts"][0]["text"], "escreva algo");
    assert_eq!(
        request.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(request.body["generationConfig"]["maxOutputTokens"], 8192);
}

#[tokio::test]
async fn unauthorized_is_an_authentication_error() {
    let (base, _) = spawn_provider(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}}),
    )
    .await;

    let err = openai(&base, "sk-wrong").generate_json("x").await.unwrap_err();
    assert_eq!(transport_kind(err), TransportErrorKind::Authentication);
}

#[tokio::test]
async fn exhausted_gemini_quota_is_reported() {
    let (base, _) = spawn_provider(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"code": 429, "status": "RESOURCE_EXHAUSTED", "message": "Quota exceeded"}}),
    )
    .await;

    let err = gemini(&base, "g-key").generate_json("x").await.unwrap_err();
    assert_eq!(transport_kind(err), TransportErrorKind::QuotaExceeded);
}

#[tokio::test]
async fn plain_429_is_rate_limited() {
    let (base, _) = spawn_provider(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "Rate limit reached for requests"}}),
    )
    .await;

    let err = openai(&base, "sk-test").generate_json("x").await.unwrap_err();
    let message = err.user_message();
    assert_eq!(transport_kind(err), TransportErrorKind::RateLimited);
    assert!(message.starts_with("Muitas requisições"));
}

#[tokio::test]
async fn empty_completion_is_a_transport_error() {
    let (base, _) = spawn_provider(StatusCode::OK, json!({"choices": []})).await;

    let err = openai(&base, "sk-test").generate_json("x").await.unwrap_err();
    assert_eq!(transport_kind(err), TransportErrorKind::Other);
}

#[tokio::test]
async fn unreachable_provider_does_not_leak_the_key() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);

    let err = gemini(&base, "super-secret-key").generate_json("x").await.unwrap_err();
    assert!(!err.to_string().contains("super-secret-key"));
    assert_eq!(transport_kind(err), TransportErrorKind::Other);
}

fn settings_for(base: &str) -> RewriteSettings {
    RewriteSettings {
        llm: LlmSettings {
            openai_base_url: format!("{}/v1", base),
            gemini_base_url: format!("{}/v1beta", base),
            ..LlmSettings::default()
        },
        ..RewriteSettings::default()
    }
}

fn request() -> RewriteRequest {
    RewriteRequest {
        original_content: "Dicas de marketing digital para lojas de bairro.".to_string(),
        target_keyword: "marketing digital".to_string(),
        company_name: "Loja Azul".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn rewrite_through_gemini_parses_structured_reply() {
    let reply = json!({
        "rewrittenContent": "# Marketing digital\nGuia de **marketing digital** para o bairro.",
        "faq": [{"question": "Quanto custa?", "answer": "Depende."}],
        "qualityScore": 90
    })
    .to_string();
    let (base, captured) = spawn_provider(StatusCode::OK, gemini_reply(&reply)).await;

    let service = RewriteService::new(settings_for(&base)).unwrap();
    let config = ActiveConfig {
        provider: Provider::Gemini,
        api_key: "g-key".to_string(),
        source: ConfigSource::Environment,
    };
    let result = service.rewrite(&request(), &config, None).await.unwrap();

    assert!(result.rewritten_content.starts_with("<h1>Marketing digital</h1>"));
    assert!(result.rewritten_content.contains("<strong>marketing digital</strong>"));
    assert_eq!(result.quality_score, 90);
    assert_eq!(result.faq[0].question, "Quanto custa?");
    assert_eq!(result.cta_section.unwrap().button_text, "Falar com Loja Azul");

    let prompt = captured.lock().unwrap()[0].body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("Dicas de marketing digital para lojas de bairro."));
    assert!(prompt.contains("https://lojaazul.com.br/"));
}

#[tokio::test]
async fn rewrite_through_openai_degrades_on_plain_text() {
    let (base, _) = spawn_provider(
        StatusCode::OK,
        openai_reply("Marketing digital sem estrutura nenhuma"),
    )
    .await;

    let service = RewriteService::new(settings_for(&base)).unwrap();
    let config = ActiveConfig {
        provider: Provider::OpenAI,
        api_key: "sk-test".to_string(),
        source: ConfigSource::Saved,
    };
    let result = service.rewrite(&request(), &config, None).await.unwrap();

    assert_eq!(result.rewritten_content, "Marketing digital sem estrutura nenhuma");
    assert_eq!(result.word_count, 5);
    assert_eq!(result.seo_score, 20);
    assert_eq!(result.faq.len(), 1);
    assert_eq!(result.case_studies.len(), 3);
}

#[tokio::test]
async fn connection_test_reports_provider_failure() {
    let (base, _) = spawn_provider(
        StatusCode::FORBIDDEN,
        json!({"error": {"message": "API key not valid"}}),
    )
    .await;

    let service = RewriteService::new(settings_for(&base)).unwrap();
    let err = service
        .test_connection(Provider::Gemini, "bad-key")
        .await
        .unwrap_err();
    assert_eq!(transport_kind(err), TransportErrorKind::Authentication);
}
