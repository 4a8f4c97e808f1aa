use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use llm_kit::{
    AIMessage, ChatMemory, FakeChatModel, FakeModelFactory, Provider, ToolCall,
};
use prompt_kit::{ContextStore, SECTION_KEYS};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use vc_feature_service::{AppState, create_router};

fn write_context(root: &std::path::Path, context: &str) {
    let dir = root.join(context);
    std::fs::create_dir_all(&dir).unwrap();
    for key in SECTION_KEYS {
        std::fs::write(dir.join(format!("prompt.{key}")), format!("[{context}/{key}]")).unwrap();
    }
}

struct Harness {
    router: Router,
    fake: FakeChatModel,
    factory: FakeModelFactory,
    memory: ChatMemory,
    _contexts: TempDir,
}

fn harness(responses: Vec<AIMessage>) -> Harness {
    let contexts = TempDir::new().unwrap();
    for context in ["chat", "clickbaitscore", "commentanalysis", "threatintel"] {
        write_context(contexts.path(), context);
    }

    let fake = FakeChatModel::new(responses);
    let factory = FakeModelFactory::new(fake.clone());
    let memory = ChatMemory::default();
    let state = AppState::new(
        Arc::new(ContextStore::new(contexts.path())),
        Arc::new(factory.clone()),
        memory.clone(),
    );

    Harness {
        router: create_router(state),
        fake,
        factory,
        memory,
        _contexts: contexts,
    }
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn chat_invokes_model_and_returns_result() {
    let h = harness(vec![AIMessage::new("ciao")]);

    let (status, body) = post(
        h.router,
        "/features/ollama/chat",
        json!({"question": "come stai?"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "ciao");
    assert_eq!(h.fake.call_count(), 1);
    assert_eq!(h.factory.providers_seen(), vec![Provider::Ollama]);

    // Full four-section prompt, fixed order, no separators.
    let calls = h.fake.calls();
    let system = calls[0][0].content();
    assert_eq!(
        system,
        "[chat/ruolo][chat/obiettivo][chat/azione][chat/contesto]"
    );
}

#[tokio::test]
async fn chat_appends_history_unless_noappendchat() {
    let h = harness(vec![AIMessage::new("prima"), AIMessage::new("seconda")]);

    let (status, _) = post(
        h.router.clone(),
        "/features/openai/chat",
        json!({"chat_key": "s1", "question": "uno"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.memory.history("s1").len(), 2);

    let (status, _) = post(
        h.router,
        "/features/openai/chat",
        json!({"chat_key": "s1", "question": "due", "noappendchat": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Second exchange not appended, but the model saw the first one.
    assert_eq!(h.memory.history("s1").len(), 2);
    let second_call = &h.fake.calls()[1];
    assert_eq!(second_call.len(), 4); // system + 2 history + question
}

#[tokio::test]
async fn missing_url_is_rejected_without_provider_call() {
    let h = harness(vec![AIMessage::new("unreachable")]);

    let (status, body) = post(
        h.router,
        "/features/ollama/clickbaitscore",
        json!({"question": "irrelevant"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_field");
    assert_eq!(h.fake.call_count(), 0);
}

#[tokio::test]
async fn missing_question_is_rejected_without_provider_call() {
    let h = harness(vec![AIMessage::new("unreachable")]);

    let (status, _) = post(h.router, "/features/anthropic/chat", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.fake.call_count(), 0);
}

#[tokio::test]
async fn clickbaitscore_decodes_url_and_forces_stateless_call() {
    let h = harness(vec![AIMessage::new("7/10, curiosity-gap headline")]);

    let encoded = BASE64.encode("https://example.com/you-wont-believe");
    let (status, body) = post(
        h.router,
        "/features/ollama/clickbaitscore",
        json!({"chat_key": "s1", "url": encoded, "noappendchat": false}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "7/10, curiosity-gap headline");

    // Decoded URL becomes the question.
    let calls = h.fake.calls();
    let question = calls[0].last().unwrap().content();
    assert_eq!(question, "https://example.com/you-wont-believe");

    // Defaults applied when unset.
    let options = h.fake.options_seen();
    assert_eq!(options[0].num_ctx, Some(2040));
    assert_eq!(options[0].max_tokens, Some(8032));

    // noappendchat forced true regardless of the caller-supplied value.
    assert!(h.memory.history("s1").is_empty());
}

#[tokio::test]
async fn oversized_max_token_saturates_instead_of_wrapping() {
    let h = harness(vec![AIMessage::new("ok")]);

    let (status, _) = post(
        h.router,
        "/features/ollama/chat",
        json!({"question": "hi", "max_token": 4_294_967_295u32}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let options = h.fake.options_seen();
    assert_eq!(options[0].max_tokens, Some(i32::MAX));
}

#[tokio::test]
async fn commentanalysis_uses_only_the_contesto_section() {
    let h = harness(vec![AIMessage::new("neutral")]);

    let (status, _) = post(
        h.router,
        "/features/google/commentanalysis",
        json!({"question": "great video!"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let calls = h.fake.calls();
    assert_eq!(calls[0][0].content(), "[commentanalysis/contesto]");
}

#[tokio::test]
async fn agent_mode_runs_tools_and_reports_trace() {
    let tool_turn = AIMessage::new("").with_tool_calls(vec![ToolCall {
        id: "call_0".to_string(),
        name: "current_time".to_string(),
        arguments: json!({}),
    }]);
    let h = harness(vec![tool_turn, AIMessage::new("report ready")]);

    let (status, body) = post(
        h.router,
        "/agent/ollamachat/threatintel",
        json!({"question": "check recent activity"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "report ready");
    assert_eq!(h.fake.call_count(), 2);

    let trace = body["trace"].as_array().unwrap();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0]["tool"], "current_time");
}

#[tokio::test]
async fn unknown_feature_or_prefix_is_404() {
    let h = harness(vec![AIMessage::new("unreachable")]);

    let (status, _) = post(
        h.router.clone(),
        "/features/ollama/nosuchfeature",
        json!({"question": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        h.router,
        "/features/nosuchprovider/chat",
        json!({"question": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(h.fake.call_count(), 0);
}
