// `RelayClient` against a local stand-in for the relay's /api/chat.

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use vidhi_agent::RelayClient;
use vidhi_core::{backend::CompletionBackend, CompletionRequest, Turn};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn spawn_relay(status: StatusCode, reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(
            "/api/chat",
            post(move |State(seen): State<Seen>, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    seen.lock().unwrap().push(body);
                    (status, Json(reply))
                }
            }),
        )
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), seen)
}

fn request() -> CompletionRequest {
    CompletionRequest::from_turns(&[Turn::user("hello"), Turn::model("hi"), Turn::user("help")]).unwrap()
}

#[tokio::test]
async fn posts_history_and_returns_raw_response() {
    let upstream = json!({ "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }], "usageMetadata": { "totalTokenCount": 7 } });
    let (base, seen) = spawn_relay(StatusCode::OK, upstream.clone()).await;

    let response = RelayClient::new(base).generate_content(&request()).await.unwrap();

    assert_eq!(response, upstream);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["history"], request().contents);
    assert!(seen[0].get("response_schema").is_none());
}

#[tokio::test]
async fn schema_travels_as_response_schema() {
    let (base, seen) = spawn_relay(StatusCode::OK, json!({})).await;
    let schema = json!({ "type": "OBJECT" });

    RelayClient::new(base)
        .generate_content(&request().with_response_schema(schema.clone()))
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap()[0]["response_schema"], schema);
}

#[tokio::test]
async fn error_status_surfaces_relay_message() {
    let (base, _) = spawn_relay(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "An internal server error occurred." }),
    )
    .await;

    let err = RelayClient::new(base).generate_content(&request()).await.unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("500"));
    assert!(msg.contains("An internal server error occurred."));
}
