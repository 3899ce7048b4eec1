//! End-to-end tests of the HTTP store against a local chat endpoint.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;

use toolchat_client::{ChatConfig, HttpChatStore};
use toolchat_core::{ChatStatus, Conversation, ConversationStore, Part, Role, ToolState};

type Captured = Arc<Mutex<Vec<Value>>>;

const WEATHER_STREAM: &str = concat!(
    "data: {\"type\":\"start\",\"messageId\":\"msg-a1\"}\n\n",
    "data: {\"type\":\"start-step\"}\n\n",
    "data: {\"type\":\"tool-input-start\",\"toolCallId\":\"call_1\",\"toolName\":\"weather\"}\n\n",
    "data: {\"type\":\"tool-input-available\",\"toolCallId\":\"call_1\",\"toolName\":\"weather\",\"input\":{\"location\":\"Tokyo\"}}\n\n",
    "data: {\"type\":\"tool-output-available\",\"toolCallId\":\"call_1\",\"output\":{\"location\":\"Tokyo\",\"temperature\":72}}\n\n",
    "data: {\"type\":\"finish-step\"}\n\n",
    "data: {\"type\":\"start-step\"}\n\n",
    "data: {\"type\":\"text-start\",\"id\":\"t1\"}\n\n",
    "data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"It is 72°F \"}\n\n",
    "data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"in Tokyo.\"}\n\n",
    "data: {\"type\":\"text-end\",\"id\":\"t1\"}\n\n",
    "data: {\"type\":\"finish-step\"}\n\n",
    "data: {\"type\":\"finish\"}\n\n",
    "data: [DONE]\n\n",
);

async fn weather_chat(
    State(captured): State<Captured>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    captured.lock().unwrap().push(body);
    ([(header::CONTENT_TYPE, "text/event-stream")], WEATHER_STREAM)
}

async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn wait_until<F>(rx: &mut watch::Receiver<Conversation>, pred: F) -> Conversation
where
    F: FnMut(&Conversation) -> bool,
{
    let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for conversation")
        .expect("store dropped");
    snapshot.clone()
}

fn start_store(base_url: &str) -> HttpChatStore {
    let config = ChatConfig::new(base_url, "/api/chat-tools");
    let (store, backend) = HttpChatStore::new(&config).unwrap();
    tokio::spawn(backend.run());
    store
}

#[tokio::test]
async fn test_weather_reply_streams_into_conversation() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/chat-tools", post(weather_chat))
        .with_state(captured.clone());
    let base_url = spawn_server(app).await;

    let store = start_store(&base_url);
    let mut rx = store.subscribe();

    store.send("What's the weather in Tokyo?".to_string());

    // The user message is visible before any network round trip completes.
    assert_eq!(store.messages().len(), 1);
    assert_eq!(store.messages()[0].role, Role::User);

    let done = wait_until(&mut rx, |c| {
        c.status == ChatStatus::Ready && c.messages.len() == 2
    })
    .await;

    let reply = &done.messages[1];
    assert_eq!(reply.id.as_str(), "msg-a1");
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.text(), "It is 72°F in Tokyo.");

    let weather = reply
        .parts
        .iter()
        .find_map(|p| match p {
            Part::ToolWeather(call) => Some(call),
            _ => None,
        })
        .expect("weather part");
    assert_eq!(weather.state, ToolState::OutputAvailable);

    let bodies = captured.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["trigger"], "submit-message");
    assert_eq!(bodies[0]["messages"][0]["role"], "user");
    assert_eq!(
        bodies[0]["messages"][0]["parts"][0]["text"],
        "What's the weather in Tokyo?"
    );

    store.shutdown();
}

#[tokio::test]
async fn test_follow_up_carries_history() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/chat-tools", post(weather_chat))
        .with_state(captured.clone());
    let base_url = spawn_server(app).await;

    let store = start_store(&base_url);
    let mut rx = store.subscribe();

    store.send("first".to_string());
    wait_until(&mut rx, |c| c.status == ChatStatus::Ready && c.messages.len() == 2).await;

    store.send(String::new());
    let done =
        wait_until(&mut rx, |c| c.status == ChatStatus::Ready && c.messages.len() == 4).await;

    let bodies = captured.lock().unwrap().clone();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["messages"].as_array().map(Vec::len), Some(3));
    assert_eq!(bodies[1]["messages"][2]["parts"][0]["text"], "");

    let roles: Vec<Role> = done.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );

    // Both replies carry "msg-a1"; the first keeps it, the second gets its own.
    assert_eq!(done.messages[1].id.as_str(), "msg-a1");
    assert_ne!(done.messages[3].id.as_str(), "msg-a1");
    assert_eq!(done.messages[1].text(), "It is 72°F in Tokyo.");
    assert_eq!(done.messages[3].text(), "It is 72°F in Tokyo.");

    store.shutdown();
}

#[tokio::test]
async fn test_reused_reply_id_appends_new_turn() {
    let app = Router::new().route(
        "/api/chat-tools",
        post(|| async {
            (
                [(header::CONTENT_TYPE, "text/event-stream")],
                concat!(
                    "data: {\"type\":\"start\",\"messageId\":\"same\"}\n\n",
                    "data: {\"type\":\"text-start\",\"id\":\"t1\"}\n\n",
                    "data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"reply\"}\n\n",
                    "data: {\"type\":\"finish\"}\n\n",
                    "data: [DONE]\n\n",
                ),
            )
        }),
    );
    let base_url = spawn_server(app).await;

    let store = start_store(&base_url);
    let mut rx = store.subscribe();

    store.send("first".to_string());
    wait_until(&mut rx, |c| c.status == ChatStatus::Ready && c.messages.len() == 2).await;
    store.send("second".to_string());
    let done =
        wait_until(&mut rx, |c| c.status == ChatStatus::Ready && c.messages.len() == 4).await;

    let texts: Vec<String> = done.messages.iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["first", "reply", "second", "reply"]);
    assert_eq!(done.messages[1].id.as_str(), "same");

    store.shutdown();
}

/// Endpoint whose first reply is fed frame by frame from the test.
#[derive(Clone)]
struct Scripted {
    captured: Captured,
    live: Arc<Mutex<Option<mpsc::Receiver<Result<String, Infallible>>>>>,
}

const SECOND_STREAM: &str = concat!(
    "data: {\"type\":\"start\"}\n\n",
    "data: {\"type\":\"text-start\",\"id\":\"t1\"}\n\n",
    "data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"second reply\"}\n\n",
    "data: {\"type\":\"text-end\",\"id\":\"t1\"}\n\n",
    "data: {\"type\":\"finish\"}\n\n",
    "data: [DONE]\n\n",
);

async fn scripted_chat(State(scripted): State<Scripted>, Json(body): Json<Value>) -> Response {
    scripted.captured.lock().unwrap().push(body);
    let live = scripted.live.lock().unwrap().take();
    let body = match live {
        Some(rx) => Body::from_stream(ReceiverStream::new(rx)),
        None => Body::from(SECOND_STREAM),
    };
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn spawn_scripted() -> (String, Captured, mpsc::Sender<Result<String, Infallible>>) {
    let (tx, rx) = mpsc::channel(16);
    let scripted = Scripted {
        captured: Captured::default(),
        live: Arc::new(Mutex::new(Some(rx))),
    };
    let captured = scripted.captured.clone();
    let app = Router::new()
        .route("/api/chat-tools", post(scripted_chat))
        .with_state(scripted);
    (spawn_server(app).await, captured, tx)
}

fn frame(json: &str) -> Result<String, Infallible> {
    Ok(format!("data: {}\n\n", json))
}

#[tokio::test]
async fn test_send_during_stream_is_queued_in_order() {
    let (base_url, captured, tx) = spawn_scripted().await;
    let store = start_store(&base_url);
    let mut rx = store.subscribe();

    store.send("first".to_string());
    tx.send(frame(r#"{"type":"start","messageId":"slow-1"}"#)).await.unwrap();
    tx.send(frame(r#"{"type":"text-start","id":"t1"}"#)).await.unwrap();
    tx.send(frame(r#"{"type":"text-delta","id":"t1","delta":"one"}"#))
        .await
        .unwrap();
    wait_until(&mut rx, |c| {
        c.status == ChatStatus::Streaming && c.messages.len() == 2 && c.messages[1].text() == "one"
    })
    .await;

    // The user turn lands right away, after the partial reply.
    store.send("second".to_string());
    let texts: Vec<String> = store.messages().iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["first", "one", "second"]);

    // Its request waits for the open stream.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(captured.lock().unwrap().len(), 1);

    tx.send(frame(r#"{"type":"text-delta","id":"t1","delta":" two"}"#))
        .await
        .unwrap();
    tx.send(frame(r#"{"type":"finish"}"#)).await.unwrap();
    tx.send(frame("[DONE]")).await.unwrap();
    drop(tx);

    let done =
        wait_until(&mut rx, |c| c.status == ChatStatus::Ready && c.messages.len() == 4).await;

    let texts: Vec<String> = done.messages.iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["first", "one two", "second", "second reply"]);
    assert_eq!(done.messages[1].id.as_str(), "slow-1");

    let bodies = captured.lock().unwrap().clone();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["messages"].as_array().map(Vec::len), Some(1));
    assert_eq!(bodies[1]["messages"].as_array().map(Vec::len), Some(3));
    assert_eq!(bodies[1]["messages"][1]["parts"][0]["text"], "one two");
    assert_eq!(bodies[1]["messages"][2]["parts"][0]["text"], "second");

    store.shutdown();
}

#[tokio::test]
async fn test_shutdown_during_open_stream() {
    let (base_url, _captured, tx) = spawn_scripted().await;
    let config = ChatConfig::new(base_url.as_str(), "/api/chat-tools");
    let (store, backend) = HttpChatStore::new(&config).unwrap();
    let handle = tokio::spawn(backend.run());
    let mut rx = store.subscribe();

    store.send("Hi".to_string());
    tx.send(frame(r#"{"type":"text-start","id":"t1"}"#)).await.unwrap();
    tx.send(frame(r#"{"type":"text-delta","id":"t1","delta":"partial"}"#))
        .await
        .unwrap();
    wait_until(&mut rx, |c| c.messages.len() == 2).await;

    // The stream is still open when quit arrives.
    store.shutdown();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("backend did not stop while streaming")
        .unwrap();

    let snapshot = store.conversation();
    assert_eq!(snapshot.status, ChatStatus::Streaming);
    assert_eq!(snapshot.messages[1].text(), "partial");
    drop(tx);
}

#[tokio::test]
async fn test_http_failure_surfaces_as_status() {
    let app = Router::new().route(
        "/api/chat-tools",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base_url = spawn_server(app).await;

    let store = start_store(&base_url);
    let mut rx = store.subscribe();

    store.send("Hi".to_string());
    let failed = wait_until(&mut rx, |c| matches!(c.status, ChatStatus::Error(_))).await;

    assert_eq!(failed.status, ChatStatus::Error("HTTP 500: boom".into()));
    assert_eq!(failed.messages.len(), 1);

    store.shutdown();
}

#[tokio::test]
async fn test_stream_error_chunk_surfaces_as_status() {
    let app = Router::new().route(
        "/api/chat-tools",
        post(|| async {
            (
                [(header::CONTENT_TYPE, "text/event-stream")],
                "data: {\"type\":\"start\"}\n\ndata: {\"type\":\"error\",\"errorText\":\"model overloaded\"}\n\n",
            )
        }),
    );
    let base_url = spawn_server(app).await;

    let store = start_store(&base_url);
    let mut rx = store.subscribe();

    store.send("Hi".to_string());
    let failed = wait_until(&mut rx, |c| matches!(c.status, ChatStatus::Error(_))).await;

    assert_eq!(
        failed.status,
        ChatStatus::Error("stream error: model overloaded".into())
    );
}

#[tokio::test]
async fn test_shutdown_stops_backend() {
    let config = ChatConfig::new("http://127.0.0.1:9", "/api/chat-tools");
    let (store, backend) = HttpChatStore::new(&config).unwrap();
    let handle = tokio::spawn(backend.run());

    store.shutdown();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("backend did not stop")
        .unwrap();
}
