//! Mock Telegram Bot API built on wiremock

use serde_json::json;
use std::time::Duration;
use tiktok_dl::TelegramClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "123:TEST";

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": result}))
}

fn message(message_id: i64) -> serde_json::Value {
    json!({"message_id": message_id, "date": 0, "chat": {"id": 1, "type": "private"}})
}

fn endpoint(name: &str) -> String {
    format!("/bot{TOKEN}/{name}")
}

/// Mount successful responses for every method the pipeline calls
pub async fn mount_happy_api(server: &MockServer) {
    for name in ["sendMessage", "editMessageText", "sendVideo"] {
        Mock::given(method("POST"))
            .and(path(endpoint(name)))
            .respond_with(ok(message(100)))
            .mount(server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path(endpoint("deleteMessage")))
        .respond_with(ok(json!(true)))
        .mount(server)
        .await;
}

/// Mount a failing `sendVideo`, taking priority over [`mount_happy_api`]
pub async fn mount_failing_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(endpoint("sendVideo")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: wrong file identifier",
        })))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Client pointed at the mock server
pub fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(
        reqwest::Client::new(),
        &server.uri(),
        TOKEN,
        Duration::from_secs(5),
    )
}

/// Requests received for one Bot API method
pub async fn calls_to(server: &MockServer, name: &str) -> Vec<Request> {
    let wanted = endpoint(name);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .collect()
}

/// Body of a request as lossy text
pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}
