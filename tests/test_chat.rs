mod common;

use common::TestEnv;
use serde_json::{json, Value};

#[tokio::test]
async fn chat_forwards_the_message() {
    let env = TestEnv::new();
    let server = env.server();

    let body: Value = server
        .post("/api/chat")
        .json(&json!({ "message": "What is borrowing?" }))
        .await
        .json();
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], "echo: What is borrowing?");
}

#[tokio::test]
async fn missing_message_is_400() {
    let env = TestEnv::new();
    let server = env.server_permissive();

    let response = server.post("/api/chat").json(&json!({})).await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn blank_message_is_400() {
    let env = TestEnv::new();
    let server = env.server_permissive();

    let response = server
        .post("/api/chat")
        .json(&json!({ "message": "   " }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn api_key_failures_are_classified() {
    let env = TestEnv::new();
    let server = env.server_permissive();

    let response = server
        .post("/api/chat")
        .json(&json!({ "message": "please trigger-key-error" }))
        .await;
    response.assert_status_internal_server_error();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "API key error");
    assert!(body["details"].as_str().unwrap().contains("API key"));
}

#[tokio::test]
async fn model_config_failures_are_classified() {
    let env = TestEnv::new();
    let server = env.server_permissive();

    let response = server
        .post("/api/chat")
        .json(&json!({ "message": "please trigger-model-error" }))
        .await;
    response.assert_status_internal_server_error();
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid API configuration");
}
