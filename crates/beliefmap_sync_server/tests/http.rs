//! HTTP-level tests for the state server.

use beliefmap_sync_server::{ServerConfig, StateServer};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const SECRET: &str = "s3cret";

async fn spawn_server(config: ServerConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = StateServer::new(config).unwrap();
    tokio::spawn(server.serve(listener));
    format!("http://{addr}")
}

fn state_url(base: &str) -> String {
    format!("{base}/api/state")
}

#[tokio::test]
async fn health_needs_no_credential() {
    let base = spawn_server(ServerConfig::default()).await;
    let response = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn state_round_trip() {
    let base = spawn_server(ServerConfig::default().with_secret(SECRET)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(state_url(&base))
        .bearer_auth(SECRET)
        .json(&json!({"key": "theme", "value": "{\"dark\":true}"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true}));

    let response = client
        .get(state_url(&base))
        .query(&[("key", "theme")])
        .header("cookie", format!("auth-token={SECRET}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"], json!("{\"dark\":true}"));
    assert!(body["updated_at"].as_i64().unwrap() > 0);

    let response = client
        .delete(state_url(&base))
        .query(&[("key", "theme")])
        .bearer_auth(SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(state_url(&base))
        .query(&[("key", "theme")])
        .bearer_auth(SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"data": null}));
}

#[tokio::test]
async fn updated_at_moves_forward() {
    let base = spawn_server(ServerConfig::default().with_secret(SECRET)).await;
    let client = reqwest::Client::new();

    let mut last = 0;
    for i in 0..5 {
        client
            .post(state_url(&base))
            .bearer_auth(SECRET)
            .json(&json!({"key": "k", "value": i.to_string()}))
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();

        let body: Value = client
            .get(state_url(&base))
            .query(&[("key", "k")])
            .bearer_auth(SECRET)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let updated_at = body["updated_at"].as_i64().unwrap();
        assert!(updated_at > last);
        last = updated_at;
    }
}

#[tokio::test]
async fn rejects_missing_or_wrong_credential() {
    let base = spawn_server(ServerConfig::default().with_secret(SECRET)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(state_url(&base))
        .query(&[("key", "k")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Unauthorized"}));

    let response = client
        .post(state_url(&base))
        .bearer_auth("wrong")
        .json(&json!({"key": "k", "value": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_cookie_accepted_despite_stale_bearer() {
    let base = spawn_server(ServerConfig::default().with_secret(SECRET)).await;
    let response = reqwest::Client::new()
        .post(state_url(&base))
        .bearer_auth("stale")
        .header("cookie", format!("auth-token={SECRET}"))
        .json(&json!({"key": "k", "value": "v"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn no_secret_rejects_everything() {
    let base = spawn_server(ServerConfig::default()).await;
    let response = reqwest::Client::new()
        .get(state_url(&base))
        .query(&[("key", "k")])
        .bearer_auth("")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_requests() {
    let base = spawn_server(ServerConfig::default().with_secret(SECRET)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(state_url(&base))
        .bearer_auth(SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(state_url(&base))
        .bearer_auth(SECRET)
        .json(&json!({"key": "k"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(state_url(&base))
        .bearer_auth(SECRET)
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .delete(state_url(&base))
        .bearer_auth(SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
