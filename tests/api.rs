mod support;

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use catalog_advisor::core::config::{AppConfig, AppPaths, Credentials};
use catalog_advisor::server;
use catalog_advisor::state::{AppState, Services};

use support::{webpage_sources, CannedFetcher, Harness, MemoryIndex, ScriptedChat};

async fn spawn_app(services: Option<Services>, dir: &tempfile::TempDir) -> SocketAddr {
    let paths = Arc::new(AppPaths::from_root(dir.path()));
    let credentials = if services.is_some() {
        Credentials {
            google_api_key: Some("g".into()),
            groq_api_key: Some("q".into()),
            pinecone_api_key: Some("p".into()),
        }
    } else {
        Credentials::default()
    };
    let state = Arc::new(AppState::from_parts(
        paths,
        AppConfig::default(),
        credentials,
        services,
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(state)).await.unwrap();
    });
    addr
}

async fn create_session(client: &reqwest::Client, addr: SocketAddr) -> String {
    let body: Value = client
        .post(format!("http://{}/api/sessions", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["session_id"].as_str().unwrap().to_string()
}

fn harness() -> Harness {
    Harness::new(
        CannedFetcher::new().with_document("https://catalog.test/cse/", "CSE 2050 is an intro course"),
        MemoryIndex::default(),
        ScriptedChat::replying("<think>hmm</think>CSE 2050 is an intro course."),
        webpage_sources(&["cse"]),
    )
}

#[tokio::test]
async fn health_and_status_respond() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_app(None, &dir).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let status: Value = client
        .get(format!("http://{}/api/status", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["credentials_present"], false);
    assert_eq!(status["data_loading_enabled"], false);
    assert_eq!(status["missing_credentials"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn loading_without_credentials_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_app(None, &dir).await;

    let res = reqwest::Client::new()
        .post(format!("http://{}/api/sessions/s1/load", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("GROQ_API_KEY"));
}

#[tokio::test]
async fn config_endpoint_redacts_secrets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("secrets.yaml"),
        "credentials:\n  groq_api_key: super-secret\n",
    )
    .unwrap();
    let addr = spawn_app(None, &dir).await;

    let body: Value = reqwest::get(format!("http://{}/api/config", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["credentials"]["groq_api_key"], "****");
}

#[tokio::test]
async fn chat_flow_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let harness = harness();
    let addr = spawn_app(Some(harness.services()), &dir).await;
    let client = reqwest::Client::new();
    let session_id = create_session(&client, addr).await;
    let base = format!("http://{}/api/sessions/{}", addr, session_id);

    let early = client
        .post(format!("{}/chat", base))
        .json(&json!({"message": "What is CSE 2050?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(early.status(), 400);

    let load = client.post(format!("{}/load", base)).send().await.unwrap();
    assert_eq!(load.status(), 200);
    let load: Value = load.json().await.unwrap();
    assert_eq!(load["data_loaded"], true);
    assert_eq!(load["report"]["vectors_upserted"], 1);

    let turn = client
        .post(format!("{}/chat", base))
        .json(&json!({"message": "What is CSE 2050?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(turn.status(), 200);
    let turn: Value = turn.json().await.unwrap();
    assert_eq!(
        turn["reply"],
        "CSE 2050 is an intro course.\n\nSources:\n- CSE 2050: https://catalog.test/cse/"
    );
    assert!(turn["elapsed_ms"].is_u64());

    let history: Value = client
        .get(format!("{}/messages", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");

    let cleared = client.delete(format!("{}/messages", base)).send().await.unwrap();
    assert_eq!(cleared.status(), 200);
    let history: Value = client
        .get(format!("{}/messages", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["messages"], json!([]));
    assert_eq!(history["data_loaded"], true);

    let reset = client.delete(&base).send().await.unwrap();
    assert_eq!(reset.status(), 200);
    let after_reset = client
        .post(format!("{}/chat", base))
        .json(&json!({"message": "again"}))
        .send()
        .await
        .unwrap();
    assert_eq!(after_reset.status(), 400);
}

#[tokio::test]
async fn unknown_session_history_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_app(None, &dir).await;

    let res = reqwest::get(format!("http://{}/api/sessions/nope/messages", addr))
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn unknown_session_ids_do_not_create_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_app(Some(harness().services()), &dir).await;
    let client = reqwest::Client::new();

    for id in ["made-up-1", "made-up-2"] {
        let chat = client
            .post(format!("http://{}/api/sessions/{}/chat", addr, id))
            .json(&json!({"message": "What is CSE 2050?"}))
            .send()
            .await
            .unwrap();
        assert_eq!(chat.status(), 404);

        let load = client
            .post(format!("http://{}/api/sessions/{}/load", addr, id))
            .send()
            .await
            .unwrap();
        assert_eq!(load.status(), 404);
    }

    let status: Value = client
        .get(format!("http://{}/api/status", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["session_count"], 0);
}

#[tokio::test]
async fn created_sessions_get_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_app(None, &dir).await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let res = client
            .post(format!("http://{}/api/sessions", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let body: Value = res.json().await.unwrap();
        ids.push(body["session_id"].as_str().unwrap().to_string());
    }
    assert_ne!(ids[0], ids[1]);
}
