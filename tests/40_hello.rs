mod common;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use common::{ensure_server, register};

#[tokio::test]
async fn hello_view_greets_and_validates() -> Result<()> {
    let server = ensure_server().await?;
    let client = Client::new();

    let body: Value = client.get(server.url("/hello-view/")).send().await?.json().await?;
    assert_eq!(body["message"], "Hello Dear");
    assert!(body["an_apiview"].as_array().is_some_and(|list| !list.is_empty()));

    let resp = client
        .post(server.url("/hello-view/"))
        .json(&json!({ "name": "Sam" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert!(body["message"].as_str().unwrap().contains("Sam"));

    let resp = client.post(server.url("/hello-view/")).json(&json!({})).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body.get("name").is_some());

    let resp = client
        .post(server.url("/hello-view/"))
        .json(&json!({ "name": "Bartholomew" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn hello_view_echoes_other_verbs() -> Result<()> {
    let server = ensure_server().await?;
    let client = Client::new();

    let body: Value = client.put(server.url("/hello-view/")).send().await?.json().await?;
    assert_eq!(body["method"], "put");
    let body: Value = client.patch(server.url("/hello-view/")).send().await?.json().await?;
    assert_eq!(body["method"], "patch");
    let body: Value = client.delete(server.url("/hello-view")).send().await?.json().await?;
    assert_eq!(body["method"], "delete");
    Ok(())
}

#[tokio::test]
async fn hello_viewset_dispatches_actions() -> Result<()> {
    let server = ensure_server().await?;
    let client = Client::new();

    let body: Value = client.get(server.url("/hello-viewset/")).send().await?.json().await?;
    assert_eq!(body["message"], "Hello");
    assert!(body["a_viewset"].is_array());

    let body: Value = client
        .post(server.url("/hello-viewset/"))
        .json(&json!({ "name": "Sam" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["message"], "Hello Sam!");

    let body: Value = client.get(server.url("/hello-viewset/1/")).send().await?.json().await?;
    assert_eq!(body["http_method"], "GET");
    let body: Value = client.put(server.url("/hello-viewset/1/")).send().await?.json().await?;
    assert_eq!(body["http_method"], "PUT");
    let body: Value = client.patch(server.url("/hello-viewset/1/")).send().await?.json().await?;
    assert_eq!(body["http_method"], "PATCH");
    let body: Value = client.delete(server.url("/hello-viewset/1/")).send().await?.json().await?;
    assert_eq!(body["http_method"], "DELETE");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_400() -> Result<()> {
    let server = ensure_server().await?;

    let resp = Client::new()
        .post(server.url("/hello-viewset/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body["non_field_errors"].is_array());
    Ok(())
}

#[tokio::test]
async fn index_and_health_respond() -> Result<()> {
    let server = ensure_server().await?;
    let client = Client::new();

    let body: Value = client.get(server.url("/")).send().await?.json().await?;
    assert_eq!(body["name"], "Profiles API");

    let body: Value = client.get(server.url("/health")).send().await?.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn unrouted_verbs_answer_405_with_detail() -> Result<()> {
    let server = ensure_server().await?;
    let client = Client::new();

    let resp = client.put(server.url("/profiles/")).json(&json!({})).send().await?;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = resp.json().await?;
    assert_eq!(body["detail"], "Method \"PUT\" not allowed.");

    let account = register(server, "Vic").await?;
    let resp = account
        .authorize(client.post(server.url("/feed/1/")))
        .json(&json!({ "status_text": "hi" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = resp.json().await?;
    assert_eq!(body["detail"], "Method \"POST\" not allowed.");

    // Unimplemented actions and unrouted verbs answer the same way
    let body: Value = client.get(server.url("/login/")).send().await?.json().await?;
    assert_eq!(body["detail"], "Method \"GET\" not allowed.");
    Ok(())
}
