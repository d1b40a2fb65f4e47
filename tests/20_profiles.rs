mod common;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use common::{ensure_server, login, register, unique_email, PASSWORD};

#[tokio::test]
async fn registration_returns_profile_without_password() -> Result<()> {
    let server = ensure_server().await?;
    let email = unique_email("dora");

    let resp = Client::new()
        .post(server.url("/profiles/"))
        .json(&json!({ "email": email, "name": "Dora", "password": PASSWORD, "bio": "hi" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await?;
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["name"], "Dora");
    assert_eq!(body["bio"], "hi");
    assert!(body["id"].is_i64());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn registration_validates_fields() -> Result<()> {
    let server = ensure_server().await?;

    let resp = Client::new()
        .post(server.url("/profiles/"))
        .json(&json!({ "email": "not-an-email", "name": "" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await?;
    assert!(body.get("email").is_some());
    assert!(body.get("name").is_some());
    assert_eq!(body["password"][0], "This field is required.");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_field_error() -> Result<()> {
    let server = ensure_server().await?;
    let account = register(server, "Eve").await?;

    let resp = Client::new()
        .post(server.url("/profiles/"))
        .json(&json!({ "email": account.email.to_uppercase(), "name": "Eve", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await?;
    assert!(body.get("email").is_some());
    Ok(())
}

#[tokio::test]
async fn anonymous_callers_can_read_but_not_write() -> Result<()> {
    let server = ensure_server().await?;
    let account = register(server, "Fay").await?;
    let client = Client::new();
    let detail = server.url(&format!("/profiles/{}/", account.profile_id));

    let resp = client.get(&detail).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["name"], "Fay");

    let resp = client.get(server.url("/profiles/")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.patch(&detail).json(&json!({ "name": "Mallory" })).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client.delete(&detail).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_may_modify_a_profile() -> Result<()> {
    let server = ensure_server().await?;
    let owner = register(server, "Gus").await?;
    let other = register(server, "Hal").await?;
    let client = Client::new();
    let detail = server.url(&format!("/profiles/{}/", owner.profile_id));

    let resp = other
        .authorize(client.patch(&detail))
        .json(&json!({ "name": "Hacked" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = other.authorize(client.delete(&detail)).send().await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Unchanged after the rejected write
    let body: Value = client.get(&detail).send().await?.json().await?;
    assert_eq!(body["name"], "Gus");

    let resp = owner
        .authorize(client.patch(&detail))
        .json(&json!({ "bio": "updated" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["bio"], "updated");
    assert_eq!(body["name"], "Gus");
    Ok(())
}

#[tokio::test]
async fn put_requires_all_fields_but_not_password() -> Result<()> {
    let server = ensure_server().await?;
    let owner = register(server, "Ivy").await?;
    let client = Client::new();
    let detail = server.url(&format!("/profiles/{}/", owner.profile_id));

    let resp = owner
        .authorize(client.put(&detail))
        .json(&json!({ "name": "Ivy Two" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body.get("email").is_some());
    assert!(body.get("password").is_none());

    let resp = owner
        .authorize(client.put(&detail))
        .json(&json!({ "email": owner.email, "name": "Ivy Two" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn password_change_takes_effect_on_login() -> Result<()> {
    let server = ensure_server().await?;
    let owner = register(server, "Jon").await?;
    let detail = server.url(&format!("/profiles/{}/", owner.profile_id));

    let resp = owner
        .authorize(Client::new().patch(&detail))
        .json(&json!({ "password": "a brand new secret" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(login(server, &owner.email, PASSWORD).await?.is_none());
    assert!(login(server, &owner.email, "a brand new secret").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn destroy_deactivates_the_identity() -> Result<()> {
    let server = ensure_server().await?;
    let owner = register(server, "Kim").await?;
    let client = Client::new();
    let detail = server.url(&format!("/profiles/{}/", owner.profile_id));

    let resp = owner.authorize(client.delete(&detail)).send().await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get(&detail).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The old token and credentials no longer work
    let resp = owner.authorize(client.get(server.url("/feed/"))).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(login(server, &owner.email, PASSWORD).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_profiles_are_not_found() -> Result<()> {
    let server = ensure_server().await?;
    let client = Client::new();

    let resp = client.get(server.url("/profiles/999999999/")).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await?;
    assert_eq!(body["detail"], "Not found.");

    let resp = client.get(server.url("/profiles/abc/")).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn search_matches_name_and_email() -> Result<()> {
    let server = ensure_server().await?;
    let marker = uuid::Uuid::new_v4().simple().to_string();
    let name = format!("Searchable {}", &marker[..8]);
    let email = unique_email("searchable");

    let resp = Client::new()
        .post(server.url("/profiles/"))
        .json(&json!({ "email": email, "name": name, "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let by_name: Vec<Value> = Client::new()
        .get(server.url("/profiles/"))
        .query(&[("search", marker[..8].to_uppercase())])
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0]["email"], email.as_str());

    let by_email: Vec<Value> = Client::new()
        .get(server.url("/profiles/"))
        .query(&[("search", email.as_str())])
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(by_email.len(), 1);

    let none: Vec<Value> = Client::new()
        .get(server.url("/profiles/"))
        .query(&[("search", format!("{} nomatch", &marker[..8]))])
        .send()
        .await?
        .json()
        .await?;
    assert!(none.is_empty());
    Ok(())
}
