#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const PASSWORD: &str = "correct horse battery";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the binary before integration tests run.
        // An empty DATABASE_URL selects the in-memory store and stops .env from supplying one.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_profiles-api"));
        cmd.arg("serve")
            .env("PROFILES_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("DATABASE_URL", "")
            .env("JWT_SECRET", "integration-test-secret")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique address so tests sharing one server never collide
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

/// A registered identity with its profile id and a bearer token
pub struct Account {
    pub email: String,
    pub profile_id: i64,
    pub token: String,
}

impl Account {
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }
}

pub async fn register(server: &TestServer, name: &str) -> Result<Account> {
    let client = Client::new();
    let email = unique_email(&name.to_lowercase());

    let resp = client
        .post(server.url("/profiles/"))
        .json(&json!({ "email": email, "name": name, "password": PASSWORD }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "register failed: {}", resp.status());
    let profile: Value = resp.json().await?;
    let profile_id = profile["id"].as_i64().context("profile id missing")?;

    let token = login(server, &email, PASSWORD)
        .await?
        .context("login after register failed")?;

    Ok(Account {
        email,
        profile_id,
        token,
    })
}

/// Some(token) on success, None on a 400
pub async fn login(server: &TestServer, email: &str, password: &str) -> Result<Option<String>> {
    let resp = Client::new()
        .post(server.url("/login/"))
        .json(&json!({ "username": email, "password": password }))
        .send()
        .await?;

    match resp.status() {
        StatusCode::OK => {
            let body: Value = resp.json().await?;
            Ok(body["token"].as_str().map(str::to_string))
        }
        StatusCode::BAD_REQUEST => Ok(None),
        other => anyhow::bail!("unexpected login status {}", other),
    }
}
