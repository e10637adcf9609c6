#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub database_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: String) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ai-tools-atlas"));
        cmd.env("PORT", port.to_string())
            .env("DATABASE_URL", &database_url)
            .env("JWT_SECRET", "e2e-test-secret")
            .env("RUN_MIGRATIONS", "true")
            .env("APP_ENV", "development")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            database_url,
            child,
        })
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
        format!("{}/api/v1{}", self.base_url, path)
    }
}

/// The shared server, or `None` when `TEST_DATABASE_URL` is not set.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping end-to-end test");
        return Ok(None);
    };
    let server = SERVER.get_or_init(|| {
        TestServer::spawn(database_url).expect("failed to spawn server binary")
    });
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(Some(server))
}

/// Client that keeps cookies between requests, like a browser.
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

/// Unique, lowercase identifier so repeated runs against one database do not collide.
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn register(server: &TestServer, client: &Client, email: &str) -> Result<Value> {
    let res = client
        .post(server.url("/auth/register"))
        .json(&json!({
            "email": email,
            "password": "correct horse",
            "display_name": "E2E User",
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "register failed: {}",
        res.status()
    );
    Ok(res.json().await?)
}

/// Grant the admin role directly in the database; there is no API for it.
pub async fn promote_to_admin(server: &TestServer, email: &str) -> Result<()> {
    let pool = sqlx::PgPool::connect(&server.database_url).await?;
    sqlx::query("UPDATE users SET role = 'admin' WHERE email = $1")
        .bind(email)
        .execute(&pool)
        .await?;
    pool.close().await;
    Ok(())
}

/// Registered, promoted and signed in (the token is re-issued so it carries the new role).
pub async fn admin_client(server: &TestServer) -> Result<Client> {
    let client = browser();
    let email = format!("{}@example.com", unique("admin"));
    register(server, &client, &email).await?;
    promote_to_admin(server, &email).await?;

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": email, "password": "correct horse" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "admin login failed");
    Ok(client)
}

/// Create a category and one tool in it through the admin API; returns (category id, tool id, tool slug).
pub async fn seed_tool(server: &TestServer, admin: &Client) -> Result<(i64, i64, String)> {
    let category_slug = unique("cat");
    let res = admin
        .post(server.url("/admin/categories"))
        .json(&json!({ "slug": category_slug, "name": "E2E Category" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "category create failed");
    let category_id = res.json::<Value>().await?["data"]["id"]
        .as_i64()
        .context("category id")?;

    let tool_slug = unique("tool");
    let res = admin
        .post(server.url("/admin/tools"))
        .json(&json!({
            "slug": tool_slug,
            "name": "E2E Tool",
            "tagline": "Writes end-to-end tests",
            "has_free_tier": true,
            "platforms": "Web, macOS",
            "primary_category_id": category_id,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "tool create failed");
    let tool_id = res.json::<Value>().await?["data"]["id"]
        .as_i64()
        .context("tool id")?;

    Ok((category_id, tool_id, tool_slug))
}
