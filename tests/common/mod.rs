#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const TEST_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // In-memory store so the suite runs without Postgres
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sip-tracker"));
        cmd.env("APP_ENV", "development")
            .env("SIP_API_HOST", "127.0.0.1")
            .env("SIP_API_PORT", port.to_string())
            .env("SIP_STORAGE", "memory")
            .env("SUPABASE_SECRET_KEY", TEST_SECRET)
            .env_remove("DATABASE_URL")
            .env_remove("SIP_JWT_AUDIENCE")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
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
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Fresh user id so tests sharing one server never see each other's plans.
pub fn new_user() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn token_for(user_id: &str) -> String {
    sip_tracker::auth::issue_token(user_id, TEST_SECRET, chrono::Duration::hours(1))
        .expect("failed to sign test token")
}
