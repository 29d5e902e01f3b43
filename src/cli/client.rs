use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::models::{NewSipPlan, SipPlan};
use crate::summary::SchemeSummary;

/// Thin HTTP client for the SIP Tracker API
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_sip(&self, plan: &NewSipPlan) -> anyhow::Result<SipPlan> {
        let request = self.http.post(format!("{}/sips/", self.base_url)).json(plan);
        self.send_authorized(request).await
    }

    pub async fn summary(&self, as_of: Option<NaiveDate>) -> anyhow::Result<Vec<SchemeSummary>> {
        let mut request = self.http.get(format!("{}/sips/summary", self.base_url));
        if let Some(as_of) = as_of {
            request = request.query(&[("as_of", as_of.to_string())]);
        }
        self.send_authorized(request).await
    }

    pub async fn health(&self) -> anyhow::Result<Value> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        Ok(response.json().await?)
    }

    async fn send_authorized<T: DeserializeOwned>(&self, request: RequestBuilder) -> anyhow::Result<T> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| anyhow!("no token: pass --token or set SIP_TOKEN"))?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    match body.get("code").and_then(Value::as_str) {
        Some(code) => bail!("{} ({}): {}", status, code, message),
        None => bail!("{}: {}", status, message),
    }
}
