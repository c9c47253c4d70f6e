//! Lightweight HTTP client for CLI subcommands.
//!
//! CLI subcommands (`taskd list`, `taskd create`, …) use this to call the
//! task API of a running server. Every call returns the raw status code and
//! decoded body; interpreting them is the caller's business.

use anyhow::{Context as _, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// A short-lived HTTP client for CLI-to-server calls.
///
/// One request per subcommand invocation; a 5-second timeout covers both
/// connecting and the response. No retries.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client targeting the given base URL (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    pub async fn create_task(
        &self,
        titulo: &str,
        descricao: &str,
        status: &str,
    ) -> Result<(StatusCode, Value)> {
        let payload = json!({ "titulo": titulo, "descricao": descricao, "status": status });
        let resp = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("could not reach the task server")?;
        Self::read_json(resp).await
    }

    pub async fn list_tasks(&self) -> Result<(StatusCode, Value)> {
        let resp = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .send()
            .await
            .context("could not reach the task server")?;
        Self::read_json(resp).await
    }

    pub async fn get_task(&self, id: i64) -> Result<(StatusCode, Value)> {
        let resp = self
            .http
            .get(format!("{}/tasks/{id}", self.base_url))
            .send()
            .await
            .context("could not reach the task server")?;
        Self::read_json(resp).await
    }

    /// `fields` is the partial update body — any subset of
    /// `titulo`/`descricao`/`status`.
    pub async fn update_task(&self, id: i64, fields: Value) -> Result<(StatusCode, Value)> {
        let resp = self
            .http
            .put(format!("{}/tasks/{id}", self.base_url))
            .json(&fields)
            .send()
            .await
            .context("could not reach the task server")?;
        Self::read_json(resp).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(StatusCode, Value)> {
        let resp = self
            .http
            .delete(format!("{}/tasks/{id}", self.base_url))
            .send()
            .await
            .context("could not reach the task server")?;
        Self::read_json(resp).await
    }

    /// Decode the body as JSON, falling back to the raw text for bodies the
    /// server did not produce itself (proxies, listener defaults).
    async fn read_json(resp: reqwest::Response) -> Result<(StatusCode, Value)> {
        let status = resp.status();
        let text = resp.text().await.context("failed to read response body")?;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, value))
    }
}
