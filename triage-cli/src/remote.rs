//! Client for a running triage server.

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{AnalyzeResponse, SuggestResponse};

#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Submit an analyze request body; the server caches it as the latest batch.
    pub async fn analyze(&self, body: &Value) -> Result<AnalyzeResponse> {
        let resp = self
            .client
            .post(format!("{}/api/tasks/analyze/", self.base_url))
            .json(body)
            .send()
            .await
            .context("analyze request")?;
        read_json(resp).await
    }

    pub async fn suggest(
        &self,
        limit: Option<i64>,
        strategy: Option<&str>,
    ) -> Result<SuggestResponse> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(strategy) = strategy {
            query.push(("strategy", strategy.to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/api/tasks/suggest/", self.base_url))
            .query(&query)
            .send()
            .await
            .context("suggest request")?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("server error: {status} {txt}");
    }
    resp.json().await.context("parse server response")
}
