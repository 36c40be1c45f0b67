use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::core::model::{RunState, RunSummary};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Thin typed wrapper over the ClarityAI backend HTTP surface. All analysis
/// logic lives server-side; this client only starts runs, re-fetches them and
/// relays interview answers.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
}

#[derive(Deserialize)]
struct RunCreated {
    run_id: String,
}

impl ApiClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            api_base,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// POST /analysis/run — submit an idea, get back the run id.
    pub async fn start_analysis(&self, idea: &str) -> Result<String> {
        let url = format!("{}/analysis/run", self.api_base);
        let payload = serde_json::json!({ "idea": idea });
        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", self.api_base))?;
        let res = ensure_ok(res).await?;
        let created: RunCreated = res
            .json()
            .await
            .context("Backend returned an unexpected start-analysis response")?;
        debug!(run_id = %created.run_id, "analysis started");
        Ok(created.run_id)
    }

    /// GET /analysis/{run_id} — the full run snapshot.
    pub async fn get_run(&self, run_id: &str) -> Result<RunState> {
        let url = format!("{}/analysis/{}", self.api_base, run_id);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", self.api_base))?;
        let res = ensure_ok(res).await?;
        res.json()
            .await
            .with_context(|| format!("Backend returned an unreadable run state for {}", run_id))
    }

    /// GET /analysis — summaries of recent runs, in backend order.
    pub async fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let url = format!("{}/analysis", self.api_base);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", self.api_base))?;
        let res = ensure_ok(res).await?;
        res.json()
            .await
            .context("Backend returned an unreadable run list")
    }

    /// POST /analysis/{run_id}/feedback — relay interview answers and resume
    /// the pipeline. An empty map is a valid (skipped) submission.
    pub async fn submit_feedback(
        &self,
        run_id: &str,
        answers: &HashMap<String, String>,
    ) -> Result<()> {
        let url = format!("{}/analysis/{}/feedback", self.api_base, run_id);
        let payload = serde_json::json!({ "answers": answers });
        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", self.api_base))?;
        ensure_ok(res).await?;
        Ok(())
    }

    /// The markdown-export endpoint for a completed run. Never fetched here;
    /// handed to the browser so the download happens outside the client.
    pub fn export_markdown_url(&self, run_id: &str) -> String {
        format!("{}/analysis/{}/export.md", self.api_base, run_id)
    }
}

async fn ensure_ok(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let detail = body.trim();
    if detail.is_empty() {
        bail!("Backend request failed with status {}", status.as_u16());
    }
    bail!(
        "Backend request failed with status {}: {}",
        status.as_u16(),
        detail
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_url_targets_the_markdown_endpoint() {
        let api = ApiClient::new("http://127.0.0.1:8000/");
        assert_eq!(
            api.export_markdown_url("abc123"),
            "http://127.0.0.1:8000/analysis/abc123/export.md"
        );
    }

    #[test]
    fn trailing_slashes_are_normalised() {
        let api = ApiClient::new("http://localhost:9999///");
        assert_eq!(api.api_base(), "http://localhost:9999");
    }
}
