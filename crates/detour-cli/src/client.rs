//! HTTP client for the detour API.

use anyhow::{bail, Context, Result};
use detour_core::{CreateBlockageRequest, Location, RouteResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::input::Endpoint;

#[derive(Debug, Serialize)]
struct PlanRequest<'a> {
    start: &'a Endpoint,
    end: &'a Endpoint,
    ignore_obstacles: bool,
}

/// Plan response as returned by `/v1/routes/plan`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanSummary {
    pub success: bool,
    pub start: Location,
    pub end: Location,
    #[serde(flatten)]
    pub route: RouteResult,
}

#[derive(Debug, Deserialize)]
struct CreatedBlockage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ClearResponse {
    removed: usize,
}

/// Client for a running detour server.
pub struct DetourClient {
    base_url: String,
    client: Client,
}

impl DetourClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a blockage, returning its ID.
    pub async fn add_blockage(&self, request: &CreateBlockageRequest) -> Result<String> {
        let url = format!("{}/v1/blockages", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send blockage")?;

        if !response.status().is_success() {
            bail!(
                "Failed to add blockage: {} {}",
                response.status(),
                error_text(response).await
            );
        }
        let created: CreatedBlockage = response.json().await?;
        Ok(created.id)
    }

    /// Remove every blockage, returning how many were removed.
    pub async fn clear_blockages(&self) -> Result<usize> {
        let url = format!("{}/v1/blockages", self.base_url);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .context("Failed to clear blockages")?;

        if !response.status().is_success() {
            bail!("Failed to clear blockages: {}", response.status());
        }
        let cleared: ClearResponse = response.json().await?;
        Ok(cleared.removed)
    }

    /// Request an avoidance route.
    pub async fn plan(
        &self,
        start: &Endpoint,
        end: &Endpoint,
        ignore_obstacles: bool,
    ) -> Result<PlanSummary> {
        let url = format!("{}/v1/routes/plan", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PlanRequest {
                start,
                end,
                ignore_obstacles,
            })
            .send()
            .await
            .context("Failed to request route")?;

        if !response.status().is_success() {
            bail!(
                "Route planning failed: {} {}",
                response.status(),
                error_text(response).await
            );
        }
        Ok(response.json().await?)
    }
}

/// Best-effort extraction of the server's error message.
async fn error_text(response: reqwest::Response) -> String {
    match response.json::<Value>().await {
        Ok(body) => body
            .get("message")
            .or_else(|| body.get("details"))
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Err(_) => String::new(),
    }
}
