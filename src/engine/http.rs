use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use crate::engine::traits::{HistoryResponse, RenderEngine};
use crate::error::{RelayError, Result};
use crate::model::{QueueResponse, WorkflowGraph};

/// `RenderEngine` over the engine's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    base_url: String,
}

impl HttpEngine {
    /// Create a client for `base_url`; every call is bounded by `request_timeout`.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RenderEngine for HttpEngine {
    async fn queue_prompt(&self, graph: &WorkflowGraph, client_id: &str) -> Result<QueueResponse> {
        let submission_error = |status: Option<StatusCode>, detail: String| RelayError::Submission {
            status: status.map(|s| s.as_u16()),
            detail,
        };

        let response = self
            .client
            .post(format!("{}/prompt", self.base_url))
            .json(&json!({ "prompt": graph, "client_id": client_id }))
            .send()
            .await
            .map_err(|e| submission_error(e.status(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body(response).await;
            return Err(submission_error(Some(status), body));
        }

        response
            .json::<QueueResponse>()
            .await
            .map_err(|e| {
                submission_error(Some(status), format!("unexpected /prompt response: {e}"))
            })
    }

    async fn fetch_history(&self, prompt_id: &str) -> Result<HistoryResponse> {
        let transport_error =
            |status: Option<StatusCode>, detail: String| RelayError::PollTransport {
                status: status.map(|s| s.as_u16()),
                detail,
            };

        let response = self
            .client
            .get(format!("{}/history/{}", self.base_url, prompt_id))
            .send()
            .await
            .map_err(|e| transport_error(e.status(), e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(HistoryResponse::NotYetKnown);
        }
        if !status.is_success() {
            let body = read_body(response).await;
            return Err(transport_error(Some(status), body));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| {
                transport_error(Some(status), format!("unexpected /history response: {e}"))
            })?;
        Ok(HistoryResponse::Found(body))
    }
}

/// Error bodies are best effort; an unreadable body becomes an empty detail.
async fn read_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            log::warn!("Could not read engine error body: {}", e);
            String::new()
        }
    }
}
