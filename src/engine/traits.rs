use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{QueueResponse, WorkflowGraph};

/// Outcome of a single history query that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryResponse {
    /// The engine has not registered the prompt yet (HTTP 404).
    NotYetKnown,
    /// The full history body, keyed by prompt id.
    Found(Value),
}

/// Transport to a rendering engine.
#[async_trait::async_trait]
pub trait RenderEngine: Send + Sync {
    /// Queue a graph for execution. Attempted once; failures are `Submission`.
    async fn queue_prompt(&self, graph: &WorkflowGraph, client_id: &str) -> Result<QueueResponse>;
    /// Query the history of one prompt. Failures other than 404 are `PollTransport`.
    async fn fetch_history(&self, prompt_id: &str) -> Result<HistoryResponse>;
}

#[async_trait::async_trait]
impl<E: RenderEngine + ?Sized> RenderEngine for Arc<E> {
    async fn queue_prompt(&self, graph: &WorkflowGraph, client_id: &str) -> Result<QueueResponse> {
        (**self).queue_prompt(graph, client_id).await
    }

    async fn fetch_history(&self, prompt_id: &str) -> Result<HistoryResponse> {
        (**self).fetch_history(prompt_id).await
    }
}
