#![allow(dead_code)]

use comfy_relay::{
    GenerationService, HistoryResponse, JobClient, MappingConfig, QueueResponse, RelayError,
    RenderEngine, ResultExtractor, TemplateStore, WorkflowGraph,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const ENGINE_URL: &str = "http://engine.test:8188";

/// Five-node text-to-image template matching the default mapping.
pub fn sample_template() -> Value {
    json!({
        "4": {"class_type": "CheckpointLoaderSimple", "inputs": {"ckpt_name": "flux1-dev.safetensors"}},
        "9": {"class_type": "CLIPTextEncode", "inputs": {"text": "", "clip": ["4", 1]}},
        "10": {"class_type": "CLIPTextEncode", "inputs": {"text": "lowres, watermark", "clip": ["4", 1]}},
        "11": {"class_type": "EmptyLatentImage", "inputs": {"width": 1024, "height": 1024, "batch_size": 1}},
        "12": {"class_type": "KSampler", "inputs": {"seed": 0, "cfg": 1.0, "model": ["4", 0]}}
    })
}

pub fn completed_history(prompt_id: &str) -> Value {
    json!({
        prompt_id: {
            "prompt": [0, prompt_id, {}, {}, ["20"]],
            "outputs": {
                "20": {"images": [
                    {"filename": "ComfyUI_00001_.png", "subfolder": "", "type": "output"},
                    {"filename": "ComfyUI_00002_.png", "subfolder": "batch", "type": "output"}
                ]}
            },
            "status": {"status_str": "success", "completed": true}
        }
    })
}

/// In-process engine: records submissions and replays history responses,
/// repeating the last one once the script runs out.
pub struct FakeEngine {
    pub prompt_id: String,
    pub submissions: Mutex<Vec<(Value, String)>>,
    pub history: Mutex<VecDeque<HistoryResponse>>,
    pub history_calls: AtomicUsize,
    pub reject_submission: bool,
}

impl FakeEngine {
    pub fn new(history: Vec<HistoryResponse>) -> Self {
        Self {
            prompt_id: "prompt-123".to_string(),
            submissions: Mutex::new(Vec::new()),
            history: Mutex::new(history.into()),
            history_calls: AtomicUsize::new(0),
            reject_submission: false,
        }
    }

    pub fn completing_after(not_found: usize) -> Self {
        let mut script = vec![HistoryResponse::NotYetKnown; not_found];
        script.push(HistoryResponse::Found(completed_history("prompt-123")));
        Self::new(script)
    }

    pub fn calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn submitted_graph(&self) -> Option<Value> {
        self.submissions.lock().first().map(|(graph, _)| graph.clone())
    }
}

#[async_trait::async_trait]
impl RenderEngine for FakeEngine {
    async fn queue_prompt(
        &self,
        graph: &WorkflowGraph,
        client_id: &str,
    ) -> comfy_relay::Result<QueueResponse> {
        if self.reject_submission {
            return Err(RelayError::Submission {
                status: Some(400),
                detail: "invalid prompt".to_string(),
            });
        }
        self.submissions
            .lock()
            .push((graph.clone().into_value(), client_id.to_string()));
        Ok(QueueResponse {
            prompt_id: self.prompt_id.clone(),
            number: Some(1),
        })
    }

    async fn fetch_history(&self, _prompt_id: &str) -> comfy_relay::Result<HistoryResponse> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let mut history = self.history.lock();
        let next = if history.len() > 1 {
            history.pop_front()
        } else {
            history.front().cloned()
        };
        Ok(next.unwrap_or(HistoryResponse::NotYetKnown))
    }
}

pub fn service_with(
    engine: Arc<FakeEngine>,
    template: Value,
    poll_interval: Duration,
    timeout: Duration,
) -> GenerationService<Arc<FakeEngine>> {
    GenerationService::new(
        TemplateStore::preloaded(WorkflowGraph::from_value(template).unwrap()),
        MappingConfig::default(),
        JobClient::new(engine, poll_interval, timeout),
        ResultExtractor::new(ENGINE_URL).unwrap(),
    )
}
