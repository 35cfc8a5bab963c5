use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifies one submission: engine-assigned prompt id plus our client id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub prompt_id: String,
    pub client_id: String,
    /// Queue position reported by the engine, when it reports one.
    pub queue_number: Option<u64>,
}

/// Body of a successful `/prompt` call.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueResponse {
    pub prompt_id: String,
    #[serde(default)]
    pub number: Option<u64>,
}

/// A completed history entry for one prompt id.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub prompt_id: String,
    entry: Map<String, Value>,
}

impl JobRecord {
    /// Build a record from a history entry if it carries populated outputs.
    pub fn from_entry(prompt_id: &str, entry: &Value) -> Option<Self> {
        let entry = entry.as_object()?;
        let populated = matches!(
            entry.get("outputs"),
            Some(Value::Object(outputs)) if !outputs.is_empty()
        );
        populated.then(|| Self {
            prompt_id: prompt_id.to_string(),
            entry: entry.clone(),
        })
    }

    /// Output groups keyed by node id, in the engine's order.
    pub fn outputs(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entry
            .get("outputs")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|outputs| outputs.iter())
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.entry
    }

    pub fn into_raw(self) -> Value {
        Value::Object(self.entry)
    }
}

/// One produced image, resolved to a `/view` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub url: String,
    pub metadata: Value,
}

/// What the handler returns to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub prompt_id: String,
    pub images: Vec<ArtifactRef>,
    pub raw_history: Value,
}
