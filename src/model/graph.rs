use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which some exported workflows nest their node table.
pub const NODES_KEY: &str = "nodes";

/// A rendering graph: node id -> node field mapping.
///
/// The node schema is owned by the engine, so nodes stay untyped JSON and are
/// addressed through dotted field paths. Documents shaped as
/// `{"nodes": {...}, ...}` are accepted too; node lookups then go through the
/// nested table while the whole document is what gets submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowGraph(Map<String, Value>);

impl WorkflowGraph {
    pub fn new(document: Map<String, Value>) -> Self {
        Self(document)
    }

    /// Accept any JSON value that is a mapping.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(format!(
                "expected a JSON object at the top level, found {}",
                json_type_name(&other)
            )),
        }
    }

    fn node_table(&self) -> &Map<String, Value> {
        match self.0.get(NODES_KEY) {
            Some(Value::Object(nodes)) => nodes,
            _ => &self.0,
        }
    }

    fn is_nested(&self) -> bool {
        matches!(self.0.get(NODES_KEY), Some(Value::Object(_)))
    }

    pub fn node(&self, id: &str) -> Option<&Value> {
        self.node_table().get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Value> {
        if self.is_nested() {
            self.0
                .get_mut(NODES_KEY)
                .and_then(Value::as_object_mut)
                .and_then(|nodes| nodes.get_mut(id))
        } else {
            self.0.get_mut(id)
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_table().len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
