use serde::{Deserialize, Serialize};

use crate::logic::path::PATH_SEPARATOR;

/// Where a single override lands: a node id plus a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTarget {
    pub node_id: String,
    pub path: String,
}

impl OverrideTarget {
    pub fn new(node_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            path: path.into(),
        }
    }

    /// Reject targets the path mutator could never apply.
    pub fn validate(&self, field: &str) -> Result<(), String> {
        if self.node_id.trim().is_empty() {
            return Err(format!("mapping.{field}.node_id must not be empty"));
        }
        if self.path.is_empty() || self.path.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(format!(
                "mapping.{field}.path '{}' must be a non-empty dotted path",
                self.path
            ));
        }
        Ok(())
    }
}

/// The six override targets of a text-to-image template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub prompt: OverrideTarget,
    pub negative_prompt: OverrideTarget,
    pub width: OverrideTarget,
    pub height: OverrideTarget,
    pub seed: OverrideTarget,
    pub steps: OverrideTarget,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            prompt: OverrideTarget::new("9", "inputs.text"),
            negative_prompt: OverrideTarget::new("10", "inputs.text"),
            width: OverrideTarget::new("11", "inputs.width"),
            height: OverrideTarget::new("11", "inputs.height"),
            seed: OverrideTarget::new("12", "inputs.seed"),
            steps: OverrideTarget::new("13", "inputs.steps"),
        }
    }
}

impl MappingConfig {
    /// Named targets in application order.
    pub fn targets(&self) -> [(&'static str, &OverrideTarget); 6] {
        [
            ("prompt", &self.prompt),
            ("negative_prompt", &self.negative_prompt),
            ("width", &self.width),
            ("height", &self.height),
            ("seed", &self.seed),
            ("steps", &self.steps),
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        for (field, target) in self.targets() {
            target.validate(field)?;
        }
        Ok(())
    }
}
