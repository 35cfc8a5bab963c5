use serde_json::Value;

use crate::error::Result;
use crate::logic::path::set_path;
use crate::model::{GenerationRequest, MappingConfig, OverrideTarget, WorkflowGraph};

pub struct OverrideApplier;

impl OverrideApplier {
    /// Write every present request field into its mapped node and hand the
    /// graph back.
    ///
    /// The graph is taken by value: callers pass a clone obtained from the
    /// template store, never the template itself. A target whose node is not
    /// in the graph is skipped, since templates may leave out optional nodes.
    pub fn apply(
        mut graph: WorkflowGraph,
        request: &GenerationRequest,
        mapping: &MappingConfig,
    ) -> Result<WorkflowGraph> {
        let overrides: [(&str, &OverrideTarget, Option<Value>); 6] = [
            ("prompt", &mapping.prompt, Some(Value::from(request.prompt.as_str()))),
            (
                "negative_prompt",
                &mapping.negative_prompt,
                request.negative_prompt.as_deref().map(Value::from),
            ),
            ("width", &mapping.width, request.width.map(Value::from)),
            ("height", &mapping.height, request.height.map(Value::from)),
            ("seed", &mapping.seed, request.seed.clone().map(Value::Number)),
            ("steps", &mapping.steps, request.steps.map(Value::from)),
        ];

        for (field, target, value) in overrides {
            let Some(value) = value else {
                continue;
            };
            Self::apply_one(&mut graph, field, target, value)?;
        }

        Ok(graph)
    }

    fn apply_one(
        graph: &mut WorkflowGraph,
        field: &str,
        target: &OverrideTarget,
        value: Value,
    ) -> Result<()> {
        match graph.node_mut(&target.node_id) {
            Some(node) => {
                log::debug!(
                    "Setting {} on node {} at {}",
                    field,
                    target.node_id,
                    target.path
                );
                set_path(node, &target.path, value)?;
            }
            None => {
                log::warn!(
                    "Workflow node {} not found, skipping {} override at {}",
                    target.node_id,
                    field,
                    target.path
                );
            }
        }
        Ok(())
    }
}
