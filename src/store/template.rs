use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

use crate::error::{RelayError, Result};
use crate::model::WorkflowGraph;

/// Process-wide owner of the workflow template.
///
/// The file is read on first use only. Concurrent first callers wait on the
/// same initialization; afterwards reads are lock-free. A failed load is not
/// cached, so the next request retries it. Callers never get the template
/// itself mutably, only clones.
#[derive(Debug)]
pub struct TemplateStore {
    path: PathBuf,
    template: OnceCell<WorkflowGraph>,
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template: OnceCell::new(),
        }
    }

    /// A store that is already populated and never touches storage.
    pub fn preloaded(graph: WorkflowGraph) -> Self {
        Self {
            path: PathBuf::from("<memory>"),
            template: OnceCell::new_with(Some(graph)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.template.initialized()
    }

    /// The cached template, loading it on first call.
    pub async fn load(&self) -> Result<&WorkflowGraph> {
        self.template
            .get_or_try_init(|| read_template(&self.path))
            .await
    }

    /// A deep copy of the template that the caller owns outright.
    pub async fn fresh_clone(&self) -> Result<WorkflowGraph> {
        let template = self.load().await?;
        Ok(template.clone())
    }
}

async fn read_template(path: &Path) -> Result<WorkflowGraph> {
    let load_error = |reason: String| RelayError::Load {
        path: path.display().to_string(),
        reason,
    };

    log::info!("Loading workflow template from {}", path.display());
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| load_error(e.to_string()))?;
    let document: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| load_error(format!("invalid JSON: {e}")))?;
    let graph = WorkflowGraph::from_value(document).map_err(load_error)?;
    log::info!("Workflow template loaded with {} nodes", graph.node_count());
    Ok(graph)
}
