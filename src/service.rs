use serde_json::Value;

use crate::engine::{JobClient, RenderEngine};
use crate::error::Result;
use crate::logic::{OverrideApplier, ResultExtractor};
use crate::model::{GenerationRequest, GenerationResponse, MappingConfig};
use crate::store::TemplateStore;

/// One generation request end to end: validate, clone the template, apply
/// overrides, submit, wait, extract. Errors from any stage are returned as-is.
pub struct GenerationService<E> {
    templates: TemplateStore,
    mapping: MappingConfig,
    jobs: JobClient<E>,
    extractor: ResultExtractor,
}

impl<E: RenderEngine> GenerationService<E> {
    pub fn new(
        templates: TemplateStore,
        mapping: MappingConfig,
        jobs: JobClient<E>,
        extractor: ResultExtractor,
    ) -> Self {
        Self {
            templates,
            mapping,
            jobs,
            extractor,
        }
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Handle a raw event (`{"input": {...}}` or the fields directly).
    pub async fn handle(&self, event: &Value) -> Result<GenerationResponse> {
        let request = GenerationRequest::from_event(event)?;
        self.generate(&request).await
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let graph = self.templates.fresh_clone().await?;
        let graph = OverrideApplier::apply(graph, request, &self.mapping)?;

        let client_id = uuid::Uuid::new_v4().to_string();
        let handle = self.jobs.submit(&graph, &client_id).await?;
        let record = self.jobs.wait(&handle).await?;

        let images = self.extractor.extract(&record);
        log::info!(
            "Prompt {} produced {} image(s)",
            handle.prompt_id,
            images.len()
        );

        Ok(GenerationResponse {
            prompt_id: handle.prompt_id,
            images,
            raw_history: record.into_raw(),
        })
    }
}
