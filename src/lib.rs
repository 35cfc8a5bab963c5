pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod logic;
pub mod model;
pub mod service;
pub mod store;

pub use api::routes;
pub use engine::{HistoryResponse, HttpEngine, JobClient, JobState, PollOutcome, RenderEngine};
pub use error::{RelayError, Result};
pub use logic::{get_path, set_path, OverrideApplier, PathError, ResultExtractor};
pub use model::*;
pub use service::GenerationService;
pub use store::TemplateStore;

use crate::config::AppConfig;

/// Wire the HTTP engine client, template store and extractor from configuration.
pub fn build_service(config: &AppConfig) -> anyhow::Result<GenerationService<HttpEngine>> {
    let engine = HttpEngine::new(&config.engine.base_url, config.engine.request_timeout())?;
    let jobs = JobClient::new(engine, config.engine.poll_interval(), config.engine.timeout());
    let extractor = ResultExtractor::new(&config.engine.base_url)?;
    let templates = TemplateStore::new(&config.template.path);

    Ok(GenerationService::new(
        templates,
        config.mapping.clone(),
        jobs,
        extractor,
    ))
}
