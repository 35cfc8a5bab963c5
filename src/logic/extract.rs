use reqwest::Url;
use serde_json::Value;

use crate::error::{RelayError, Result};
use crate::model::{ArtifactRef, JobRecord};

const DEFAULT_IMAGE_TYPE: &str = "output";

/// Turns a completed history record into `/view` URLs.
#[derive(Debug, Clone)]
pub struct ResultExtractor {
    view_url: Url,
}

impl ResultExtractor {
    pub fn new(base_url: &str) -> Result<Self> {
        let view = format!("{}/view", base_url.trim_end_matches('/'));
        let view_url = Url::parse(&view)
            .map_err(|e| RelayError::Config(format!("invalid engine base URL '{base_url}': {e}")))?;
        Ok(Self { view_url })
    }

    /// One artifact per image descriptor, in the record's own order.
    pub fn extract(&self, record: &JobRecord) -> Vec<ArtifactRef> {
        let mut artifacts = Vec::new();
        for (node_id, group) in record.outputs() {
            let Some(images) = group.get("images").and_then(Value::as_array) else {
                continue;
            };
            for image in images {
                if !image.is_object() {
                    log::warn!(
                        "Skipping malformed image descriptor in output {} of {}",
                        node_id,
                        record.prompt_id
                    );
                    continue;
                }
                artifacts.push(ArtifactRef {
                    url: self.view_url_for(image),
                    metadata: image.clone(),
                });
            }
        }
        artifacts
    }

    fn view_url_for(&self, image: &Value) -> String {
        let filename = string_field(image, "filename");
        let kind = match image.get("type") {
            None | Some(Value::Null) => Some(DEFAULT_IMAGE_TYPE),
            Some(_) => string_field(image, "type"),
        };
        let subfolder = string_field(image, "subfolder");

        let mut url = self.view_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in [("filename", filename), ("type", kind), ("subfolder", subfolder)] {
                if let Some(value) = value {
                    query.append_pair(key, value);
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url.to_string()
    }
}

/// Non-empty string value of `key`, if any.
fn string_field<'a>(image: &'a Value, key: &str) -> Option<&'a str> {
    image
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
