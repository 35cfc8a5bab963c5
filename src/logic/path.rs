use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::graph::json_type_name;

pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("field path is empty or has an empty segment: '{0}'")]
    InvalidPath(String),
    #[error("target node is a {found}, not a mapping")]
    NodeNotMapping { found: &'static str },
    #[error("segment '{segment}' of '{path}' holds a {found}, not a mapping")]
    NotMapping {
        path: String,
        segment: String,
        found: &'static str,
    },
}

/// Set `value` at the dotted `path` inside `node`.
///
/// Missing intermediate segments are created as empty mappings; existing ones
/// are descended into. The final segment is overwritten whatever it held.
/// An existing intermediate segment that is not a mapping is an error, and
/// the node is left untouched when any error is returned.
pub fn set_path(node: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if path.is_empty() || segments.iter().any(|segment| segment.is_empty()) {
        return Err(PathError::InvalidPath(path.to_string()));
    }
    let found = json_type_name(node);
    let Value::Object(root) = node else {
        return Err(PathError::NodeNotMapping { found });
    };
    check_intermediates(root, path, &segments)?;

    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| PathError::InvalidPath(path.to_string()))?;
    let mut cursor = root;
    for segment in parents {
        let entry = cursor
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        cursor = match entry {
            Value::Object(next) => next,
            other => {
                return Err(PathError::NotMapping {
                    path: path.to_string(),
                    segment: segment.to_string(),
                    found: json_type_name(other),
                })
            }
        };
    }
    cursor.insert(last.to_string(), value);
    Ok(())
}

/// Read-only pass so a collision is reported before anything is created.
fn check_intermediates(
    root: &Map<String, Value>,
    path: &str,
    segments: &[&str],
) -> Result<(), PathError> {
    let mut cursor = root;
    for segment in &segments[..segments.len() - 1] {
        match cursor.get(*segment) {
            None => return Ok(()),
            Some(Value::Object(next)) => cursor = next,
            Some(other) => {
                return Err(PathError::NotMapping {
                    path: path.to_string(),
                    segment: segment.to_string(),
                    found: json_type_name(other),
                })
            }
        }
    }
    Ok(())
}

/// Read the value at a dotted path, if every segment resolves.
pub fn get_path<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(PATH_SEPARATOR)
        .try_fold(node, |cursor, segment| cursor.as_object()?.get(segment))
}
