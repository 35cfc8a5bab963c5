use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{RelayError, Result};
use crate::model::graph::json_type_name;

pub const DEFAULT_DIMENSION: i64 = 1024;

/// A validated text-to-image request.
///
/// `None` means "leave the template value alone". `Some(0)` and `Some("")`
/// are real overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Engine seeds span the whole `u64` range, so the number is kept as given.
    pub seed: Option<Number>,
    pub steps: Option<i64>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            width: Some(DEFAULT_DIMENSION),
            height: Some(DEFAULT_DIMENSION),
            seed: None,
            steps: None,
        }
    }

    /// Validate a handler event. The fields may sit at the top level or under
    /// an `input` key.
    pub fn from_event(event: &Value) -> Result<Self> {
        let payload = match event.get("input") {
            Some(input) => input,
            None => event,
        };
        let fields = payload.as_object().ok_or_else(|| {
            RelayError::Validation(format!(
                "request payload must be an object, found {}",
                json_type_name(payload)
            ))
        })?;

        let prompt = match present(fields, "prompt") {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(Value::String(_)) | None => {
                return Err(RelayError::Validation("missing 'prompt'".to_string()))
            }
            Some(other) => {
                return Err(RelayError::Validation(format!(
                    "'prompt' must be a string, found {}",
                    json_type_name(other)
                )))
            }
        };

        let negative_prompt = match present(fields, "negative_prompt") {
            None => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                return Err(RelayError::Validation(format!(
                    "'negative_prompt' must be a string, found {}",
                    json_type_name(other)
                )))
            }
        };

        Ok(Self {
            prompt,
            negative_prompt,
            width: Some(integer_field(fields, "width")?.unwrap_or(DEFAULT_DIMENSION)),
            height: Some(integer_field(fields, "height")?.unwrap_or(DEFAULT_DIMENSION)),
            seed: number_field(fields, "seed")?,
            steps: integer_field(fields, "steps")?,
        })
    }
}

/// A key holding `null` counts as absent.
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn integer_field(fields: &Map<String, Value>, key: &str) -> Result<Option<i64>> {
    let Some(number) = number_field(fields, key)? else {
        return Ok(None);
    };
    number
        .as_i64()
        .map(Some)
        .ok_or_else(|| RelayError::Validation(format!("'{key}' is out of range, got {number}")))
}

fn number_field(fields: &Map<String, Value>, key: &str) -> Result<Option<Number>> {
    let Some(value) = present(fields, key) else {
        return Ok(None);
    };
    coerce_integer(value)
        .map(Some)
        .ok_or_else(|| RelayError::Validation(format!("'{key}' must be an integer, got {value}")))
}

/// Integers in the `i64` or `u64` range, finite floats (truncated toward
/// zero) and integer strings. A string with a fraction is not an integer.
fn coerce_integer(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(number.clone()),
        Value::Number(number) => float_to_i64(number.as_f64()?).map(Number::from),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .map(Number::from)
                .or_else(|_| text.parse::<u64>().map(Number::from))
                .ok()
        }
        _ => None,
    }
}

fn float_to_i64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_event_is_rejected() {
        let err = GenerationRequest::from_event(&json!({})).unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));

        let err = GenerationRequest::from_event(&json!({"input": {"prompt": ""}})).unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }

    #[test]
    fn test_input_key_is_unwrapped() {
        let nested = GenerationRequest::from_event(&json!({"input": {"prompt": "a cat"}})).unwrap();
        let flat = GenerationRequest::from_event(&json!({"prompt": "a cat"})).unwrap();
        assert_eq!(nested, flat);
        assert_eq!(nested, GenerationRequest::new("a cat"));
    }

    #[test]
    fn test_dimensions_default_and_coerce() {
        let request = GenerationRequest::from_event(&json!({
            "prompt": "a cat",
            "width": "512",
            "height": 768.0,
            "seed": 0,
            "steps": " 20 "
        }))
        .unwrap();
        assert_eq!(request.width, Some(512));
        assert_eq!(request.height, Some(768));
        assert_eq!(request.seed, Some(Number::from(0)));
        assert_eq!(request.steps, Some(20));
        assert_eq!(request.negative_prompt, None);
    }

    #[test]
    fn test_float_input_truncates() {
        let request =
            GenerationRequest::from_event(&json!({"prompt": "x", "seed": 7.9, "steps": -3.5}))
                .unwrap();
        assert_eq!(request.seed, Some(Number::from(7)));
        assert_eq!(request.steps, Some(-3));
    }

    #[test]
    fn test_fractional_strings_are_rejected() {
        for (key, text) in [("steps", "7.9"), ("seed", "-3.5"), ("width", "1e3")] {
            let mut event = json!({"prompt": "x"});
            event[key] = json!(text);
            match GenerationRequest::from_event(&event).unwrap_err() {
                RelayError::Validation(message) => assert!(message.contains(key), "{message}"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_seed_accepts_full_u64_range() {
        let request =
            GenerationRequest::from_event(&json!({"prompt": "x", "seed": 18446744073709551615u64}))
                .unwrap();
        assert_eq!(request.seed, Some(Number::from(u64::MAX)));

        let request =
            GenerationRequest::from_event(&json!({"prompt": "x", "seed": "18446744073709551615"}))
                .unwrap();
        assert_eq!(request.seed, Some(Number::from(u64::MAX)));

        let request = GenerationRequest::from_event(&json!({"prompt": "x", "seed": -1})).unwrap();
        assert_eq!(request.seed, Some(Number::from(-1)));
    }

    #[test]
    fn test_dimensions_stay_in_i64_range() {
        let err = GenerationRequest::from_event(&json!({"prompt": "x", "width": u64::MAX}))
            .unwrap_err();
        match err {
            RelayError::Validation(message) => assert!(message.contains("out of range"), "{message}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_fields_are_rejected() {
        for (key, value) in [
            ("width", json!("wide")),
            ("height", json!(true)),
            ("seed", json!({"value": 1})),
            ("steps", json!("NaN")),
        ] {
            let mut event = json!({"prompt": "x"});
            event[key] = value;
            let err = GenerationRequest::from_event(&event).unwrap_err();
            match err {
                RelayError::Validation(message) => assert!(message.contains(key), "{message}"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_null_fields_count_as_absent() {
        let request = GenerationRequest::from_event(&json!({
            "prompt": "x",
            "negative_prompt": null,
            "seed": null,
            "width": null
        }))
        .unwrap();
        assert_eq!(request.seed, None);
        assert_eq!(request.negative_prompt, None);
        assert_eq!(request.width, Some(DEFAULT_DIMENSION));
    }

    #[test]
    fn test_empty_negative_prompt_is_kept() {
        let request =
            GenerationRequest::from_event(&json!({"prompt": "x", "negative_prompt": ""})).unwrap();
        assert_eq!(request.negative_prompt, Some(String::new()));
    }

    #[test]
    fn test_non_string_prompt_is_rejected() {
        let err = GenerationRequest::from_event(&json!({"prompt": 42})).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }
}
