// Opaque stored sample: any non-empty JSON object, kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(Map<String, Value>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("Stats payload must be a non-empty JSON object")]
    NotAnObject,
    #[error("Stats payload must be a non-empty JSON object")]
    Empty,
}

impl Sample {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `timestamp` field when it is a non-empty string.
    pub fn timestamp(&self) -> Option<&str> {
        self.0
            .get("timestamp")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for Sample {
    type Error = SampleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) if map.is_empty() => Err(SampleError::Empty),
            Value::Object(map) => Ok(Sample(map)),
            _ => Err(SampleError::NotAnObject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_objects_and_empty_object() {
        assert_eq!(Sample::try_from(json!({})), Err(SampleError::Empty));
        assert_eq!(Sample::try_from(json!([1, 2])), Err(SampleError::NotAnObject));
        assert_eq!(Sample::try_from(json!(null)), Err(SampleError::NotAnObject));
        assert_eq!(Sample::try_from(json!("x")), Err(SampleError::NotAnObject));
    }

    #[test]
    fn timestamp_requires_non_empty_string() {
        let s = Sample::try_from(json!({ "timestamp": "2024-01-01T00:00:00Z" })).unwrap();
        assert_eq!(s.timestamp(), Some("2024-01-01T00:00:00Z"));
        let s = Sample::try_from(json!({ "timestamp": "" })).unwrap();
        assert_eq!(s.timestamp(), None);
        let s = Sample::try_from(json!({ "timestamp": 12 })).unwrap();
        assert_eq!(s.timestamp(), None);
    }

    #[test]
    fn reencoding_keeps_field_order() {
        let raw = r#"{"zeta":1,"alpha":{"b":2,"a":1},"mid":null}"#;
        let value: Value = serde_json::from_str(raw).unwrap();
        let sample = Sample::try_from(value).unwrap();
        assert_eq!(serde_json::to_string(&sample).unwrap(), raw);
    }
}
