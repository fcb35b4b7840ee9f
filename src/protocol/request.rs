use crate::config::types::{GradeError, Result};
use serde_json::{Map, Value};
use std::io::Read;

/// One code/test pair to evaluate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Candidate program source
    pub code: String,
    /// Test snippet run in the same namespace after `code`
    pub test: String,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            test: test.into(),
        }
    }

    /// Read the whole stream, then parse it as a request
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Self::from_json(&input)
    }

    /// Parse a request document.
    ///
    /// Malformed JSON is an `InvalidJson` error; well-formed JSON of the wrong
    /// shape is an `InvalidRequest` error. Missing fields default to "".
    pub fn from_json(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input).map_err(GradeError::InvalidJson)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(GradeError::InvalidRequest(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        Ok(Self {
            code: take_string(&mut fields, "code")?,
            test: take_string(&mut fields, "test")?,
        })
    }
}

fn take_string(fields: &mut Map<String, Value>, name: &str) -> Result<String> {
    match fields.remove(name) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(GradeError::InvalidRequest(format!(
            "field '{}' must be a string, got {}",
            name,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ErrorType;

    #[test]
    fn test_parses_both_fields() {
        let req =
            ExecutionRequest::from_json(r#"{"code": "x = 1", "test": "assert x == 1"}"#).unwrap();
        assert_eq!(req, ExecutionRequest::new("x = 1", "assert x == 1"));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        assert_eq!(
            ExecutionRequest::from_json("{}").unwrap(),
            ExecutionRequest::default()
        );
        assert_eq!(
            ExecutionRequest::from_json(r#"{"code": "print(1)"}"#).unwrap(),
            ExecutionRequest::new("print(1)", "")
        );
    }

    #[test]
    fn test_extra_fields_ignored() {
        let req = ExecutionRequest::from_json(r#"{"code": "", "test": "", "task_id": 7}"#).unwrap();
        assert_eq!(req, ExecutionRequest::default());
    }

    #[test]
    fn test_malformed_json_is_input_error() {
        let err = ExecutionRequest::from_json("not json").unwrap_err();
        assert!(matches!(err, GradeError::InvalidJson(_)));
        assert_eq!(err.kind(), ErrorType::Input);
        assert!(err.to_string().starts_with("Invalid JSON input: "));
    }

    #[test]
    fn test_empty_input_is_input_error() {
        let err = ExecutionRequest::from_json("").unwrap_err();
        assert_eq!(err.kind(), ErrorType::Input);
    }

    #[test]
    fn test_non_object_is_executor_error() {
        let err = ExecutionRequest::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, GradeError::InvalidRequest(_)));
        assert_eq!(err.kind(), ErrorType::Executor);
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_non_string_field_is_executor_error() {
        let err = ExecutionRequest::from_json(r#"{"code": 5}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorType::Executor);
        assert!(err.to_string().contains("'code' must be a string"));

        let err = ExecutionRequest::from_json(r#"{"test": null}"#).unwrap_err();
        assert!(err.to_string().contains("'test' must be a string, got null"));
    }

    #[test]
    fn test_read_from_stream() {
        let input = br#"{"code": "print('hi')"}"#;
        let req = ExecutionRequest::read_from(&input[..]).unwrap();
        assert_eq!(req.code, "print('hi')");
    }

    #[test]
    fn test_read_from_invalid_utf8_is_io_error() {
        let input: &[u8] = &[b'{', 0xff, b'}'];
        let err = ExecutionRequest::read_from(input).unwrap_err();
        assert!(matches!(err, GradeError::Io(_)));
        assert_eq!(err.kind(), ErrorType::Executor);
    }
}
