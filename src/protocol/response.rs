use crate::config::types::{ErrorType, GradeError};
use serde::{Deserialize, Serialize};

/// Verdict for one code/test pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub passed: bool,
    pub error: Option<String>,
    pub error_type: Option<ErrorType>,
    /// Captured stdout; empty unless the run passed
    pub output: String,
    /// Captured stderr, kept whatever the outcome
    pub test_output: String,
}

impl ExecutionResult {
    pub fn pass(output: String, test_output: String) -> Self {
        Self {
            passed: true,
            error: None,
            error_type: None,
            output,
            test_output,
        }
    }

    pub fn fail(error_type: ErrorType, error: impl Into<String>, test_output: String) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
            error_type: Some(error_type),
            output: String::new(),
            test_output,
        }
    }
}

/// Driver-level failure. Carries no `output`/`test_output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverFailure {
    pub passed: bool,
    pub error: String,
    pub error_type: ErrorType,
}

impl From<&GradeError> for DriverFailure {
    fn from(err: &GradeError) -> Self {
        Self {
            passed: false,
            error: err.to_string(),
            error_type: err.kind(),
        }
    }
}

/// The single line written to stdout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Executed(ExecutionResult),
    Failed(DriverFailure),
}

impl Response {
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<crate::config::types::Result<ExecutionResult>> for Response {
    fn from(result: crate::config::types::Result<ExecutionResult>) -> Self {
        match result {
            Ok(result) => Response::Executed(result),
            Err(err) => Response::Failed(DriverFailure::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn as_value(response: &Response) -> Value {
        serde_json::from_str(&response.to_json_line().unwrap()).unwrap()
    }

    #[test]
    fn test_passed_result_serializes_nulls() {
        let response = Response::Executed(ExecutionResult::pass("hi\n".into(), String::new()));
        assert_eq!(
            as_value(&response),
            json!({
                "passed": true,
                "error": null,
                "error_type": null,
                "output": "hi\n",
                "test_output": ""
            })
        );
    }

    #[test]
    fn test_failed_result_has_empty_output() {
        let result = ExecutionResult::fail(ErrorType::Assertion, "bad x", "warn\n".into());
        let value = as_value(&Response::Executed(result));

        assert_eq!(value["passed"], json!(false));
        assert_eq!(value["error"], json!("bad x"));
        assert_eq!(value["error_type"], json!("assertion"));
        assert_eq!(value["output"], json!(""));
        assert_eq!(value["test_output"], json!("warn\n"));
    }

    #[test]
    fn test_driver_failure_omits_outputs() {
        let err = serde_json::from_str::<Value>("not json").unwrap_err();
        let response = Response::from(Err::<ExecutionResult, _>(GradeError::InvalidJson(err)));
        let value = as_value(&response);

        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(value["passed"], json!(false));
        assert_eq!(value["error_type"], json!("input"));
        let message = value["error"].as_str().unwrap();
        assert!(message.starts_with("Invalid JSON input: "));
        assert!(message.contains("line 1"));
    }

    #[test]
    fn test_executor_failure_message() {
        let response = Response::from(Err::<ExecutionResult, _>(GradeError::InvalidRequest(
            "expected a JSON object, got an array".into(),
        )));
        let value = as_value(&response);

        assert_eq!(value["error_type"], json!("executor"));
        assert_eq!(
            value["error"],
            json!("Invalid request: expected a JSON object, got an array")
        );
    }

    #[test]
    fn test_json_line_has_no_newlines() {
        let result = ExecutionResult::fail(
            ErrorType::Runtime,
            "Traceback (most recent call last):\n  ...\nZeroDivisionError: division by zero\n",
            String::new(),
        );
        let line = Response::Executed(result).to_json_line().unwrap();
        assert!(!line.contains('\n'));
    }
}
