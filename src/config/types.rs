/// Core types shared across the gradebox executor
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Fixed message reported when the watchdog kills a run.
pub const TIMEOUT_MESSAGE: &str = "Execution timed out";

/// Fallback message for assertions raised without a message.
pub const ASSERTION_FALLBACK_MESSAGE: &str = "Assertion failed";

/// Default wall-clock budget for one code/test pair.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error classification tag carried in every failed response.
///
/// The first four variants come from the Executor path and are listed in
/// classification priority order; `Input` and `Executor` are produced only by
/// the request/response driver.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Syntax,
    Timeout,
    Assertion,
    Runtime,
    Input,
    Executor,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Syntax => "syntax",
            ErrorType::Timeout => "timeout",
            ErrorType::Assertion => "assertion",
            ErrorType::Runtime => "runtime",
            ErrorType::Input => "input",
            ErrorType::Executor => "executor",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integrity of one captured output stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputIntegrity {
    #[default]
    Complete,
    /// Stream exceeded its byte limit, or its reader was abandoned after the grace period
    Truncated,
    ReadError,
}

impl std::fmt::Display for OutputIntegrity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputIntegrity::Complete => write!(f, "complete"),
            OutputIntegrity::Truncated => write!(f, "truncated"),
            OutputIntegrity::ReadError => write!(f, "read_error"),
        }
    }
}

/// Errors raised outside the sandboxed code itself.
///
/// Failures of the candidate or test code never surface here; they are
/// classified into an `ExecutionResult` instead.
#[derive(Error, Debug)]
pub enum GradeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON input: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Execution interrupted by signal {0}")]
    Interrupted(i32),
}

impl GradeError {
    /// Driver-level tag for this error.
    pub fn kind(&self) -> ErrorType {
        match self {
            GradeError::InvalidJson(_) => ErrorType::Input,
            _ => ErrorType::Executor,
        }
    }
}

pub type Result<T> = std::result::Result<T, GradeError>;
