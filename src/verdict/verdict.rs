/// Verdict classification
///
/// `classify` is a pure function over the evidence gathered from one run:
/// the harness outcome record, whether the watchdog fired, how the
/// interpreter ended, and the captured streams.
use crate::config::types::{ErrorType, ASSERTION_FALLBACK_MESSAGE, TIMEOUT_MESSAGE};
use crate::protocol::response::ExecutionResult;
use log::warn;
use serde::Deserialize;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Status reported by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Passed,
    Syntax,
    Timeout,
    Assertion,
    Runtime,
}

/// Which snippet was executing when the outcome was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Code,
    Test,
}

/// Record the harness writes once both snippets finished or one raised
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutcomeRecord {
    pub status: OutcomeStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stage: Option<Stage>,
}

impl OutcomeRecord {
    /// Parse a record; garbage (the untrusted code can scribble on it) counts as no record.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Discarding malformed outcome record: {}", e);
                None
            }
        }
    }
}

/// How the interpreter process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    Unknown,
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            Termination::Exited(code)
        } else if let Some(sig) = status.signal() {
            Termination::Signaled(sig)
        } else {
            Termination::Unknown
        }
    }
}

impl Termination {
    fn describe(&self) -> String {
        match self {
            Termination::Exited(code) => format!("exited with status {}", code),
            Termination::Signaled(sig) => format!("was terminated by signal {}", sig),
            Termination::Unknown => "ended".to_string(),
        }
    }
}

/// Everything observed about one run
#[derive(Debug, Clone)]
pub struct Evidence {
    pub outcome: Option<OutcomeRecord>,
    pub timed_out: bool,
    pub termination: Termination,
    pub stdout: String,
    pub stderr: String,
}

pub struct VerdictClassifier;

impl VerdictClassifier {
    /// First match wins: syntax, timeout, assertion, runtime, then pass.
    pub fn classify(evidence: Evidence) -> ExecutionResult {
        let Evidence {
            outcome,
            timed_out,
            termination,
            stdout,
            stderr,
        } = evidence;

        let status = outcome.as_ref().map(|r| r.status);
        let message = outcome
            .and_then(|r| r.message)
            .filter(|m| !m.is_empty());

        match (status, timed_out) {
            (Some(OutcomeStatus::Syntax), _) => {
                ExecutionResult::fail(ErrorType::Syntax, message.unwrap_or_default(), stderr)
            }
            (_, true) => ExecutionResult::fail(ErrorType::Timeout, TIMEOUT_MESSAGE, stderr),
            (Some(OutcomeStatus::Timeout), false) => ExecutionResult::fail(
                ErrorType::Timeout,
                message.unwrap_or_else(|| TIMEOUT_MESSAGE.to_string()),
                stderr,
            ),
            (Some(OutcomeStatus::Assertion), false) => ExecutionResult::fail(
                ErrorType::Assertion,
                message.unwrap_or_else(|| ASSERTION_FALLBACK_MESSAGE.to_string()),
                stderr,
            ),
            (Some(OutcomeStatus::Runtime), false) => {
                ExecutionResult::fail(ErrorType::Runtime, message.unwrap_or_default(), stderr)
            }
            (None, false) => ExecutionResult::fail(
                ErrorType::Runtime,
                format!(
                    "Interpreter {} before reporting an outcome",
                    termination.describe()
                ),
                stderr,
            ),
            (Some(OutcomeStatus::Passed), false) if termination == Termination::Exited(0) => {
                ExecutionResult::pass(stdout, stderr)
            }
            (Some(OutcomeStatus::Passed), false) => ExecutionResult::fail(
                ErrorType::Runtime,
                format!(
                    "Interpreter {} after the test snippet completed",
                    termination.describe()
                ),
                stderr,
            ),
        }
    }
}
