use crate::config::types::Result;
use crate::safety::workspace::Workspace;
use std::ffi::OsString;
use std::path::Path;

/// Interpreter adapter contract: how to stage and launch one code/test pair.
pub trait InterpreterAdapter: Send + Sync {
    fn language(&self) -> &'static str;
    /// Write the harness and both snippets into the workspace
    fn prepare(&self, workspace: &Workspace, code: &str, test: &str) -> Result<()>;
    /// Full argv, interpreter first
    fn command(&self, interpreter: &Path, workspace: &Workspace) -> Vec<OsString>;
    /// Workspace file the harness writes its outcome record to
    fn outcome_file(&self) -> &'static str;
}
