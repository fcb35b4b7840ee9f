use crate::config::types::Result;
use crate::judge::adapter::InterpreterAdapter;
use crate::safety::workspace::Workspace;
use std::ffi::OsString;
use std::path::Path;

const HARNESS_SOURCE: &str = include_str!("python_harness.py");

const HARNESS_FILE: &str = "harness.py";
const CANDIDATE_FILE: &str = "candidate.py";
const TEST_FILE: &str = "test.py";
const OUTCOME_FILE: &str = "outcome.json";

#[derive(Debug, Clone, Default)]
pub struct PythonAdapter;

impl InterpreterAdapter for PythonAdapter {
    fn language(&self) -> &'static str {
        "python"
    }

    fn prepare(&self, workspace: &Workspace, code: &str, test: &str) -> Result<()> {
        workspace.write_file(HARNESS_FILE, HARNESS_SOURCE.as_bytes())?;
        workspace.write_file(CANDIDATE_FILE, code.as_bytes())?;
        workspace.write_file(TEST_FILE, test.as_bytes())?;
        Ok(())
    }

    fn command(&self, interpreter: &Path, workspace: &Workspace) -> Vec<OsString> {
        // -I ignores PYTHON* variables and the user site; -X utf8 fixes stream encoding.
        let mut argv: Vec<OsString> = vec![
            interpreter.as_os_str().to_owned(),
            "-I".into(),
            "-B".into(),
            "-u".into(),
            "-X".into(),
            "utf8".into(),
        ];
        for name in [HARNESS_FILE, CANDIDATE_FILE, TEST_FILE, OUTCOME_FILE] {
            argv.push(workspace.path(name).into_os_string());
        }
        argv
    }

    fn outcome_file(&self) -> &'static str {
        OUTCOME_FILE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_stages_all_files() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path()).unwrap();

        PythonAdapter
            .prepare(&workspace, "x = 1", "assert x == 1")
            .unwrap();

        assert_eq!(
            workspace.read_file(CANDIDATE_FILE).unwrap().as_deref(),
            Some("x = 1")
        );
        assert_eq!(
            workspace.read_file(TEST_FILE).unwrap().as_deref(),
            Some("assert x == 1")
        );
        let harness = workspace.read_file(HARNESS_FILE).unwrap().unwrap();
        assert!(harness.contains("\"__builtins__\": builtins"));
    }

    #[test]
    fn test_command_layout() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path()).unwrap();

        let argv = PythonAdapter.command(Path::new("/usr/bin/python3"), &workspace);

        assert_eq!(argv[0], OsString::from("/usr/bin/python3"));
        assert_eq!(
            &argv[1..6],
            &["-I", "-B", "-u", "-X", "utf8"].map(OsString::from)
        );
        assert_eq!(argv[6], workspace.path(HARNESS_FILE).into_os_string());
        assert_eq!(argv[9], workspace.path(OUTCOME_FILE).into_os_string());
        assert_eq!(argv.len(), 10);
    }
}
