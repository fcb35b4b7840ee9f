/// Run-scoped workspace holding the harness, sources, and outcome record
use crate::config::types::{GradeError, Result};
use log::{debug, warn};
use std::fs;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Workspace directory for one execution, removed on drop
pub struct Workspace {
    /// Unique run ID
    run_id: String,
    /// Run-specific workspace directory
    run_dir: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Create a fresh owner-only directory under `root`
    pub fn new(root: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let run_dir = root.join(format!("gradebox-{}", run_id));

        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(&run_dir)
            .map_err(|e| {
                GradeError::Workspace(format!(
                    "Failed to create workspace directory {}: {}",
                    run_dir.display(),
                    e
                ))
            })?;
        // The interpreter may chdir; every path handed to it must be absolute.
        let run_dir = fs::canonicalize(&run_dir).map_err(|e| {
            GradeError::Workspace(format!(
                "Failed to resolve workspace directory {}: {}",
                run_dir.display(),
                e
            ))
        })?;

        debug!("Created workspace {} for run {}", run_dir.display(), run_id);
        Ok(Self {
            run_id,
            run_dir,
            cleaned: false,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Path of a file inside the workspace
    pub fn path(&self, name: &str) -> PathBuf {
        self.run_dir.join(name)
    }

    /// Write a file into the workspace and return its path
    pub fn write_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path(name);
        fs::write(&path, content).map_err(|e| {
            GradeError::Workspace(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    /// Read a workspace file if it exists
    pub fn read_file(&self, name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(name)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GradeError::Workspace(format!(
                "Failed to read {}: {}",
                self.path(name).display(),
                e
            ))),
        }
    }

    /// Remove the workspace directory (idempotent)
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned {
            return Ok(());
        }

        match fs::remove_dir_all(&self.run_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(GradeError::Workspace(format!(
                    "Failed to remove workspace {}: {}",
                    self.run_dir.display(),
                    e
                )))
            }
        }

        self.cleaned = true;
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_workspace_creation_is_owner_only() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path()).unwrap();

        assert!(workspace.run_dir().is_dir());
        assert!(workspace.run_dir().is_absolute());
        assert!(workspace
            .run_dir()
            .starts_with(fs::canonicalize(root.path()).unwrap()));
        let mode = fs::metadata(workspace.run_dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_run_ids_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::new(root.path()).unwrap();
        let b = Workspace::new(root.path()).unwrap();

        assert_ne!(a.run_id(), b.run_id());
        assert_ne!(a.run_dir(), b.run_dir());
    }

    #[test]
    fn test_write_and_read_file() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(root.path()).unwrap();

        let path = workspace.write_file("candidate.py", b"x = 1\n").unwrap();
        assert_eq!(path, workspace.path("candidate.py"));
        assert_eq!(
            workspace.read_file("candidate.py").unwrap().as_deref(),
            Some("x = 1\n")
        );
        assert_eq!(workspace.read_file("outcome.json").unwrap(), None);
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let mut workspace = Workspace::new(root.path()).unwrap();
        workspace.write_file("test.py", b"").unwrap();
        let dir = workspace.run_dir().to_path_buf();

        workspace.cleanup().unwrap();
        assert!(!dir.exists());
        workspace.cleanup().unwrap();
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = {
            let workspace = Workspace::new(root.path()).unwrap();
            workspace.run_dir().to_path_buf()
        };
        assert!(!dir.exists());
    }
}
