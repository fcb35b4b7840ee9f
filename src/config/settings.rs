/// Executor configuration: built-in defaults, optional JSON file, then overrides
use crate::config::types::{GradeError, Result, DEFAULT_TIMEOUT};
use crate::utils::output::OutputLimits;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interpreter used when nothing else is configured
pub const DEFAULT_PYTHON: &str = "python3";

/// Largest accepted wall-clock budget (one day)
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Resolved configuration for one executor invocation
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Wall-clock budget shared by candidate and test code
    pub timeout: Duration,
    /// Python interpreter executable (name on PATH or absolute path)
    pub python: PathBuf,
    /// Per-stream capture bounds
    pub output_limits: OutputLimits,
    /// Parent directory for run-scoped workspaces
    pub workspace_root: PathBuf,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            python: PathBuf::from(DEFAULT_PYTHON),
            output_limits: OutputLimits::default(),
            workspace_root: std::env::temp_dir(),
        }
    }
}

/// On-disk configuration file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub timeout_secs: Option<u64>,
    pub python: Option<PathBuf>,
    pub max_stdout_bytes: Option<usize>,
    pub max_stderr_bytes: Option<usize>,
    pub collection_grace_ms: Option<u64>,
    pub workspace_root: Option<PathBuf>,
}

impl FileConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GradeError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            GradeError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Highest-precedence settings, normally taken from CLI flags or their env vars
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub timeout_secs: Option<u64>,
    pub python: Option<PathBuf>,
    /// Applied to both stdout and stderr
    pub max_output_bytes: Option<usize>,
    pub workspace_root: Option<PathBuf>,
}

impl ExecutorConfig {
    /// Layer file settings and overrides on top of the defaults, then validate.
    pub fn resolve(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_file {
            debug!("Loading executor config from {}", path.display());
            config.apply_file(FileConfig::load_from_file(path)?);
        }
        config.apply_overrides(overrides);
        config.validate()?;

        debug!(
            "Resolved executor config: timeout={:?} python={} stdout_limit={} stderr_limit={}",
            config.timeout,
            config.python.display(),
            config.output_limits.stdout_limit,
            config.output_limits.stderr_limit
        );
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(python) = file.python {
            self.python = python;
        }
        if let Some(limit) = file.max_stdout_bytes {
            self.output_limits.stdout_limit = limit;
        }
        if let Some(limit) = file.max_stderr_bytes {
            self.output_limits.stderr_limit = limit;
        }
        if let Some(ms) = file.collection_grace_ms {
            self.output_limits.collection_grace = Duration::from_millis(ms);
        }
        if let Some(root) = file.workspace_root {
            self.workspace_root = root;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(python) = &overrides.python {
            self.python = python.clone();
        }
        if let Some(limit) = overrides.max_output_bytes {
            self.output_limits.stdout_limit = limit;
            self.output_limits.stderr_limit = limit;
        }
        if let Some(root) = &overrides.workspace_root {
            self.workspace_root = root.clone();
        }
    }

    /// Reject settings that would make every run fail or hang.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(GradeError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.timeout > MAX_TIMEOUT {
            return Err(GradeError::Config(format!(
                "timeout of {}s exceeds the maximum of {}s",
                self.timeout.as_secs(),
                MAX_TIMEOUT.as_secs()
            )));
        }
        if self.python.as_os_str().is_empty() {
            return Err(GradeError::Config(
                "python interpreter path is empty".to_string(),
            ));
        }
        if self.output_limits.stdout_limit == 0 || self.output_limits.stderr_limit == 0 {
            return Err(GradeError::Config(
                "output limits must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.python, PathBuf::from("python3"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_then_overrides_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"timeout_secs": 5, "python": "/opt/py/bin/python3", "max_stderr_bytes": 100}}"#
        )
        .unwrap();

        let overrides = ConfigOverrides {
            timeout_secs: Some(7),
            ..Default::default()
        };
        let config = ExecutorConfig::resolve(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.python, PathBuf::from("/opt/py/bin/python3"));
        assert_eq!(config.output_limits.stderr_limit, 100);
        assert_eq!(
            config.output_limits.stdout_limit,
            OutputLimits::default().stdout_limit
        );
    }

    #[test]
    fn test_max_output_override_applies_to_both_streams() {
        let overrides = ConfigOverrides {
            max_output_bytes: Some(64),
            ..Default::default()
        };
        let config = ExecutorConfig::resolve(None, &overrides).unwrap();
        assert_eq!(config.output_limits.stdout_limit, 64);
        assert_eq!(config.output_limits.stderr_limit, 64);
    }

    #[test]
    fn test_unknown_file_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"timeout": 5}}"#).unwrap();

        let err = ExecutorConfig::resolve(Some(file.path()), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, GradeError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ExecutorConfig::resolve(
            Some(Path::new("/nonexistent/gradebox.json")),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let overrides = ConfigOverrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(ExecutorConfig::resolve(None, &overrides).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_timeout() {
        let overrides = ConfigOverrides {
            timeout_secs: Some(u64::MAX),
            ..Default::default()
        };
        let err = ExecutorConfig::resolve(None, &overrides).unwrap_err();
        assert!(matches!(err, GradeError::Config(_)));
        assert!(err.to_string().contains("exceeds the maximum"));

        let overrides = ConfigOverrides {
            timeout_secs: Some(MAX_TIMEOUT.as_secs()),
            ..Default::default()
        };
        assert!(ExecutorConfig::resolve(None, &overrides).is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_timeout_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"timeout_secs": 18446744073709551615}}"#).unwrap();

        let err = ExecutorConfig::resolve(Some(file.path()), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, GradeError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty_interpreter() {
        let mut config = ExecutorConfig::default();
        config.python = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_output_limit() {
        let mut config = ExecutorConfig::default();
        config.output_limits.stdout_limit = 0;
        assert!(config.validate().is_err());
    }
}
