/// Environment hygiene for the interpreter process
use std::collections::BTreeMap;
use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const DETERMINISTIC_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Environment sanitization policy
#[derive(Debug, Clone)]
pub struct EnvPolicy {
    /// PATH handed to the interpreter
    pub path: String,
    /// Locale for LANG and LC_ALL
    pub locale: String,
}

impl Default for EnvPolicy {
    fn default() -> Self {
        EnvPolicy {
            path: DETERMINISTIC_PATH.to_string(),
            locale: "C.UTF-8".to_string(),
        }
    }
}

impl EnvPolicy {
    /// Build the complete environment for a run rooted at `workdir`.
    ///
    /// Nothing is inherited from the executor's own environment, so loader
    /// variables such as `LD_PRELOAD` never reach the interpreter.
    pub fn interpreter_environment(&self, workdir: &Path) -> BTreeMap<String, String> {
        let workdir = workdir.to_string_lossy().into_owned();
        let mut env_map = BTreeMap::new();

        env_map.insert("PATH".to_string(), self.path.clone());
        env_map.insert("HOME".to_string(), workdir.clone());
        env_map.insert("TMPDIR".to_string(), workdir);
        env_map.insert("LANG".to_string(), self.locale.clone());
        env_map.insert("LC_ALL".to_string(), self.locale.clone());

        env_map
    }
}

/// Resolve a bare program name against the executor's PATH.
///
/// The interpreter runs with a scrubbed PATH, so lookup has to happen here.
/// Names containing a separator are used as given, if they name an executable file.
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let search = env::var_os("PATH").unwrap_or_else(|| DETERMINISTIC_PATH.into());
    env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
