use crate::config::settings::{ConfigOverrides, ExecutorConfig};
use crate::config::types::{GradeError, Result as GradeResult};
use crate::exec::executor::Executor;
use crate::kernel::signal::SignalHandler;
use crate::protocol::request::ExecutionRequest;
use crate::protocol::response::{ExecutionResult, Response};
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, warn};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, env = "GRADEBOX_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Wall-clock timeout in seconds for code and test together
    #[arg(long, env = "GRADEBOX_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
    /// Python interpreter (name on PATH or absolute path)
    #[arg(long, env = "GRADEBOX_PYTHON", global = true)]
    python: Option<PathBuf>,
    /// Capture limit in bytes for each of stdout and stderr
    #[arg(long, global = true)]
    max_output_bytes: Option<usize>,
    /// Directory under which run workspaces are created
    #[arg(long, env = "GRADEBOX_WORKSPACE", global = true)]
    workspace_root: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the configured Python interpreter is usable
    CheckDeps {
        /// Print the interpreter path and version
        #[arg(long)]
        verbose: bool,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            timeout_secs: self.timeout_secs,
            python: self.python.clone(),
            max_output_bytes: self.max_output_bytes,
            workspace_root: self.workspace_root.clone(),
        }
    }
}

pub fn run() -> Result<()> {
    // Logs go to stderr; stdout carries nothing but the response line.
    env_logger::init();

    let cli = Cli::parse();
    let overrides = cli.overrides();

    match cli.command {
        None => {
            let watch_signals = match SignalHandler::init() {
                Ok(_) => true,
                Err(e) => {
                    warn!("{}", e);
                    false
                }
            };
            let response = Response::from(grade_stdin(
                cli.config.as_deref(),
                &overrides,
                watch_signals,
            ));
            write_response(&response)
        }
        Some(Commands::CheckDeps { verbose }) => {
            let config = ExecutorConfig::resolve(cli.config.as_deref(), &overrides)?;
            check_python(&config.python, verbose)
        }
    }
}

fn grade_stdin(
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
    watch_signals: bool,
) -> GradeResult<ExecutionResult> {
    let request = ExecutionRequest::read_from(io::stdin().lock())?;
    debug!(
        "Request: {} bytes of code, {} bytes of test",
        request.code.len(),
        request.test.len()
    );

    let config = ExecutorConfig::resolve(config_file, overrides)?;
    Executor::new(config)?
        .watch_signals(watch_signals)
        .execute_request(&request)
}

fn write_response(response: &Response) -> Result<()> {
    let line = match response.to_json_line() {
        Ok(line) => line,
        Err(e) => {
            // Still owe the caller exactly one line.
            let fallback = Response::from(Err::<ExecutionResult, _>(GradeError::Process(
                format!("Failed to serialize response: {}", e),
            )));
            fallback.to_json_line()?
        }
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}

fn check_python(python: &Path, verbose: bool) -> Result<()> {
    use crate::utils::env_hygiene::resolve_program;
    use std::process::Command;

    println!("Checking Python interpreter...");

    let Some(resolved) = resolve_program(python) else {
        println!("❌ Python - NOT FOUND ({})", python.display());
        anyhow::bail!("python interpreter '{}' not found", python.display());
    };

    let output = Command::new(&resolved).arg("--version").output()?;
    if !output.status.success() {
        println!("❌ Python - FAILED ({})", resolved.display());
        anyhow::bail!("'{} --version' exited with {}", resolved.display(), output.status);
    }

    // Python 2 printed its version on stderr.
    let version = if !output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        String::from_utf8_lossy(&output.stderr)
    }
    .lines()
    .next()
    .unwrap_or("")
    .trim()
    .to_string();

    println!("✅ Python - OK");
    if verbose {
        println!("  {} -> {}", resolved.display(), version);
    }
    Ok(())
}
