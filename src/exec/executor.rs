/// Runs one code/test pair in a fresh interpreter and classifies the result
use crate::config::settings::ExecutorConfig;
use crate::config::types::{GradeError, Result};
use crate::exec::watchdog::{Watchdog, WatchdogOutcome};
use crate::judge::adapter::InterpreterAdapter;
use crate::judge::registry::adapter_for;
use crate::kernel::signal::{kill_process_group, pending_interrupt, wait_for_exit};
use crate::protocol::request::ExecutionRequest;
use crate::protocol::response::ExecutionResult;
use crate::safety::workspace::Workspace;
use crate::utils::env_hygiene::{resolve_program, EnvPolicy};
use crate::utils::output::OutputCollector;
use crate::verdict::verdict::{Evidence, OutcomeRecord, Termination, VerdictClassifier};
use log::{debug, info, warn};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::time::Instant;

const DEFAULT_LANGUAGE: &str = "python";

/// Executes untrusted code followed by a test snippet in one shared namespace.
///
/// Every call gets its own workspace and interpreter process, so nothing
/// defined by one call is visible to the next.
pub struct Executor {
    config: ExecutorConfig,
    adapter: Box<dyn InterpreterAdapter>,
    env_policy: EnvPolicy,
    watch_signals: bool,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        Ok(Self::with_adapter(config, adapter_for(DEFAULT_LANGUAGE)?))
    }

    pub fn with_adapter(config: ExecutorConfig, adapter: Box<dyn InterpreterAdapter>) -> Self {
        Self {
            config,
            adapter,
            env_policy: EnvPolicy::default(),
            watch_signals: false,
        }
    }

    /// Abort a run when the executor itself receives SIGINT/SIGTERM/SIGHUP.
    ///
    /// Only meaningful once [`crate::kernel::signal::SignalHandler`] is installed.
    pub fn watch_signals(mut self, enabled: bool) -> Self {
        self.watch_signals = enabled;
        self
    }

    pub fn execute_request(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        self.execute(&request.code, &request.test)
    }

    /// Run `code`, then `test`, and classify what happened.
    ///
    /// Candidate failures (syntax, timeout, assertion, runtime) come back as
    /// `Ok` with `passed == false`; `Err` is reserved for the executor itself
    /// failing to run the interpreter.
    pub fn execute(&self, code: &str, test: &str) -> Result<ExecutionResult> {
        if self.watch_signals {
            if let Some(sig) = pending_interrupt() {
                return Err(GradeError::Interrupted(sig));
            }
        }

        let interpreter = resolve_program(&self.config.python).ok_or_else(|| {
            GradeError::Process(format!(
                "Python interpreter not found: {}",
                self.config.python.display()
            ))
        })?;

        let workspace = Workspace::new(&self.config.workspace_root)?;
        self.adapter.prepare(&workspace, code, test)?;

        let argv = self.adapter.command(&interpreter, &workspace);
        let Some((program, args)) = argv.split_first() else {
            return Err(GradeError::Process(format!(
                "{} adapter produced an empty command",
                self.adapter.language()
            )));
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(self.env_policy.interpreter_environment(workspace.run_dir()))
            .current_dir(workspace.run_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|e| {
            GradeError::Process(format!(
                "Failed to spawn {}: {}",
                interpreter.display(),
                e
            ))
        })?;
        let pgid = Pid::from_raw(child.id() as i32);
        info!(
            "Run {}: spawned {} interpreter pid {}",
            workspace.run_id(),
            self.adapter.language(),
            pgid
        );

        let collector = OutputCollector::start(
            &self.config.output_limits,
            child.stdout.take(),
            child.stderr.take(),
        );

        let watchdog = match Watchdog::arm(pgid, self.config.timeout, self.watch_signals) {
            Ok(watchdog) => watchdog,
            Err(e) => {
                kill_process_group(pgid);
                let _ = child.wait();
                return Err(e);
            }
        };

        // Reap only after the sweep: the zombie leader keeps the group ID from being recycled.
        if let Err(e) = wait_for_exit(pgid) {
            warn!("waitid on interpreter {} failed: {}", pgid, e);
        }
        let watchdog_outcome = watchdog.disarm();
        kill_process_group(pgid);
        let status = child.wait().map_err(|e| {
            GradeError::Process(format!("Failed to wait for interpreter: {}", e))
        })?;
        let output = collector.finish();
        let elapsed = started.elapsed();
        debug!(
            "Run {}: captured stdout {} bytes ({}), stderr {} bytes ({})",
            workspace.run_id(),
            output.stdout.bytes.len(),
            output.stdout.integrity,
            output.stderr.bytes.len(),
            output.stderr.integrity
        );

        let timed_out = match watchdog_outcome {
            WatchdogOutcome::Interrupted(sig) => {
                warn!("Run {} interrupted by signal {}", workspace.run_id(), sig);
                return Err(GradeError::Interrupted(sig));
            }
            WatchdogOutcome::TimedOut => true,
            WatchdogOutcome::Disarmed => false,
        };

        // The record lives where the candidate can write, so any read failure counts as no record.
        let outcome = match workspace.read_file(self.adapter.outcome_file()) {
            Ok(raw) => raw.and_then(|raw| OutcomeRecord::parse(&raw)),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        if let Some(record) = &outcome {
            debug!(
                "Run {}: harness reported {:?} at stage {:?}",
                workspace.run_id(),
                record.status,
                record.stage
            );
        }

        let termination = Termination::from(status);
        let result = VerdictClassifier::classify(Evidence {
            outcome,
            timed_out,
            termination,
            stdout: output.stdout.text(),
            stderr: output.stderr.text(),
        });

        info!(
            "Run {}: passed={} error_type={} in {:?} ({:?})",
            workspace.run_id(),
            result.passed,
            result
                .error_type
                .as_ref()
                .map(|t| t.as_str())
                .unwrap_or("none"),
            elapsed,
            termination
        );
        Ok(result)
    }
}
