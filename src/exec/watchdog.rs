//! Wall-clock watchdog for a running interpreter.
//!
//! The watchdog is armed right after spawn and owns the only timer of a run.
//! When the budget runs out it SIGKILLs the interpreter's whole process group.
//! Disarming happens either explicitly through [`Watchdog::disarm`], which
//! reports whether the timer fired, or implicitly on drop when an error unwinds
//! the run first.

use crate::config::types::{GradeError, Result};
use crate::kernel::signal::{kill_process_group, pending_interrupt};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::{debug, warn};
use nix::unistd::Pid;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often an armed watchdog checks for a pending SIGINT/SIGTERM/SIGHUP
const SIGNAL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What the watchdog did before it was disarmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchdogOutcome {
    /// Disarmed before the deadline
    #[default]
    Disarmed,
    /// Deadline passed; the process group was killed
    TimedOut,
    /// The executor received this signal; the process group was killed
    Interrupted(i32),
}

pub struct Watchdog {
    cancel_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<WatchdogOutcome>>,
}

impl Watchdog {
    /// Arm a timer that kills process group `target` after `timeout`.
    ///
    /// With `watch_signals`, a pending executor interrupt also kills the group.
    pub fn arm(target: Pid, timeout: Duration, watch_signals: bool) -> Result<Self> {
        let deadline = Instant::now().checked_add(timeout).ok_or_else(|| {
            GradeError::Config(format!("timeout {:?} is out of range", timeout))
        })?;
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("gradebox-watchdog".to_string())
            .spawn(move || {
                loop {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!(
                            "Watchdog fired after {:?}; killing process group {}",
                            timeout, target
                        );
                        kill_process_group(target);
                        return WatchdogOutcome::TimedOut;
                    }

                    let remaining = deadline - now;
                    let wait = if watch_signals {
                        remaining.min(SIGNAL_POLL_INTERVAL)
                    } else {
                        remaining
                    };

                    match cancel_rx.recv_timeout(wait) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            return WatchdogOutcome::Disarmed
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            if !watch_signals {
                                continue;
                            }
                            if let Some(sig) = pending_interrupt() {
                                warn!(
                                    "Signal {} received; killing process group {}",
                                    sig, target
                                );
                                kill_process_group(target);
                                return WatchdogOutcome::Interrupted(sig);
                            }
                        }
                    }
                }
            })
            .map_err(|e| GradeError::Process(format!("Failed to spawn watchdog: {}", e)))?;

        debug!("Watchdog armed for process group {} ({:?})", target, timeout);
        Ok(Self {
            cancel_tx: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    /// Stop the timer and report whether it fired
    pub fn disarm(mut self) -> WatchdogOutcome {
        self.stop()
    }

    fn stop(&mut self) -> WatchdogOutcome {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.try_send(());
        }

        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                warn!("Watchdog thread panicked");
                WatchdogOutcome::Disarmed
            }),
            None => WatchdogOutcome::Disarmed,
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
