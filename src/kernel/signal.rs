/// Async-safe signal handling and process-group termination
use log::{debug, info};
use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::Pid;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Global interrupt flag (async-safe atomic)
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Signal that set the flag
static SIGNAL_RECEIVED: AtomicI32 = AtomicI32::new(0);

/// Signal handler state
pub struct SignalHandler;

impl SignalHandler {
    /// Install handlers for SIGINT, SIGTERM, SIGHUP.
    /// Must be called early in main() before any threads are spawned.
    pub fn init() -> Result<Self, String> {
        let sig_action = SigAction::new(
            SigHandler::Handler(Self::signal_handler),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );

        // SAFETY: the handler only stores to atomics, which is async-signal-safe.
        unsafe {
            signal::sigaction(Signal::SIGINT, &sig_action)
                .map_err(|e| format!("Failed to install SIGINT handler: {}", e))?;
            signal::sigaction(Signal::SIGTERM, &sig_action)
                .map_err(|e| format!("Failed to install SIGTERM handler: {}", e))?;
            signal::sigaction(Signal::SIGHUP, &sig_action)
                .map_err(|e| format!("Failed to install SIGHUP handler: {}", e))?;
        }

        info!("Signal handlers installed (SIGINT, SIGTERM, SIGHUP)");
        Ok(Self)
    }

    /// Only performs atomic stores - no allocations, no locks, no I/O
    extern "C" fn signal_handler(signal: libc::c_int) {
        SIGNAL_RECEIVED.store(signal, Ordering::SeqCst);
        SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    }
}

/// Signal number received since start, if any
pub fn pending_interrupt() -> Option<i32> {
    if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
        Some(SIGNAL_RECEIVED.load(Ordering::SeqCst))
    } else {
        None
    }
}

/// SIGKILL every process in the group led by `pgid`.
///
/// Returns false when the group no longer exists.
pub fn kill_process_group(pgid: Pid) -> bool {
    match signal::killpg(pgid, Signal::SIGKILL) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(e) => {
            debug!("killpg({}) failed: {}; falling back to kill", pgid, e);
            signal::kill(pgid, Signal::SIGKILL).is_ok()
        }
    }
}

/// Block until `pid` has exited, leaving it unreaped.
///
/// The zombie keeps its process-group ID reserved, so the group can still be
/// signalled without hitting a recycled ID until the caller reaps it.
pub fn wait_for_exit(pid: Pid) -> nix::Result<()> {
    loop {
        // SAFETY: siginfo_t is plain data that waitid only writes into.
        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        let rc = unsafe {
            libc::waitid(
                libc::P_PID,
                pid.as_raw() as libc::id_t,
                &mut info,
                libc::WEXITED | libc::WNOWAIT,
            )
        };
        match Errno::result(rc) {
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Serializes tests that raise signals or touch the interrupt flag
#[cfg(test)]
pub(crate) static INTERRUPT_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn clear_interrupt() {
    SHUTDOWN_REQUESTED.store(false, Ordering::SeqCst);
    SIGNAL_RECEIVED.store(0, Ordering::SeqCst);
}
