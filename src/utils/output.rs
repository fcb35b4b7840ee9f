/// Bounded output collection for the interpreter's stdout and stderr pipes
use crate::config::types::OutputIntegrity;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::warn;
use std::io::{ErrorKind, Read};
use std::thread;
use std::time::{Duration, Instant};

const READ_CHUNK: usize = 8192;

/// Output limits configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLimits {
    /// Per-stream stdout limit (bytes)
    pub stdout_limit: usize,
    /// Per-stream stderr limit (bytes)
    pub stderr_limit: usize,
    /// How long to wait for readers once the interpreter is gone
    pub collection_grace: Duration,
}

impl Default for OutputLimits {
    fn default() -> Self {
        OutputLimits {
            stdout_limit: 8 * 1024 * 1024,
            stderr_limit: 2 * 1024 * 1024,
            collection_grace: Duration::from_millis(2000),
        }
    }
}

/// Bytes captured from one stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedStream {
    pub bytes: Vec<u8>,
    pub integrity: OutputIntegrity,
}

impl CapturedStream {
    /// Lossy UTF-8 view of the captured bytes
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Output collection result
#[derive(Debug, Clone, Default)]
pub struct OutputResult {
    pub stdout: CapturedStream,
    pub stderr: CapturedStream,
}

enum StreamEvent {
    Data(Vec<u8>),
    Truncated,
    Failed(ErrorKind),
}

/// Reader threads draining the child's pipes while it runs.
///
/// Readers keep draining past the limit so a chatty program never blocks on a
/// full pipe; only the first `limit` bytes are forwarded.
pub struct OutputCollector {
    stdout_rx: Option<Receiver<StreamEvent>>,
    stderr_rx: Option<Receiver<StreamEvent>>,
    grace: Duration,
}

impl OutputCollector {
    /// Start draining both streams in the background
    pub fn start<O, E>(limits: &OutputLimits, stdout: Option<O>, stderr: Option<E>) -> Self
    where
        O: Read + Send + 'static,
        E: Read + Send + 'static,
    {
        OutputCollector {
            stdout_rx: stdout.map(|s| spawn_reader("stdout", s, limits.stdout_limit)),
            stderr_rx: stderr.map(|s| spawn_reader("stderr", s, limits.stderr_limit)),
            grace: limits.collection_grace,
        }
    }

    /// Gather what the readers produced. Call once the child has been reaped.
    pub fn finish(self) -> OutputResult {
        let deadline = Instant::now() + self.grace;
        OutputResult {
            stdout: drain(self.stdout_rx, deadline, "stdout"),
            stderr: drain(self.stderr_rx, deadline, "stderr"),
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    name: &'static str,
    stream: R,
    limit: usize,
) -> Receiver<StreamEvent> {
    let (tx, rx) = unbounded();
    let spawned = thread::Builder::new()
        .name(format!("gradebox-{}", name))
        .spawn(move || collect_stream(stream, limit, tx));
    if let Err(e) = spawned {
        // Receiver sees a disconnect and reports an empty stream.
        warn!("Failed to spawn {} reader: {}", name, e);
    }
    rx
}

fn collect_stream<R: Read>(mut stream: R, limit: usize, tx: Sender<StreamEvent>) {
    let mut chunk = [0u8; READ_CHUNK];
    let mut forwarded = 0usize;
    let mut truncated = false;

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let room = limit.saturating_sub(forwarded);
                if room > 0 {
                    let take = room.min(n);
                    forwarded += take;
                    if tx.send(StreamEvent::Data(chunk[..take].to_vec())).is_err() {
                        return;
                    }
                }
                if n > room && !truncated {
                    truncated = true;
                    let _ = tx.send(StreamEvent::Truncated);
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.send(StreamEvent::Failed(e.kind()));
                break;
            }
        }
    }
}

fn drain(rx: Option<Receiver<StreamEvent>>, deadline: Instant, name: &str) -> CapturedStream {
    let mut captured = CapturedStream::default();
    let Some(rx) = rx else {
        return captured;
    };

    loop {
        match rx.recv_deadline(deadline) {
            Ok(StreamEvent::Data(bytes)) => captured.bytes.extend_from_slice(&bytes),
            Ok(StreamEvent::Truncated) => {
                warn!("{} exceeded its capture limit; output truncated", name);
                captured.integrity = OutputIntegrity::Truncated;
            }
            Ok(StreamEvent::Failed(kind)) => {
                warn!("{} reader failed: {:?}", name, kind);
                captured.integrity = OutputIntegrity::ReadError;
            }
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                // A detached descendant still holds the pipe open.
                warn!("{} still open after grace period; abandoning reader", name);
                if captured.integrity == OutputIntegrity::Complete {
                    captured.integrity = OutputIntegrity::Truncated;
                }
                break;
            }
        }
    }

    captured
}
