//! Session file rendezvous.
//!
//! The backend process is launched separately and publishes its connection
//! details by writing a session file at a path both sides computed up front.
//! The client side polls for that file with a bounded budget rather than
//! watching the filesystem: backend cold start (runtime JIT, module loads)
//! makes the latency unpredictable, and a 500ms probe is imperceptible.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::{debug, warn};

use pses_paths::SessionPaths;

use crate::errors::SessionFileError;
use crate::types::SessionDetails;

/// Polling cadence for [`SessionFile::wait`].
///
/// The defaults (500ms x 50 attempts, a 25 second budget) are the protocol's
/// documented contract: long enough to absorb a slow-starting backend, short
/// enough that a dead launch fails while the user is still watching.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Delay between existence probes.
    pub interval: Duration,
    /// Number of probes before giving up.
    pub max_attempts: u32,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 50,
        }
    }
}

/// Outcome of [`SessionFile::delete`].
///
/// Cleanup must never block teardown, so failures are reported here instead
/// of through `Result`. A missing file counts as successful cleanup.
#[derive(Debug)]
pub enum DeleteOutcome {
    Removed,
    NotFound,
    Failed(std::io::Error),
}

/// Create a linked cancel handle/signal pair for [`SessionFile::wait_cancellable`].
///
/// The handle is cheap to clone and can be triggered from any thread; the
/// signal side is given to the waiting call. Dropping every handle leaves the
/// wait running to its normal completion.
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = mpsc::channel();
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Triggers cancellation of an in-flight wait.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Send failure means the wait already finished, nothing to cancel
        let _ = self.tx.send(());
    }
}

/// Receiving side of a cancellation pair. The wait loop parks on this
/// channel between probes, so a cancel interrupts the sleep immediately.
#[derive(Debug)]
pub struct CancelSignal {
    rx: Receiver<()>,
}

/// A session file at a fixed path, with the client side of the rendezvous.
///
/// The path is computed once at startup and injected here; none of the
/// operations consult the process environment.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The session file for `session_id` under the resolved sessions layout.
    pub fn for_session(paths: &SessionPaths, session_id: &str) -> Self {
        Self::new(paths.session_file(session_id))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking existence probe. Absence is a normal state while the
    /// backend is still starting, not an error.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the sessions directory if it doesn't exist yet.
    ///
    /// Already-existing is success; any other failure is fatal to the launch
    /// and propagated.
    pub fn ensure_directory(&self) -> Result<(), SessionFileError> {
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };
        fs::create_dir_all(dir).map_err(|e| SessionFileError::DirectoryCreation {
            path: dir.to_path_buf(),
            source: e,
        })
    }

    /// Serialize `details` and write it to the session file, replacing any
    /// prior content.
    ///
    /// This is the backend's half of the rendezvous; the client crate carries
    /// it for test harnesses and in-process backends. The write is not
    /// atomic: a concurrent reader can observe a truncated record, which is
    /// why [`SessionFile::wait`] retries parse failures.
    pub fn write(&self, details: &SessionDetails) -> Result<(), SessionFileError> {
        self.ensure_directory()?;

        let json = serde_json::to_string(details).map_err(|e| SessionFileError::Io {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        fs::write(&self.path, json).map_err(|e| SessionFileError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(
            event = "session.file.write_completed",
            path = %self.path.display(),
            status = %details.status,
        );
        Ok(())
    }

    /// One-shot read-and-parse of the session file.
    ///
    /// Fails with `NotFound` if the file is absent and `Parse` if its content
    /// is not a valid record. Callers that can tolerate a writer-in-progress
    /// race should go through [`SessionFile::wait`] instead.
    pub fn read(&self) -> Result<SessionDetails, SessionFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionFileError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                return Err(SessionFileError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| SessionFileError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Remove the session file. Best-effort: a missing file is fine, and
    /// other failures are logged rather than propagated.
    pub fn delete(&self) -> DeleteOutcome {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(event = "session.file.delete_completed", path = %self.path.display());
                DeleteOutcome::Removed
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DeleteOutcome::NotFound,
            Err(e) => {
                warn!(
                    event = "session.file.delete_failed",
                    path = %self.path.display(),
                    error = %e,
                );
                DeleteOutcome::Failed(e)
            }
        }
    }

    /// Poll until the backend publishes the session file, within the
    /// configured budget.
    ///
    /// A file that already exists is returned on the first probe with no
    /// delay. A record that fails to parse is treated as a write still in
    /// progress and retried on later probes; the parse error only surfaces
    /// if the budget ends with the file still unreadable. `Timeout` strictly
    /// means the file never appeared.
    pub fn wait(&self, config: &WaitConfig) -> Result<SessionDetails, SessionFileError> {
        self.wait_inner(config, None)
    }

    /// Like [`SessionFile::wait`], but abandonable via the signal from
    /// [`cancellation`]: a cancel wakes the in-flight sleep and returns
    /// `Cancelled` immediately.
    pub fn wait_cancellable(
        &self,
        config: &WaitConfig,
        signal: &CancelSignal,
    ) -> Result<SessionDetails, SessionFileError> {
        self.wait_inner(config, Some(signal))
    }

    fn wait_inner(
        &self,
        config: &WaitConfig,
        signal: Option<&CancelSignal>,
    ) -> Result<SessionDetails, SessionFileError> {
        debug!(
            event = "session.file.wait_started",
            path = %self.path.display(),
            interval_ms = config.interval.as_millis() as u64,
            max_attempts = config.max_attempts,
        );

        let mut last_parse_error = None;

        for attempt in 0..config.max_attempts {
            if self.exists() {
                match self.read() {
                    Ok(details) => {
                        debug!(
                            event = "session.file.wait_found",
                            path = %self.path.display(),
                            attempt = attempt,
                            status = %details.status,
                        );
                        return Ok(details);
                    }
                    Err(e @ SessionFileError::Parse { .. }) => {
                        // Probably racing the backend's write; keep polling
                        debug!(
                            event = "session.file.parse_retry",
                            path = %self.path.display(),
                            attempt = attempt,
                            error = %e,
                        );
                        last_parse_error = Some(e);
                    }
                    // File vanished between the probe and the read
                    Err(SessionFileError::NotFound { .. }) => {}
                    Err(e) => return Err(e),
                }
            }

            if pause(signal, config.interval) {
                debug!(
                    event = "session.file.wait_cancelled",
                    path = %self.path.display(),
                    attempt = attempt,
                );
                return Err(SessionFileError::Cancelled);
            }
        }

        match last_parse_error {
            Some(e) => Err(e),
            None => {
                warn!(
                    event = "session.file.wait_timeout",
                    path = %self.path.display(),
                    attempts = config.max_attempts,
                );
                Err(SessionFileError::Timeout {
                    attempts: config.max_attempts,
                })
            }
        }
    }
}

/// Park for one interval, returning `true` if cancellation arrived.
///
/// With all cancel handles dropped the channel reports disconnection
/// immediately, so fall back to a plain sleep to keep the cadence.
fn pause(signal: Option<&CancelSignal>, interval: Duration) -> bool {
    let Some(signal) = signal else {
        std::thread::sleep(interval);
        return false;
    };
    match signal.rx.recv_timeout(interval) {
        Ok(()) => true,
        Err(RecvTimeoutError::Timeout) => false,
        Err(RecvTimeoutError::Disconnected) => {
            std::thread::sleep(interval);
            false
        }
    }
}
