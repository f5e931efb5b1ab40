use std::path::{Path, PathBuf};

/// Filename prefix for session files. The backend is given the full path on
/// its command line, so both sides agree on it by construction.
pub const SESSION_FILE_PREFIX: &str = "PSES-VSCode-";

/// Environment variable the hosting editor exposes to identify the running
/// editor instance. Its uniqueness is the host's guarantee, not ours.
pub const SESSION_ID_ENV_VAR: &str = "VSCODE_PID";

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("could not determine the running executable's directory: {message}")]
    ExeNotFound { message: String },
}

/// Centralized path construction for the session rendezvous layout.
///
/// Single source of truth for where session files live. Use `resolve()` in
/// production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    sessions_dir: PathBuf,
}

impl SessionPaths {
    /// Resolve the sessions directory relative to the deployed executable
    /// (`<exe dir>/sessions`).
    pub fn resolve() -> Result<Self, PathError> {
        let exe = std::env::current_exe().map_err(|e| PathError::ExeNotFound {
            message: e.to_string(),
        })?;
        let bin_dir = exe.parent().ok_or_else(|| PathError::ExeNotFound {
            message: format!("executable has no parent directory: {}", exe.display()),
        })?;
        Ok(Self {
            sessions_dir: bin_dir.join("sessions"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(sessions_dir: PathBuf) -> Self {
        Self { sessions_dir }
    }

    /// The directory session files are written into.
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    /// The session file path for a given session id:
    /// `<sessions_dir>/PSES-VSCode-<session_id>`.
    ///
    /// Pure path computation; never touches the filesystem.
    pub fn session_file(&self, session_id: &str) -> PathBuf {
        self.sessions_dir
            .join(format!("{SESSION_FILE_PREFIX}{session_id}"))
    }
}

/// Platform family for pipe address construction.
///
/// Kept explicit (rather than `cfg`-only branches) so both conventions stay
/// testable from any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipePlatform {
    /// Global `\\.\pipe\` named-pipe namespace.
    Windows,
    /// Domain-socket files under the system temp directory.
    Unix,
}

impl PipePlatform {
    /// The platform family the current process is running on.
    pub fn current() -> Self {
        if cfg!(windows) {
            PipePlatform::Windows
        } else {
            PipePlatform::Unix
        }
    }
}

/// Build the transport address for a logical pipe name.
///
/// On Windows this is the reserved named-pipe namespace entry
/// `\\.\pipe\<name>`. On Unix platforms the pipe is a socket file under
/// `<tmpdir>/.dotnet/corefx/pipe/<name>`, the same location the .NET
/// runtime's `PipeStream` uses, so the backend resolves the identical path
/// without it ever being exchanged.
pub fn pipe_path(pipe_name: &str, platform: PipePlatform) -> PathBuf {
    match platform {
        PipePlatform::Windows => PathBuf::from(format!(r"\\.\pipe\{pipe_name}")),
        PipePlatform::Unix => std::env::temp_dir()
            .join(".dotnet")
            .join("corefx")
            .join("pipe")
            .join(pipe_name),
    }
}

/// Read the hosting editor's session identifier from the environment.
///
/// Returns `None` when the variable is unset or empty. Callers should read
/// this once at startup and pass the id around explicitly.
pub fn session_id_from_env() -> Option<String> {
    std::env::var(SESSION_ID_ENV_VAR)
        .ok()
        .filter(|id| !id.is_empty())
}
