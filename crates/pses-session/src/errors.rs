use std::path::PathBuf;

/// Errors from the session file rendezvous.
#[derive(Debug, thiserror::Error)]
pub enum SessionFileError {
    #[error("Failed to create sessions directory '{path}': {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file '{path}' is not a valid session record: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Timed out waiting for session file to appear.")]
    Timeout { attempts: u32 },

    #[error("Wait for session file was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let not_found = SessionFileError::NotFound {
            path: PathBuf::from("/tmp/sessions/PSES-VSCode-1"),
        };
        assert!(not_found.to_string().contains("PSES-VSCode-1"));

        let timeout = SessionFileError::Timeout { attempts: 50 };
        assert_eq!(
            timeout.to_string(),
            "Timed out waiting for session file to appear."
        );

        let cancelled = SessionFileError::Cancelled;
        assert!(cancelled.to_string().contains("cancelled"));
    }

    #[test]
    fn test_parse_error_carries_source() {
        let source = serde_json::from_str::<crate::SessionDetails>("{").unwrap_err();
        let err = SessionFileError::Parse {
            path: PathBuf::from("/tmp/f"),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
