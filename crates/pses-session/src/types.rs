use serde::{Deserialize, Serialize};

/// Backend startup outcome as reported in the session file.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Started,
    Failed,
    /// Unrecognized status from a newer backend. Deserializes via
    /// `#[serde(other)]` so protocol additions don't break older clients.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Started => write!(f, "started"),
            SessionStatus::Failed => write!(f, "failed"),
            SessionStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// The record the backend publishes in the session file once its listeners
/// are bound.
///
/// This is the wire type for the handshake, not an internal model: the
/// camelCase keys are the contract with the backend. The service "ports" are
/// the numeric suffixes the caller combines with `pses_paths::pipe_path` to
/// open each transport. Language service and debug service are independent
/// channels and both are required on a `started` status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetails {
    pub status: SessionStatus,
    /// Diagnostic text, populated when `status` is not `started`.
    pub reason: String,
    pub power_shell_version: String,
    /// Build channel of the backend runtime (e.g. "stable", "preview").
    pub channel: String,
    pub language_service_port: u32,
    pub debug_service_port: u32,
}

impl SessionDetails {
    /// Whether the backend reported a successful start. Port fields are only
    /// meaningful when this is true.
    pub fn is_started(&self) -> bool {
        self.status == SessionStatus::Started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_details() -> SessionDetails {
        SessionDetails {
            status: SessionStatus::Started,
            reason: String::new(),
            power_shell_version: "7.2".to_string(),
            channel: "stable".to_string(),
            language_service_port: 12345,
            debug_service_port: 12346,
        }
    }

    #[test]
    fn test_session_details_wire_keys() {
        let json = serde_json::to_string(&started_details()).unwrap();
        assert!(json.contains(r#""status":"started""#));
        assert!(json.contains(r#""powerShellVersion":"7.2""#));
        assert!(json.contains(r#""channel":"stable""#));
        assert!(json.contains(r#""languageServicePort":12345"#));
        assert!(json.contains(r#""debugServicePort":12346"#));
    }

    #[test]
    fn test_session_details_round_trip() {
        let details = started_details();
        let json = serde_json::to_string(&details).unwrap();
        let parsed: SessionDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, details);
    }

    #[test]
    fn test_failed_status_round_trip() {
        let details = SessionDetails {
            status: SessionStatus::Failed,
            reason: "could not bind language service listener".to_string(),
            power_shell_version: "7.4".to_string(),
            channel: "preview".to_string(),
            language_service_port: 0,
            debug_service_port: 0,
        };
        let json = serde_json::to_string(&details).unwrap();
        assert!(json.contains(r#""status":"failed""#));
        let parsed: SessionDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, details);
        assert!(!parsed.is_started());
    }

    #[test]
    fn test_unrecognized_status_parses_as_unknown() {
        let json = r#"{
            "status": "degraded",
            "reason": "",
            "powerShellVersion": "8.0",
            "channel": "daily",
            "languageServicePort": 1,
            "debugServicePort": 2
        }"#;
        let parsed: SessionDetails = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, SessionStatus::Unknown);
        assert!(!parsed.is_started());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Started.to_string(), "started");
        assert_eq!(SessionStatus::Failed.to_string(), "failed");
        assert_eq!(SessionStatus::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_ports_preserved_exactly() {
        let mut details = started_details();
        details.language_service_port = u32::MAX;
        details.debug_service_port = 1;
        let json = serde_json::to_string(&details).unwrap();
        let parsed: SessionDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.language_service_port, u32::MAX);
        assert_eq!(parsed.debug_service_port, 1);
    }
}
