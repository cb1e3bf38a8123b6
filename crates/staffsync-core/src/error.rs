//! Error types for Staffsync

use thiserror::Error;

/// Result type alias using Staffsync's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failed call against the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 4xx other than 404
    Client,
    /// 404
    NotFound,
    /// 5xx
    Server,
    /// The request never produced a response
    Network,
    /// Raised locally, no request was made
    Local,
}

/// Staffsync error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("{resource} '{id}' not found.")]
    NotFound { resource: &'static str, id: String },

    #[error("Skill {skill_id} is still referenced after {attempts} cascade attempt(s): {last_error}")]
    StillReferenced {
        skill_id: i64,
        attempts: u32,
        last_error: String,
    },

    // Remote errors (E100-E199)
    #[error("Network error: {0}. Check that the employee service is reachable.")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request rejected ({status}): {message}")]
    ClientError { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a missing employee
    pub fn employee_not_found(id: i64) -> Self {
        Self::NotFound {
            resource: "Employee",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing skill
    pub fn skill_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            resource: "Skill",
            id: id.to_string(),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E001",
            Self::StillReferenced { .. } => "E002",
            Self::NetworkError(_) => "E100",
            Self::ClientError { .. } => "E101",
            Self::ServerError { .. } => "E102",
            Self::Decode(_) => "E103",
            Self::ConfigError(_) => "E600",
            Self::InvalidArgument(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound {
                resource: "Assignment",
                ..
            } => Some("staffsync employees show <employee-id>".to_string()),
            Self::NotFound { resource, .. } => {
                Some(format!("staffsync {}s list", resource.to_lowercase()))
            }
            Self::NetworkError(_) => Some("staffsync config get remote.base_url".to_string()),
            Self::ClientError { status: 401, .. } | Self::ClientError { status: 403, .. } => {
                Some("Set the STAFFSYNC_TOKEN environment variable".to_string())
            }
            Self::StillReferenced { .. } => {
                Some("staffsync config set cascade.max_attempts <n>".to_string())
            }
            _ => None,
        }
    }

    /// Classify the error the way the stores and the cascade need it
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ClientError { .. } => ErrorKind::Client,
            Self::ServerError { .. } => ErrorKind::Server,
            Self::NetworkError(_) => ErrorKind::Network,
            _ => ErrorKind::Local,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::ClientError { status, .. } | Self::ServerError { status, .. } => Some(*status),
            Self::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a failed skill delete could be caused by remaining references
    ///
    /// Conflict-style rejections (409, 412, 422) and server errors qualify.
    /// Malformed requests and authorization failures never do.
    pub fn may_indicate_in_use(&self) -> bool {
        match self {
            Self::ClientError { status, .. } => matches!(status, 409 | 412 | 422),
            Self::ServerError { .. } => true,
            _ => false,
        }
    }

    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match (self.status(), self) {
            (Some(400), Self::ClientError { message, .. }) if !message.trim().is_empty() => {
                message.clone()
            }
            (Some(400), _) => "Invalid input.".to_string(),
            (Some(404), _) => "Resource not found.".to_string(),
            (Some(500), _) => "Server error. Please try again later.".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }

    /// Build the matching error for a non-success HTTP status
    pub fn from_status(status: u16, resource: &'static str, id: Option<String>, body: String) -> Self {
        let message = extract_message(&body).unwrap_or(body);
        match status {
            404 => Self::NotFound {
                resource,
                id: id.unwrap_or_else(|| "?".to_string()),
            },
            400..=499 => Self::ClientError { status, message },
            _ => Self::ServerError { status, message },
        }
    }
}

/// Pull a `message` field out of a JSON error body
fn extract_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(message.to_string());
    }
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = Error::employee_not_found(42);
        assert_eq!(error.code(), "E001");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.suggestion(), Some("staffsync employees list".to_string()));
        assert!(error.to_string().contains("42"));
        assert_eq!(error.user_message(), "Resource not found.");
    }

    #[test]
    fn test_from_status_classification() {
        let err = Error::from_status(404, "Skill", Some("7".into()), String::new());
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("Skill '7'"));

        let err = Error::from_status(409, "Skill", None, "in use".into());
        assert_eq!(err.kind(), ErrorKind::Client);
        assert!(err.may_indicate_in_use());

        let err = Error::from_status(503, "Skill", None, String::new());
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_user_messages() {
        let err = Error::from_status(400, "Employee", None, r#"{"message":"lastName required"}"#.into());
        assert_eq!(err.user_message(), "lastName required");

        let err = Error::from_status(400, "Employee", None, String::new());
        assert_eq!(err.user_message(), "Invalid input.");

        let err = Error::from_status(500, "Employee", None, "boom".into());
        assert_eq!(err.user_message(), "Server error. Please try again later.");

        let err = Error::from_status(502, "Employee", None, String::new());
        assert_eq!(err.user_message(), "An unexpected error occurred.");

        let err = Error::InvalidArgument("id required".into());
        assert_eq!(err.user_message(), "An unexpected error occurred.");
    }

    #[test]
    fn test_not_found_is_not_in_use() {
        assert!(!Error::skill_not_found(3).may_indicate_in_use());
        assert!(!Error::InvalidArgument("x".into()).may_indicate_in_use());
    }

    #[test]
    fn test_rejections_unrelated_to_references() {
        for status in [400, 401, 403, 405] {
            let err = Error::from_status(status, "Skill", Some("3".into()), String::new());
            assert!(!err.may_indicate_in_use(), "status {status}");
        }
        for status in [409, 412, 422, 500] {
            let err = Error::from_status(status, "Skill", Some("3".into()), String::new());
            assert!(err.may_indicate_in_use(), "status {status}");
        }
    }

    #[test]
    fn test_still_referenced() {
        let err = Error::StillReferenced {
            skill_id: 7,
            attempts: 3,
            last_error: "Server error (500): busy".into(),
        };
        assert_eq!(err.code(), "E002");
        assert_eq!(err.kind(), ErrorKind::Local);
        assert!(err.to_string().contains("3 cascade attempt"));
    }

    #[test]
    fn test_nested_error_message() {
        assert_eq!(
            extract_message(r#"{"error": {"message": "nope"}}"#),
            Some("nope".to_string())
        );
        assert_eq!(extract_message("plain text"), None);
    }
}
