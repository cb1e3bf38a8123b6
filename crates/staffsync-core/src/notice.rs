//! Short-lived user notices
//!
//! A notice is what a presentation layer shows after an operation: a toast,
//! a status line or a line on stderr. Errors become notices through
//! [`Notice::from_error`], which uses the user-facing message rather than
//! the diagnostic one.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;

/// How long an error notice stays visible
pub const ERROR_LIFE: Duration = Duration::from_millis(5000);

/// How long a success notice stays visible
pub const SUCCESS_LIFE: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

/// A message for the user with a display lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Display lifetime
    #[serde(with = "life_millis")]
    pub life: Duration,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    fn new(severity: Severity, summary: &str, detail: impl Into<String>, life: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            summary: summary.to_string(),
            detail: detail.into(),
            life,
            created_at: Utc::now(),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self::new(Severity::Error, "Error", detail, ERROR_LIFE)
    }

    pub fn success(detail: impl Into<String>) -> Self {
        Self::new(Severity::Success, "Success", detail, SUCCESS_LIFE)
    }

    /// Error notice carrying the message a user should see for `error`
    pub fn from_error(error: &Error) -> Self {
        Self::error(error.user_message())
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Whether the notice should no longer be shown at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.life) {
            Ok(life) => now >= self.created_at + life,
            Err(_) => false,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

mod life_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(life: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(life.as_millis() as u64)
    }
}
