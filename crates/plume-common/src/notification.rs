//! User-facing notifications
//!
//! Every flow outcome, success or failure, is reported to the user as a short
//! titled message. Transient and permanent failures are not distinguished.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A titled message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub description: String,
}

impl Notification {
    pub fn success(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn error(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            description: description.into(),
        }
    }

    /// Error notification from any displayable failure, with a fallback text
    pub fn from_error(
        message: impl Into<String>,
        err: &dyn std::fmt::Display,
        fallback: &str,
    ) -> Self {
        let description = err.to_string();
        let description = if description.is_empty() {
            fallback.to_string()
        } else {
            description
        };
        Self::error(message, description)
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message, self.description)
    }
}
