//! Session-level error types and conversion helpers.
//!
//! ```rust
//! use pauth::AuthError;
//! use psession::{SessionError, SessionErrorKind};
//!
//! let err = SessionError::from(AuthError::quota_exceeded("monthly quota used"));
//! assert_eq!(err.kind, SessionErrorKind::QuotaReached);
//! assert_eq!(err.message, "Quota reached.");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use pauth::{AuthError, AuthErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    Authentication,
    QuotaReached,
    NotConnected,
    AlreadyConnected,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Authentication, message)
    }

    pub fn quota_reached() -> Self {
        Self::new(SessionErrorKind::QuotaReached, "Quota reached.")
    }

    pub fn not_connected(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::NotConnected, message)
    }

    pub fn already_connected(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::AlreadyConnected, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Transport, message)
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SessionError {}

impl From<AuthError> for SessionError {
    fn from(value: AuthError) -> Self {
        match value.kind {
            AuthErrorKind::QuotaExceeded => SessionError::quota_reached(),
            _ => SessionError::authentication(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_map_to_authentication() {
        let err = SessionError::from(AuthError::configuration("keys missing"));
        assert_eq!(err.kind, SessionErrorKind::Authentication);
        assert!(err.message.contains("keys missing"));
    }
}
