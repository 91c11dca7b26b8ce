//! Authentication error kinds and error value helpers.
//!
//! ```rust
//! use pauth::{AuthError, AuthErrorKind};
//!
//! let missing = AuthError::configuration("signing keys are not set");
//! assert!(missing.is_fatal());
//!
//! let remote = AuthError::remote("Quota exceeded for device");
//! assert!(remote.mentions_quota());
//! assert_eq!(remote.classify().kind, AuthErrorKind::QuotaExceeded);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    Configuration,
    QuotaExceeded,
    Remote,
    Signing,
}

impl AuthErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Remote => "remote_auth_soft_failure",
            Self::Signing => "signing_error",
        }
    }
}

impl Display for AuthErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Configuration, message)
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::QuotaExceeded, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Remote, message)
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Signing, message)
    }

    /// Fatal errors abort session establishment; remote errors only trigger fallback.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind, AuthErrorKind::Remote)
    }

    pub fn mentions_quota(&self) -> bool {
        self.kind == AuthErrorKind::QuotaExceeded || text_mentions_quota(&self.message)
    }

    /// Promotes any error whose text carries a quota indicator to `QuotaExceeded`.
    pub fn classify(self) -> Self {
        if self.kind != AuthErrorKind::QuotaExceeded && text_mentions_quota(&self.message) {
            return Self::quota_exceeded(self.message);
        }
        self
    }
}

pub(crate) fn text_mentions_quota(text: &str) -> bool {
    text.to_ascii_lowercase().contains("quota")
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_remote_errors_are_soft() {
        assert!(!AuthError::remote("connection refused").is_fatal());
        assert!(AuthError::configuration("missing").is_fatal());
        assert!(AuthError::quota_exceeded("limit").is_fatal());
        assert!(AuthError::signing("bad key").is_fatal());
    }

    #[test]
    fn classify_detects_quota_case_insensitively() {
        let error = AuthError::signing("QUOTA reached for this month").classify();
        assert_eq!(error.kind, AuthErrorKind::QuotaExceeded);

        let error = AuthError::remote("server exploded").classify();
        assert_eq!(error.kind, AuthErrorKind::Remote);
    }

    #[test]
    fn display_uses_wire_code() {
        let rendered = AuthError::configuration("keys missing").to_string();
        assert_eq!(rendered, "configuration_error: keys missing");
    }
}
