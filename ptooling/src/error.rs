//! Tool dispatch errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    #[serde(rename = "tool_not_found")]
    NotFound,
    BadArguments,
    #[serde(rename = "execution_failed")]
    Execution,
    Timeout,
    #[serde(rename = "session_closed")]
    Cancelled,
    Other,
}

impl ToolErrorKind {
    /// Stable code reported in the `error` field of a failed invocation.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "tool_not_found",
            Self::BadArguments => "bad_arguments",
            Self::Execution => "execution_failed",
            Self::Timeout => "timeout",
            Self::Cancelled => "session_closed",
            Self::Other => "other",
        }
    }
}

impl Display for ToolErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub retryable: bool,
    pub tool_name: Option<String>,
    pub call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            tool_name: None,
            call_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message, false)
    }

    pub fn bad_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::BadArguments, message, false)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message, true)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Cancelled, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Other, message, false)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::BadArguments | ToolErrorKind::NotFound
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.call_id) {
            (Some(tool_name), Some(call_id)) => write!(
                f,
                "{} [tool={}, call_id={}]: {}",
                self.kind, tool_name, call_id, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

impl From<serde_json::Error> for ToolError {
    fn from(value: serde_json::Error) -> Self {
        ToolError::bad_arguments(format!("invalid JSON: {value}"))
    }
}
