//! Tool descriptors, invocation request/result values, and handler context.

use std::fmt::{Display, Formatter};

use pcommon::{MetadataMap, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{ArgumentMap, SessionController, ToolError, ToolErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl Display for ParameterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Any => "any",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl ToolParameter {
    pub fn required(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDescriptor {
    pub const DEFAULT_DESCRIPTION: &'static str = "No description available";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Self::DEFAULT_DESCRIPTION.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|parameter| parameter.required)
    }
}

/// One decoded tool call from the remote peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub tool_name: String,
    #[serde(default)]
    pub arguments: ArgumentMap,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: ArgumentMap) -> Self {
        Self {
            call_id: None,
            tool_name: tool_name.into(),
            arguments,
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }
}

/// Outcome of one dispatch; failures never escape as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(rename = "tool")]
    pub tool_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InvocationResult {
    pub fn success(tool_name: impl Into<String>, payload: Value) -> Self {
        Self {
            call_id: None,
            tool_name: tool_name.into(),
            success: true,
            payload: Some(payload),
            error: None,
            message: None,
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: &ToolError) -> Self {
        Self {
            call_id: error.call_id.clone(),
            tool_name: tool_name.into(),
            success: false,
            payload: None,
            error: Some(error.kind),
            message: Some(error.message.clone()),
        }
    }

    pub fn with_call_id(mut self, call_id: Option<String>) -> Self {
        if call_id.is_some() {
            self.call_id = call_id;
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.error
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Per-call context handed to tool handlers.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub session_id: SessionId,
    pub call_id: Option<String>,
    pub metadata: MetadataMap,
    controller: SessionController,
    cancellation: CancellationToken,
}

impl ToolContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            call_id: None,
            metadata: MetadataMap::new(),
            controller: SessionController::new(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_controller(mut self, controller: SessionController) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Asks the hosting session to disconnect; a no-op when no session is bound.
    pub fn request_disconnect(&self) -> bool {
        self.controller.request_disconnect()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
