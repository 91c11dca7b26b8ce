//! JSON codec for the tool-call channel.
//!
//! Inbound: `{"tool_name": .., "arguments": {..}, "call_id"?: ..}`.
//! Outbound: `{"tool": .., "success": .., "call_id"?: .., ...payload fields, "message": ..}`.
//!
//! ```rust
//! use ptooling::{InvocationResult, decode_request, response_envelope};
//! use serde_json::json;
//!
//! let request = decode_request(br#"{"tool_name":"echo","arguments":{"x":1}}"#).expect("decodes");
//! assert_eq!(request.tool_name, "echo");
//!
//! let envelope = response_envelope(&InvocationResult::success("echo", json!({"heard": 1})));
//! assert_eq!(envelope["heard"], json!(1));
//! assert_eq!(envelope["success"], json!(true));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

use crate::{ArgumentMap, InvocationRequest, InvocationResult, ToolError, parse_arguments};

/// Logical channel name tool calls travel on.
pub const TOOL_CALL_CHANNEL: &str = "tool_calls";

/// A payload that could not be decoded, with whatever identifiers survived.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeError {
    pub error: ToolError,
    pub tool_name: Option<String>,
    pub call_id: Option<String>,
}

impl EnvelopeError {
    fn unrecoverable(error: ToolError) -> Self {
        Self {
            error,
            tool_name: None,
            call_id: None,
        }
    }

    /// A failure response addressed to the caller, when the tool name survived.
    pub fn to_result(&self) -> Option<InvocationResult> {
        let tool_name = self.tool_name.as_ref()?;
        Some(InvocationResult::failure(tool_name, &self.error).with_call_id(self.call_id.clone()))
    }
}

impl Display for EnvelopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.tool_name {
            Some(tool_name) => write!(f, "undecodable call to '{tool_name}': {}", self.error),
            None => write!(f, "undecodable tool call: {}", self.error),
        }
    }
}

impl Error for EnvelopeError {}

pub fn decode_request(payload: &[u8]) -> Result<InvocationRequest, EnvelopeError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|err| EnvelopeError::unrecoverable(ToolError::from(err)))?;

    let Value::Object(mut fields) = value else {
        return Err(EnvelopeError::unrecoverable(ToolError::bad_arguments(
            "tool call must be a JSON object",
        )));
    };

    let call_id = take_string(&mut fields, &["call_id", "id"]);
    let Some(tool_name) = take_string(&mut fields, &["tool_name", "name"]) else {
        return Err(EnvelopeError {
            error: ToolError::bad_arguments("tool call is missing 'tool_name'"),
            tool_name: None,
            call_id,
        });
    };

    let arguments = match fields.remove("arguments") {
        None | Some(Value::Null) => Ok(ArgumentMap::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(Value::String(raw)) => parse_arguments(&raw),
        Some(_) => Err(ToolError::bad_arguments("'arguments' must be a JSON object")),
    }
    .map_err(|error| EnvelopeError {
        error,
        tool_name: Some(tool_name.clone()),
        call_id: call_id.clone(),
    })?;

    Ok(InvocationRequest {
        call_id,
        tool_name,
        arguments,
    })
}

pub fn encode_request(request: &InvocationRequest) -> Result<Vec<u8>, ToolError> {
    Ok(serde_json::to_vec(request)?)
}

/// Flattens a result into the outbound channel envelope.
pub fn response_envelope(result: &InvocationResult) -> Value {
    let mut envelope = Map::new();

    if result.success {
        match &result.payload {
            Some(Value::Object(fields)) => {
                envelope.extend(fields.iter().map(|(key, value)| (key.clone(), value.clone())));
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                envelope.insert("payload".to_string(), other.clone());
            }
        }
    }

    envelope.insert("tool".to_string(), Value::String(result.tool_name.clone()));
    envelope.insert("success".to_string(), Value::Bool(result.success));

    if let Some(call_id) = &result.call_id {
        envelope.insert("call_id".to_string(), Value::String(call_id.clone()));
    }

    if let Some(kind) = result.error {
        envelope.insert("error".to_string(), Value::String(kind.code().to_string()));
    }

    let message = match (&result.message, envelope.get("message")) {
        (Some(message), _) => message.clone(),
        (None, Some(Value::String(message))) => message.clone(),
        (None, _) => format!("Tool '{}' executed successfully", result.tool_name),
    };
    envelope.insert("message".to_string(), Value::String(message));

    Value::Object(envelope)
}

pub fn encode_response(result: &InvocationResult) -> Result<Vec<u8>, ToolError> {
    Ok(serde_json::to_vec(&response_envelope(result))?)
}

fn take_string(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.remove(*key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value),
        _ => None,
    })
}
