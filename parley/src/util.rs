//! Small convenience constructors and parsers.

use psession::{DispatchMode, InboundPacket};
use ptooling::{ArgumentMap, InvocationRequest, TOOL_CALL_CHANNEL, ToolError, encode_request};
use serde_json::Value;

/// Builds a request from a JSON value; anything but an object yields no arguments.
pub fn tool_call(tool_name: impl Into<String>, arguments: Value) -> InvocationRequest {
    let arguments = match arguments {
        Value::Object(map) => map,
        _ => ArgumentMap::new(),
    };
    InvocationRequest::new(tool_name, arguments)
}

/// Wraps a request as a packet on the tool-call channel.
pub fn tool_call_packet(request: &InvocationRequest) -> Result<InboundPacket, ToolError> {
    Ok(InboundPacket::new(TOOL_CALL_CHANNEL, encode_request(request)?))
}

pub fn parse_dispatch_mode(value: &str) -> Option<DispatchMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "sequential" | "serial" | "ordered" => Some(DispatchMode::Sequential),
        "concurrent" | "parallel" => Some(DispatchMode::Concurrent),
        _ => None,
    }
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
