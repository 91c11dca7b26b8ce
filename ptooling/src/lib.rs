//! Capability layer for registering tools and dispatching remote invocations.

mod args;
mod controller;
mod envelope;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        InvocationRequest, InvocationResult, ParameterKind, SessionControl, SessionController,
        Tool, ToolArgs, ToolContext, ToolDescriptor, ToolDispatcher, ToolError, ToolErrorKind,
        ToolFuture, ToolParameter, ToolRegistry, ToolRuntime,
    };
}

pub use args::{ArgumentMap, ToolArgs, parse_arguments, validate_arguments};
pub use controller::{SessionControl, SessionController};
pub use envelope::{
    EnvelopeError, TOOL_CALL_CHANNEL, decode_request, encode_request, encode_response,
    response_envelope,
};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{ToolDispatcher, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{
    InvocationRequest, InvocationResult, ParameterKind, ToolContext, ToolDescriptor, ToolParameter,
};
