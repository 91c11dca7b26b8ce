//! Common imports for most parley clients.

pub use crate::{
    build_client, build_client_with, init_client_tracing, parse_dispatch_mode, tool_call,
    tool_call_packet,
};
pub use crate::{parley_kind, parley_param, parley_tool};
pub use crate::{
    AuthConfig, AuthError, AuthErrorKind, ChannelTransport, ClientConfig, ClientHooks, Credential,
    CredentialResolver, CredentialSource, DispatchMode, FarewellDelay, InboundPacket,
    InvocationRequest, InvocationResult, LoopbackTransport, ParameterKind, PumpSummary,
    ResolveOptions, RoomName, Session, SessionConfig, SessionControl, SessionError,
    SessionErrorKind, SessionHandle, SigningKeys, Tool, ToolArgs, ToolClient, ToolContext,
    ToolDescriptor, ToolDispatcher, ToolError, ToolErrorKind, ToolParameter, ToolRegistry,
    ToolRuntime,
};
