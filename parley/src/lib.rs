//! Unified facade over the parley workspace crates.
//!
//! This crate is the single dependency most device clients need. It
//! re-exports the tooling, credential, session, and observability crates and
//! adds client configuration, runtime wiring, and descriptor macros.
//!
//! ```rust
//! use parley::prelude::*;
//! use parley::serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_sync_fn(
//!     parley_tool!("get_weather", "Current weather for a city", city: string),
//!     |args, _ctx| Ok(json!({ "city": args.required_str("city")?, "forecast": "sunny" })),
//! );
//!
//! let config = ClientConfig::default()
//!     .with_auth(AuthConfig::default().with_signing_keys(SigningKeys::new("APIkey", "secret")))
//!     .with_local_mode(true);
//! let client = build_client(config, registry).expect("client builds");
//!
//! assert!(client.registry().contains("get_weather"));
//! assert!(client.registry().contains("end_session"));
//! ```

mod config;
mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use pauth;
pub use pcommon;
pub use pobserve;
pub use psession;
pub use ptooling;
pub use serde_json;

pub use pauth::{
    AuthConfig, AuthError, AuthErrorKind, AuthHooks, Credential, CredentialResolver,
    CredentialSource, HttpRemoteAuthenticator, JwtTokenSigner, NoopAuthHooks, RemoteAuthenticator,
    ResolveOptions, SecretString, SigningKeys, TokenGrant, TokenSigner,
};
pub use pcommon::{BoxFuture, MetadataMap, ParticipantIdentity, RoomName, SessionId};
pub use pobserve::{
    MetricsObservabilityHooks, SafeAuthHooks, SafeSessionHooks, SafeToolHooks,
    TracingObservabilityHooks, init_tracing,
};
pub use psession::{
    ChannelTransport, DispatchMode, END_SESSION_TOOL, EndSessionTool, FarewellDelay,
    InboundPacket, LoopbackTransport, NoopSessionHooks, OutboundPacket, PumpSummary, Session,
    SessionConfig, SessionError, SessionErrorKind, SessionHandle, SessionHooks, SessionState,
    SessionStatus, register_session_tools,
};
pub use ptooling::{
    ArgumentMap, FunctionTool, InvocationRequest, InvocationResult, NoopToolRuntimeHooks,
    ParameterKind, SessionControl, SessionController, TOOL_CALL_CHANNEL, Tool, ToolArgs,
    ToolContext, ToolDescriptor, ToolDispatcher, ToolError, ToolErrorKind, ToolFuture,
    ToolParameter, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
};

pub use config::{
    ClientConfig, ENV_ASSISTANT_NAME, ENV_CALL_TIMEOUT_SECS, ENV_DISPATCH_MODE,
    ENV_PARTICIPANT_NAME, ENV_USE_LOCAL,
};
pub use runtime::{ClientHooks, ToolClient, build_client, build_client_with};
pub use util::{parse_dispatch_mode, parse_flag, tool_call, tool_call_packet};

/// Installs the fmt subscriber using the filter from `config`.
pub fn init_client_tracing(config: &ClientConfig) -> bool {
    init_tracing(&config.log_filter)
}
