//! Client session layer: joins a room with a resolved credential, serves tool
//! calls arriving on the data channel, and tears down when a tool or the
//! client asks it to.

mod channel;
mod error;
mod hooks;
mod pump;
mod session;
mod state;
mod tools;

pub mod prelude {
    pub use crate::{
        ChannelTransport, DispatchMode, FarewellDelay, InboundPacket, Session, SessionConfig,
        SessionError, SessionErrorKind, SessionHandle, SessionHooks, SessionState,
    };
}

pub use channel::{ChannelTransport, InboundPacket, LoopbackTransport, OutboundPacket};
pub use error::{SessionError, SessionErrorKind};
pub use hooks::{NoopSessionHooks, SessionHooks};
pub use pump::{DEFAULT_DRAIN_GRACE, DispatchMode, PumpSummary, ToolCallPump};
pub use session::{Session, SessionConfig, SessionHandle, participant_name_for_device};
pub use state::{SessionState, SessionStatus};
pub use tools::{
    END_SESSION_MESSAGE, END_SESSION_TOOL, EndSessionTool, FarewellDelay, register_session_tools,
};
