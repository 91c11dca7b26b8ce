//! Session and pump lifecycle hooks.
//!
//! ```rust
//! use psession::{NoopSessionHooks, SessionHooks};
//!
//! fn accepts_hooks(_hooks: &dyn SessionHooks) {}
//!
//! accepts_hooks(&NoopSessionHooks);
//! ```

use ptooling::EnvelopeError;

use crate::{PumpSummary, SessionError, SessionState};

pub trait SessionHooks: Send + Sync {
    fn on_connected(&self, _state: &SessionState) {}

    fn on_connect_failure(&self, _error: &SessionError) {}

    fn on_disconnected(&self, _reason: &str) {}

    fn on_packet_ignored(&self, _channel: &str) {}

    fn on_undecodable(&self, _error: &EnvelopeError) {}

    fn on_publish_failure(&self, _tool_name: &str, _error: &SessionError) {}

    fn on_pump_stopped(&self, _summary: &PumpSummary) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionHooks;

impl SessionHooks for NoopSessionHooks {}
