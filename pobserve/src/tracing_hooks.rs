//! Tracing-based observability hooks for dispatch, credential resolution, and session phases.
//!
//! ```rust
//! use pobserve::TracingObservabilityHooks;
//! use ptooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use pauth::{AuthError, AuthHooks, Credential};
use pcommon::RoomName;
use psession::{PumpSummary, SessionError, SessionHooks, SessionState};
use ptooling::{
    EnvelopeError, InvocationRequest, InvocationResult, ToolContext, ToolError, ToolRuntimeHooks,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_dispatch_start(&self, request: &InvocationRequest, context: &ToolContext) {
        tracing::info!(
            phase = "tool",
            event = "dispatch_start",
            tool_name = request.tool_name,
            call_id = request.call_id.as_deref(),
            session_id = %context.session_id,
            argument_keys = ?request.arguments.keys().collect::<Vec<_>>()
        );
    }

    fn on_dispatch_success(
        &self,
        request: &InvocationRequest,
        context: &ToolContext,
        _result: &InvocationResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "dispatch_success",
            tool_name = request.tool_name,
            call_id = request.call_id.as_deref(),
            session_id = %context.session_id,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_dispatch_failure(
        &self,
        request: &InvocationRequest,
        context: &ToolContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "dispatch_failure",
            tool_name = request.tool_name,
            call_id = request.call_id.as_deref(),
            session_id = %context.session_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_code = error.kind.code(),
            retryable = error.retryable,
            error = %error
        );
    }
}

impl AuthHooks for TracingObservabilityHooks {
    fn on_remote_attempt(&self, participant_name: &str) {
        tracing::info!(phase = "auth", event = "remote_attempt", participant_name);
    }

    fn on_remote_skipped(&self, reason: &str) {
        tracing::info!(phase = "auth", event = "remote_skipped", reason);
    }

    fn on_remote_success(&self, room: &RoomName, elapsed: Duration) {
        tracing::info!(
            phase = "auth",
            event = "remote_success",
            room = %room,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_remote_soft_failure(&self, reason: &str, elapsed: Duration) {
        tracing::warn!(
            phase = "auth",
            event = "remote_soft_failure",
            reason,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_local_fallback(&self, room: &RoomName) {
        tracing::info!(phase = "auth", event = "local_fallback", room = %room);
    }

    fn on_resolved(&self, credential: &Credential) {
        tracing::info!(
            phase = "auth",
            event = "resolved",
            room = %credential.room,
            transport_url = credential.transport_url,
            source = ?credential.source
        );
    }

    fn on_fatal(&self, error: &AuthError) {
        tracing::error!(
            phase = "auth",
            event = "fatal",
            error_code = error.kind.code(),
            error = %error
        );
    }
}

impl SessionHooks for TracingObservabilityHooks {
    fn on_connected(&self, state: &SessionState) {
        tracing::info!(
            phase = "session",
            event = "connected",
            room = state.room.as_ref().map(|room| room.as_str()),
            participant = state
                .participant_identity
                .as_ref()
                .map(|identity| identity.as_str()),
            transport_url = state.transport_url.as_deref()
        );
    }

    fn on_connect_failure(&self, error: &SessionError) {
        tracing::error!(
            phase = "session",
            event = "connect_failure",
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_disconnected(&self, reason: &str) {
        tracing::info!(phase = "session", event = "disconnected", reason);
    }

    fn on_packet_ignored(&self, channel: &str) {
        tracing::debug!(phase = "session", event = "packet_ignored", channel);
    }

    fn on_undecodable(&self, error: &EnvelopeError) {
        tracing::warn!(
            phase = "session",
            event = "undecodable",
            tool_name = error.tool_name.as_deref(),
            call_id = error.call_id.as_deref(),
            error = %error
        );
    }

    fn on_publish_failure(&self, tool_name: &str, error: &SessionError) {
        tracing::error!(
            phase = "session",
            event = "publish_failure",
            tool_name,
            error = %error
        );
    }

    fn on_pump_stopped(&self, summary: &PumpSummary) {
        tracing::info!(
            phase = "session",
            event = "pump_stopped",
            received = summary.received,
            dispatched = summary.dispatched,
            ignored = summary.ignored,
            undecodable = summary.undecodable,
            publish_failures = summary.publish_failures,
            abandoned = summary.abandoned
        );
    }
}
