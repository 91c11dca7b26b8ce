//! Metrics-based observability hooks for dispatch, credential resolution, and session phases.
//!
//! ```rust
//! use pauth::AuthHooks;
//! use pobserve::MetricsObservabilityHooks;
//!
//! fn accepts_auth_hooks(_hooks: &dyn AuthHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_auth_hooks(&hooks);
//! ```

use std::time::Duration;

use pauth::{AuthError, AuthHooks, Credential};
use pcommon::RoomName;
use psession::{PumpSummary, SessionError, SessionHooks, SessionState};
use ptooling::{
    EnvelopeError, InvocationRequest, InvocationResult, ToolContext, ToolError, ToolRuntimeHooks,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_dispatch_start(&self, request: &InvocationRequest, _context: &ToolContext) {
        metrics::counter!(
            "parley_tool_dispatch_start_total",
            "tool_name" => request.tool_name.clone()
        )
        .increment(1);
    }

    fn on_dispatch_success(
        &self,
        request: &InvocationRequest,
        _context: &ToolContext,
        _result: &InvocationResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_tool_dispatch_success_total",
            "tool_name" => request.tool_name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "parley_tool_dispatch_duration_seconds",
            "tool_name" => request.tool_name.clone(),
            "outcome" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_dispatch_failure(
        &self,
        request: &InvocationRequest,
        _context: &ToolContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_tool_dispatch_failure_total",
            "tool_name" => request.tool_name.clone(),
            "error_code" => error.kind.code()
        )
        .increment(1);
        metrics::histogram!(
            "parley_tool_dispatch_duration_seconds",
            "tool_name" => request.tool_name.clone(),
            "outcome" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl AuthHooks for MetricsObservabilityHooks {
    fn on_remote_attempt(&self, _participant_name: &str) {
        metrics::counter!("parley_auth_remote_attempt_total").increment(1);
    }

    fn on_remote_skipped(&self, _reason: &str) {
        metrics::counter!("parley_auth_remote_skipped_total").increment(1);
    }

    fn on_remote_success(&self, _room: &RoomName, elapsed: Duration) {
        metrics::counter!("parley_auth_remote_success_total").increment(1);
        metrics::histogram!("parley_auth_remote_duration_seconds", "outcome" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_remote_soft_failure(&self, _reason: &str, elapsed: Duration) {
        metrics::counter!("parley_auth_remote_soft_failure_total").increment(1);
        metrics::histogram!("parley_auth_remote_duration_seconds", "outcome" => "soft_failure")
            .record(elapsed.as_secs_f64());
    }

    fn on_local_fallback(&self, _room: &RoomName) {
        metrics::counter!("parley_auth_local_fallback_total").increment(1);
    }

    fn on_resolved(&self, credential: &Credential) {
        metrics::counter!(
            "parley_auth_resolved_total",
            "source" => if credential.is_local() { "local" } else { "remote" }
        )
        .increment(1);
    }

    fn on_fatal(&self, error: &AuthError) {
        metrics::counter!(
            "parley_auth_fatal_total",
            "error_code" => error.kind.code()
        )
        .increment(1);
    }
}

impl SessionHooks for MetricsObservabilityHooks {
    fn on_connected(&self, _state: &SessionState) {
        metrics::counter!("parley_session_connected_total").increment(1);
    }

    fn on_connect_failure(&self, error: &SessionError) {
        metrics::counter!(
            "parley_session_connect_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_disconnected(&self, _reason: &str) {
        metrics::counter!("parley_session_disconnected_total").increment(1);
    }

    fn on_packet_ignored(&self, _channel: &str) {
        metrics::counter!("parley_session_packet_ignored_total").increment(1);
    }

    fn on_undecodable(&self, _error: &EnvelopeError) {
        metrics::counter!("parley_session_undecodable_total").increment(1);
    }

    fn on_publish_failure(&self, tool_name: &str, _error: &SessionError) {
        metrics::counter!(
            "parley_session_publish_failure_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
    }

    fn on_pump_stopped(&self, summary: &PumpSummary) {
        metrics::histogram!("parley_session_calls_per_pump").record(summary.dispatched as f64);
        metrics::counter!("parley_session_abandoned_calls_total")
            .increment(summary.abandoned as u64);
    }
}
