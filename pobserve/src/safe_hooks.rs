use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use pauth::{AuthError, AuthHooks, Credential};
use pcommon::RoomName;
use psession::{PumpSummary, SessionError, SessionHooks, SessionState};
use ptooling::{
    EnvelopeError, InvocationRequest, InvocationResult, ToolContext, ToolError, ToolRuntimeHooks,
};

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_dispatch_start(&self, request: &InvocationRequest, context: &ToolContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_start(request, context)
        }));
    }

    fn on_dispatch_success(
        &self,
        request: &InvocationRequest,
        context: &ToolContext,
        result: &InvocationResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_dispatch_success(request, context, result, elapsed)
        }));
    }

    fn on_dispatch_failure(
        &self,
        request: &InvocationRequest,
        context: &ToolContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_dispatch_failure(request, context, error, elapsed)
        }));
    }
}

pub struct SafeAuthHooks<H> {
    inner: H,
}

impl<H> SafeAuthHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> AuthHooks for SafeAuthHooks<H>
where
    H: AuthHooks,
{
    fn on_remote_attempt(&self, participant_name: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_remote_attempt(participant_name)
        }));
    }

    fn on_remote_skipped(&self, reason: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_remote_skipped(reason)));
    }

    fn on_remote_success(&self, room: &RoomName, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_remote_success(room, elapsed)
        }));
    }

    fn on_remote_soft_failure(&self, reason: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_remote_soft_failure(reason, elapsed)
        }));
    }

    fn on_local_fallback(&self, room: &RoomName) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_local_fallback(room)));
    }

    fn on_resolved(&self, credential: &Credential) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_resolved(credential)));
    }

    fn on_fatal(&self, error: &AuthError) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_fatal(error)));
    }
}

pub struct SafeSessionHooks<H> {
    inner: H,
}

impl<H> SafeSessionHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> SessionHooks for SafeSessionHooks<H>
where
    H: SessionHooks,
{
    fn on_connected(&self, state: &SessionState) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_connected(state)));
    }

    fn on_connect_failure(&self, error: &SessionError) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_connect_failure(error)));
    }

    fn on_disconnected(&self, reason: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_disconnected(reason)));
    }

    fn on_packet_ignored(&self, channel: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_packet_ignored(channel)));
    }

    fn on_undecodable(&self, error: &EnvelopeError) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_undecodable(error)));
    }

    fn on_publish_failure(&self, tool_name: &str, error: &SessionError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_publish_failure(tool_name, error)
        }));
    }

    fn on_pump_stopped(&self, summary: &PumpSummary) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_pump_stopped(summary)));
    }
}
