//! Credential resolution lifecycle hooks.
//!
//! ```rust
//! use pauth::{AuthHooks, NoopAuthHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn AuthHooks) {}
//!
//! assert_hooks_trait(&NoopAuthHooks);
//! ```

use std::time::Duration;

use pcommon::RoomName;

use crate::{AuthError, Credential};

pub trait AuthHooks: Send + Sync {
    fn on_remote_attempt(&self, _participant_name: &str) {}

    fn on_remote_skipped(&self, _reason: &str) {}

    fn on_remote_success(&self, _room: &RoomName, _elapsed: Duration) {}

    fn on_remote_soft_failure(&self, _reason: &str, _elapsed: Duration) {}

    fn on_local_fallback(&self, _room: &RoomName) {}

    fn on_resolved(&self, _credential: &Credential) {}

    fn on_fatal(&self, _error: &AuthError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuthHooks;

impl AuthHooks for NoopAuthHooks {}
