//! Dispatch lifecycle hooks.
//!
//! ```rust
//! use ptooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = NoopToolRuntimeHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use crate::{InvocationRequest, InvocationResult, ToolContext, ToolError};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_dispatch_start(&self, _request: &InvocationRequest, _context: &ToolContext) {}

    fn on_dispatch_success(
        &self,
        _request: &InvocationRequest,
        _context: &ToolContext,
        _result: &InvocationResult,
        _elapsed: Duration,
    ) {
    }

    fn on_dispatch_failure(
        &self,
        _request: &InvocationRequest,
        _context: &ToolContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
