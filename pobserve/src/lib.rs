//! Production-friendly observability hooks for dispatch, credential, and session phases.
//!
//! ```rust
//! use pobserve::{MetricsObservabilityHooks, SafeToolHooks, TracingObservabilityHooks};
//!
//! let _tool_hooks = SafeToolHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod subscriber;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeAuthHooks, SafeSessionHooks, SafeToolHooks};
pub use subscriber::{DEFAULT_LOG_FILTER, ENV_LOG_FILTER, init_tracing, log_filter};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeAuthHooks, SafeSessionHooks, SafeToolHooks,
        TracingObservabilityHooks, init_tracing,
    };
}
