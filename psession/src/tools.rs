//! Built-in session-control tools.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use psession::FarewellDelay;
//!
//! let delay = FarewellDelay::default();
//! assert_eq!(delay.for_message(""), Duration::from_secs(2));
//! assert_eq!(delay.for_message(&"x".repeat(10_000)), Duration::from_secs(30));
//! ```

use std::time::Duration;

use ptooling::{
    ParameterKind, Tool, ToolArgs, ToolContext, ToolDescriptor, ToolError, ToolFuture,
    ToolParameter, ToolRegistry,
};
use serde_json::{Value, json};

pub const END_SESSION_TOOL: &str = "end_session";
pub const END_SESSION_MESSAGE: &str = "Session ending, disconnecting from room";

/// Pause before disconnecting so a spoken farewell can finish playing.
///
/// The delay grows with the farewell's length (`per_char` for every
/// character plus a fixed `buffer`) and never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarewellDelay {
    pub per_char: Duration,
    pub buffer: Duration,
    pub max: Duration,
}

impl Default for FarewellDelay {
    fn default() -> Self {
        Self {
            per_char: Duration::from_secs(1) / 13,
            buffer: Duration::from_secs(2),
            max: Duration::from_secs(30),
        }
    }
}

impl FarewellDelay {
    /// Disconnects right away.
    pub fn none() -> Self {
        Self {
            per_char: Duration::ZERO,
            buffer: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn for_message(&self, message: &str) -> Duration {
        let chars = u32::try_from(message.chars().count()).unwrap_or(u32::MAX);
        self.per_char
            .saturating_mul(chars)
            .saturating_add(self.buffer)
            .min(self.max)
    }
}

/// Ends the hosting session after the farewell delay.
#[derive(Debug, Clone)]
pub struct EndSessionTool {
    delay: FarewellDelay,
}

impl EndSessionTool {
    pub fn new(delay: FarewellDelay) -> Self {
        Self { delay }
    }

    async fn run(&self, args: ToolArgs, context: &ToolContext) -> Result<Value, ToolError> {
        let farewell = args.required_str("farewell_message")?.to_string();
        let delay = self.delay.for_message(&farewell);

        if !delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = context.cancellation().cancelled() => {}
            }
        }

        context.request_disconnect();
        Ok(json!({
            "farewell_message": farewell,
            "message": END_SESSION_MESSAGE,
        }))
    }
}

impl Default for EndSessionTool {
    fn default() -> Self {
        Self::new(FarewellDelay::default())
    }
}

impl Tool for EndSessionTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(END_SESSION_TOOL)
            .with_description(
                "End the conversation and disconnect once the farewell message has been spoken",
            )
            .with_parameter(ToolParameter::required(
                "farewell_message",
                ParameterKind::String,
            ))
    }

    fn invoke<'a>(
        &'a self,
        args: ToolArgs,
        context: &'a ToolContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(self.run(args, context))
    }
}

pub fn register_session_tools(registry: &mut ToolRegistry, delay: FarewellDelay) {
    registry.register(EndSessionTool::new(delay));
}
