//! Tool trait contract for registry-managed handlers.
//!
//! ```rust
//! use ptooling::{FunctionTool, Tool, ToolDescriptor};
//! use serde_json::json;
//!
//! let tool = FunctionTool::new(
//!     ToolDescriptor::new("echo").with_description("Echoes input"),
//!     |args, _ctx| async move { Ok(json!({ "heard": args.into_value() })) },
//! );
//!
//! assert_eq!(tool.descriptor().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use pcommon::BoxFuture;
use serde_json::Value;

use crate::{ToolArgs, ToolContext, ToolDescriptor, ToolError};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    fn invoke<'a>(
        &'a self,
        args: ToolArgs,
        context: &'a ToolContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;
}

type ToolHandler =
    dyn Fn(ToolArgs, ToolContext) -> ToolFuture<'static, Result<Value, ToolError>> + Send + Sync;

pub struct FunctionTool {
    descriptor: ToolDescriptor,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(descriptor: ToolDescriptor, handler: F) -> Self
    where
        F: Fn(ToolArgs, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |args, context| Box::pin(handler(args, context)));

        Self {
            descriptor,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn invoke<'a>(
        &'a self,
        args: ToolArgs,
        context: &'a ToolContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        (self.handler)(args, context.clone())
    }
}
