//! Tool registry keyed by descriptor name.

use std::future::Future;
use std::sync::Arc;

use pcommon::Registry;
use serde_json::Value;

use crate::{FunctionTool, Tool, ToolArgs, ToolContext, ToolDescriptor, ToolError};

/// Name to tool table, filled during startup and read-only once shared.
///
/// Registering a name twice replaces the earlier tool.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.descriptor().name;
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_fn<F, Fut>(&mut self, descriptor: ToolDescriptor, handler: F)
    where
        F: Fn(ToolArgs, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(descriptor, handler));
    }

    pub fn register_sync_fn<F>(&mut self, descriptor: ToolDescriptor, handler: F)
    where
        F: Fn(ToolArgs, ToolContext) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(descriptor, move |args, context| {
            let output = handler(args, context);
            async move { output }
        });
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Descriptors of every registered tool, in no particular order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|tool| tool.descriptor()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn registry_tracks_registered_tools() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register_sync_fn(ToolDescriptor::new("echo"), |args, _| {
            Ok(json!({ "heard": args.into_value() }))
        });

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("echo"));
        assert!(registry.lookup("echo").is_some());
        assert!(registry.lookup("missing").is_none());
        assert_eq!(registry.descriptors().len(), 1);
        assert_eq!(registry.names(), vec!["echo".to_string()]);
    }

    #[test]
    fn duplicate_registration_replaces_earlier_tool() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDescriptor::new("greet").with_description("first"),
            |_, _| Ok(json!("first")),
        );
        registry.register_sync_fn(
            ToolDescriptor::new("greet").with_description("second"),
            |_, _| Ok(json!("second")),
        );

        assert_eq!(registry.len(), 1);
        let descriptor = registry
            .lookup("greet")
            .expect("tool should be registered")
            .descriptor();
        assert_eq!(descriptor.description, "second");
    }
}
