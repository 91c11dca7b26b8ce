//! Tool runtime trait and the default registry-backed dispatcher.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::FutureExt;
use futures_util::future::{Either, select};
use pcommon::SessionId;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    InvocationRequest, InvocationResult, NoopToolRuntimeHooks, SessionController, ToolArgs,
    ToolContext, ToolError, ToolFuture, ToolRegistry, ToolRuntimeHooks, validate_arguments,
};

pub trait ToolRuntime: Send + Sync {
    /// Resolves and runs one invocation. Never fails: every problem is
    /// reported inside the returned [`InvocationResult`].
    fn dispatch<'a>(&'a self, request: InvocationRequest) -> ToolFuture<'a, InvocationResult>;
}

#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    controller: SessionController,
    hooks: Arc<dyn ToolRuntimeHooks>,
    session_id: SessionId,
    cancellation: CancellationToken,
    call_timeout: Option<Duration>,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            controller: SessionController::new(),
            hooks: Arc::new(NoopToolRuntimeHooks),
            session_id: SessionId::new("unbound"),
            cancellation: CancellationToken::new(),
            call_timeout: None,
        }
    }

    pub fn with_controller(mut self, controller: SessionController) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Once `cancellation` fires, new dispatches are rejected with `session_closed`.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    fn context_for(&self, request: &InvocationRequest) -> ToolContext {
        let context = ToolContext::new(self.session_id.clone())
            .with_controller(self.controller.clone())
            .with_cancellation(self.cancellation.child_token());

        match &request.call_id {
            Some(call_id) => context.with_call_id(call_id.clone()),
            None => context,
        }
    }

    async fn run(
        &self,
        request: &InvocationRequest,
        context: &ToolContext,
    ) -> Result<Value, ToolError> {
        if self.cancellation.is_cancelled() {
            return Err(ToolError::cancelled("session is closed; dispatch rejected"));
        }

        let tool = self.registry.lookup(&request.tool_name).ok_or_else(|| {
            ToolError::not_found(format!("tool '{}' is not registered", request.tool_name))
        })?;

        let descriptor = tool.descriptor();
        let arguments = validate_arguments(&descriptor.parameters, request.arguments.clone())?;

        // `invoke` itself may run handler code before yielding a future.
        let args = ToolArgs::from(arguments);
        let invocation = Box::pin(
            AssertUnwindSafe(async move { tool.invoke(args, context).await }).catch_unwind(),
        );

        let outcome = match self.call_timeout {
            Some(limit) => match select(invocation, Delay::new(limit)).await {
                Either::Left((outcome, _)) => outcome,
                Either::Right(_) => {
                    return Err(ToolError::timeout(format!(
                        "tool '{}' did not finish within {}ms",
                        request.tool_name,
                        limit.as_millis()
                    )));
                }
            },
            None => invocation.await,
        };

        outcome.unwrap_or_else(|panic| {
            Err(ToolError::execution(format!(
                "tool panicked: {}",
                panic_message(panic.as_ref())
            )))
        })
    }
}

impl ToolRuntime for ToolDispatcher {
    fn dispatch<'a>(&'a self, request: InvocationRequest) -> ToolFuture<'a, InvocationResult> {
        Box::pin(async move {
            let context = self.context_for(&request);
            self.hooks.on_dispatch_start(&request, &context);
            let started = Instant::now();

            match self.run(&request, &context).await {
                Ok(payload) => {
                    let result = InvocationResult::success(&request.tool_name, payload)
                        .with_call_id(request.call_id.clone());
                    self.hooks
                        .on_dispatch_success(&request, &context, &result, started.elapsed());
                    result
                }
                Err(error) => {
                    let mut error = error.with_tool_name(&request.tool_name);
                    if let Some(call_id) = &request.call_id {
                        error = error.with_call_id(call_id);
                    }
                    self.hooks
                        .on_dispatch_failure(&request, &context, &error, started.elapsed());
                    InvocationResult::failure(&request.tool_name, &error)
                        .with_call_id(request.call_id.clone())
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }

    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }

    "unknown panic".to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::{ParameterKind, SessionControl, ToolDescriptor, ToolErrorKind, ToolParameter};

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDescriptor::new("echo").with_description("Echoes arguments"),
            |args, _| Ok(json!({ "heard": args.into_value() })),
        );
        registry.register_sync_fn(ToolDescriptor::new("broken"), |_, _| {
            Err(ToolError::execution("tool exploded"))
        });
        registry
    }

    fn request(tool_name: &str, arguments: Value) -> InvocationRequest {
        InvocationRequest::new(tool_name, arguments.as_object().cloned().unwrap_or_default())
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_dispatch_start(&self, request: &InvocationRequest, _context: &ToolContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", request.tool_name));
        }

        fn on_dispatch_success(
            &self,
            request: &InvocationRequest,
            _context: &ToolContext,
            _result: &InvocationResult,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", request.tool_name));
        }

        fn on_dispatch_failure(
            &self,
            request: &InvocationRequest,
            _context: &ToolContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{}", request.tool_name, error.kind));
        }
    }

    #[tokio::test]
    async fn dispatch_returns_handler_payload() {
        let dispatcher = ToolDispatcher::new(Arc::new(echo_registry()));

        let result = dispatcher.dispatch(request("echo", json!({"x": 1}))).await;

        assert_eq!(
            result.to_value(),
            json!({"tool": "echo", "success": true, "payload": {"heard": {"x": 1}}})
        );
    }

    #[tokio::test]
    async fn unknown_tool_reports_not_found() {
        let dispatcher = ToolDispatcher::new(Arc::new(echo_registry()));

        let result = dispatcher.dispatch(request("missing_tool", json!({}))).await;

        assert!(!result.success);
        assert_eq!(result.error, Some(ToolErrorKind::NotFound));
        assert_eq!(result.to_value()["error"], json!("tool_not_found"));
    }

    #[tokio::test]
    async fn handler_error_is_wrapped_and_dispatcher_stays_usable() {
        let hooks = Arc::new(RecordingHooks::default());
        let dispatcher = ToolDispatcher::new(Arc::new(echo_registry())).with_hooks(hooks.clone());

        let failed = dispatcher.dispatch(request("broken", json!({}))).await;
        assert!(!failed.success);
        assert_eq!(failed.error, Some(ToolErrorKind::Execution));
        assert_eq!(failed.message.as_deref(), Some("tool exploded"));

        let next = dispatcher.dispatch(request("echo", json!({"y": 2}))).await;
        assert!(next.success);

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec![
                "start:broken".to_string(),
                "failure:broken:execution_failed".to_string(),
                "start:echo".to_string(),
                "success:echo".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn panicking_handler_is_contained() {
        let mut registry = echo_registry();
        registry.register_sync_fn(ToolDescriptor::new("panics"), |_, _| {
            panic!("actuator jammed")
        });
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        let result = dispatcher.dispatch(request("panics", json!({}))).await;
        assert_eq!(result.error, Some(ToolErrorKind::Execution));
        assert!(
            result
                .message
                .as_deref()
                .is_some_and(|message| message.contains("actuator jammed"))
        );

        assert!(dispatcher.dispatch(request("echo", json!({}))).await.success);
    }

    #[tokio::test]
    async fn panic_before_async_block_is_contained() {
        let mut registry = echo_registry();
        registry.register_fn(ToolDescriptor::new("eager"), |args, _| {
            let coffee = args.as_map()["coffee_type"].clone();
            async move { Ok(json!({ "coffee_type": coffee })) }
        });
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        let result = dispatcher
            .dispatch(request("eager", json!({})).with_call_id("call-7"))
            .await;
        assert!(!result.success);
        assert_eq!(result.error, Some(ToolErrorKind::Execution));
        assert_eq!(result.call_id.as_deref(), Some("call-7"));

        let served = dispatcher
            .dispatch(request("eager", json!({"coffee_type": "mocha"})))
            .await;
        assert_eq!(served.payload, Some(json!({"coffee_type": "mocha"})));
    }

    #[tokio::test]
    async fn panicking_handler_is_contained_under_a_timeout() {
        let mut registry = echo_registry();
        registry.register_sync_fn(ToolDescriptor::new("panics"), |_, _| panic!("sync boom"));
        let dispatcher =
            ToolDispatcher::new(Arc::new(registry)).with_call_timeout(Duration::from_secs(1));

        let result = dispatcher.dispatch(request("panics", json!({}))).await;
        assert_eq!(result.error, Some(ToolErrorKind::Execution));
        assert!(dispatcher.dispatch(request("echo", json!({}))).await.success);
    }

    #[tokio::test]
    async fn missing_required_argument_skips_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDescriptor::new("add_to_order")
                .with_parameter(ToolParameter::required("coffee_type", ParameterKind::String))
                .with_parameter(
                    ToolParameter::optional("size", ParameterKind::String)
                        .with_default(json!("medium")),
                ),
            {
                let called = Arc::clone(&called);
                move |args, _| {
                    called.store(true, Ordering::SeqCst);
                    Ok(json!({ "size": args.string_or("size", "?") }))
                }
            },
        );
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        let rejected = dispatcher.dispatch(request("add_to_order", json!({}))).await;
        assert_eq!(rejected.error, Some(ToolErrorKind::BadArguments));
        assert!(!called.load(Ordering::SeqCst));

        let accepted = dispatcher
            .dispatch(request("add_to_order", json!({"coffee_type": "latte"})))
            .await;
        assert_eq!(accepted.payload, Some(json!({"size": "medium"})));
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn slow_handler_times_out() {
        let mut registry = ToolRegistry::new();
        registry.register_fn(ToolDescriptor::new("slow"), |_, _| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(json!({}))
        });
        let dispatcher =
            ToolDispatcher::new(Arc::new(registry)).with_call_timeout(Duration::from_millis(20));

        let result = dispatcher.dispatch(request("slow", json!({}))).await;
        assert_eq!(result.error, Some(ToolErrorKind::Timeout));
    }

    #[tokio::test]
    async fn cancelled_dispatcher_rejects_new_calls() {
        let cancellation = CancellationToken::new();
        let dispatcher =
            ToolDispatcher::new(Arc::new(echo_registry())).with_cancellation(cancellation.clone());

        cancellation.cancel();
        let result = dispatcher
            .dispatch(request("echo", json!({})).with_call_id("call-4"))
            .await;

        assert_eq!(result.error, Some(ToolErrorKind::Cancelled));
        assert_eq!(result.call_id.as_deref(), Some("call-4"));
    }

    #[derive(Default)]
    struct CountingControl {
        calls: AtomicUsize,
    }

    impl SessionControl for CountingControl {
        fn request_disconnect(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn farewell_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(ToolDescriptor::new("hang_up"), |_, context| {
            let delivered = context.request_disconnect();
            Ok(json!({ "message": "farewell accepted", "delivered": delivered }))
        });
        registry
    }

    #[tokio::test]
    async fn disconnect_before_binding_is_a_noop() {
        let dispatcher = ToolDispatcher::new(Arc::new(farewell_registry()));

        let result = dispatcher.dispatch(request("hang_up", json!({}))).await;

        assert!(result.success);
        assert_eq!(
            result.payload,
            Some(json!({"message": "farewell accepted", "delivered": false}))
        );
    }

    #[tokio::test]
    async fn injected_controller_reaches_bound_session() {
        let controller = SessionController::new();
        let dispatcher =
            ToolDispatcher::new(Arc::new(farewell_registry())).with_controller(controller.clone());
        let control = Arc::new(CountingControl::default());
        controller.bind(control.clone()).ok().expect("bind succeeds");

        let result = dispatcher.dispatch(request("hang_up", json!({}))).await;

        assert!(result.success);
        assert_eq!(control.calls.load(Ordering::SeqCst), 1);
    }
}
