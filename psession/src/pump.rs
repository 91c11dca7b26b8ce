//! Receive loop that feeds inbound tool calls to a runtime and publishes the replies.

use std::sync::Arc;
use std::time::Duration;

use ptooling::{
    InvocationRequest, InvocationResult, TOOL_CALL_CHANNEL, ToolRuntime, decode_request,
    encode_response,
};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{ChannelTransport, InboundPacket, NoopSessionHooks, SessionError, SessionHooks};

/// How long in-flight concurrent calls may finish once the pump stops.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// One call at a time, in arrival order.
    ///
    /// The receive loop waits on each handler, so a call that sleeps holds
    /// back every call queued behind it. That includes `end_session`, whose
    /// farewell delay can run up to thirty seconds; use [`Concurrent`] when
    /// calls must still be answered while a farewell is being spoken.
    ///
    /// [`Concurrent`]: DispatchMode::Concurrent
    #[default]
    Sequential,
    /// Every call runs on its own task; replies are correlated by `call_id`.
    Concurrent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpSummary {
    pub received: usize,
    pub dispatched: usize,
    pub ignored: usize,
    pub undecodable: usize,
    pub publish_failures: usize,
    pub abandoned: usize,
}

pub struct ToolCallPump {
    runtime: Arc<dyn ToolRuntime>,
    transport: Arc<dyn ChannelTransport>,
    hooks: Arc<dyn SessionHooks>,
    channel: String,
    mode: DispatchMode,
    cancellation: CancellationToken,
    drain_grace: Duration,
    next_call: u64,
    summary: PumpSummary,
}

impl ToolCallPump {
    pub fn new(runtime: Arc<dyn ToolRuntime>, transport: Arc<dyn ChannelTransport>) -> Self {
        Self {
            runtime,
            transport,
            hooks: Arc::new(NoopSessionHooks),
            channel: TOOL_CALL_CHANNEL.to_string(),
            mode: DispatchMode::default(),
            cancellation: CancellationToken::new(),
            drain_grace: DEFAULT_DRAIN_GRACE,
            next_call: 0,
            summary: PumpSummary::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_drain_grace(mut self, drain_grace: Duration) -> Self {
        self.drain_grace = drain_grace;
        self
    }

    /// Runs until the cancellation token fires or `inbound` closes.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<InboundPacket>) -> PumpSummary {
        let cancellation = self.cancellation.clone();
        let mut tasks: JoinSet<InvocationResult> = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    self.finish(joined).await;
                }
                _ = cancellation.cancelled() => break,
                packet = inbound.recv() => {
                    let Some(packet) = packet else { break };
                    let Some(request) = self.accept(packet).await else { continue };

                    match self.mode {
                        DispatchMode::Sequential => {
                            let runtime = Arc::clone(&self.runtime);
                            tokio::select! {
                                biased;
                                result = runtime.dispatch(request) => self.complete(result).await,
                                _ = cancellation.cancelled() => break,
                            }
                        }
                        DispatchMode::Concurrent => {
                            let runtime = Arc::clone(&self.runtime);
                            tasks.spawn(async move { runtime.dispatch(request).await });
                        }
                    }
                }
            }
        }

        self.drain(&mut tasks).await;
        self.hooks.on_pump_stopped(&self.summary);
        self.summary
    }

    async fn accept(&mut self, packet: InboundPacket) -> Option<InvocationRequest> {
        self.summary.received += 1;
        if packet.channel != self.channel {
            self.summary.ignored += 1;
            self.hooks.on_packet_ignored(&packet.channel);
            return None;
        }

        match decode_request(&packet.payload) {
            Ok(request) => Some(self.assign_call_id(request)),
            Err(error) => {
                self.summary.undecodable += 1;
                self.hooks.on_undecodable(&error);
                if let Some(reply) = error.to_result() {
                    self.publish(&reply).await;
                }
                None
            }
        }
    }

    fn assign_call_id(&mut self, mut request: InvocationRequest) -> InvocationRequest {
        let missing = request
            .call_id
            .as_deref()
            .is_none_or(|call_id| call_id.trim().is_empty());
        if missing {
            self.next_call += 1;
            request.call_id = Some(format!("call-{}", self.next_call));
        }
        request
    }

    async fn finish(&mut self, joined: Result<InvocationResult, JoinError>) {
        match joined {
            Ok(result) => self.complete(result).await,
            Err(_) => self.summary.abandoned += 1,
        }
    }

    async fn complete(&mut self, result: InvocationResult) {
        self.summary.dispatched += 1;
        self.publish(&result).await;
    }

    async fn publish(&mut self, result: &InvocationResult) {
        let sent = match encode_response(result) {
            Ok(bytes) => self.transport.publish(&self.channel, bytes).await,
            Err(error) => Err(SessionError::transport(format!(
                "cannot encode reply: {error}"
            ))),
        };

        if let Err(error) = sent {
            self.summary.publish_failures += 1;
            self.hooks.on_publish_failure(&result.tool_name, &error);
        }
    }

    async fn drain(&mut self, tasks: &mut JoinSet<InvocationResult>) {
        if tasks.is_empty() {
            return;
        }

        let grace = self.drain_grace;
        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = tasks.join_next().await {
                self.finish(joined).await;
            }
        })
        .await;

        if drained.is_err() {
            self.summary.abandoned += tasks.len();
            tasks.abort_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use ptooling::{ToolDispatcher, ToolRegistry};
    use serde_json::{Value, json};

    use super::*;
    use crate::LoopbackTransport;

    fn echo_runtime() -> Arc<dyn ToolRuntime> {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(ptooling::ToolDescriptor::new("echo"), |args, _| {
            Ok(json!({ "heard": args.into_value() }))
        });
        Arc::new(ToolDispatcher::new(Arc::new(registry)))
    }

    #[tokio::test]
    async fn missing_call_ids_are_assigned_in_order() {
        let (transport, mut published) = LoopbackTransport::new();
        let (sender, inbound) = mpsc::channel(8);
        sender
            .send(InboundPacket::new(TOOL_CALL_CHANNEL, br#"{"tool_name":"echo"}"#.to_vec()))
            .await
            .expect("send");
        sender
            .send(InboundPacket::new(
                TOOL_CALL_CHANNEL,
                br#"{"tool_name":"echo","call_id":"peer-9"}"#.to_vec(),
            ))
            .await
            .expect("send");
        drop(sender);

        let summary = ToolCallPump::new(echo_runtime(), Arc::new(transport))
            .run(inbound)
            .await;
        assert_eq!(summary.dispatched, 2);

        let first: Value =
            serde_json::from_slice(&published.recv().await.expect("reply").payload).expect("json");
        let second: Value =
            serde_json::from_slice(&published.recv().await.expect("reply").payload).expect("json");
        assert_eq!(first["call_id"], json!("call-1"));
        assert_eq!(second["call_id"], json!("peer-9"));
    }

    #[tokio::test]
    async fn other_channels_are_ignored() {
        let (transport, mut published) = LoopbackTransport::new();
        let (sender, inbound) = mpsc::channel(8);
        sender
            .send(InboundPacket::new("chat", br#"{"tool_name":"echo"}"#.to_vec()))
            .await
            .expect("send");
        drop(sender);

        let summary = ToolCallPump::new(echo_runtime(), Arc::new(transport))
            .run(inbound)
            .await;

        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.dispatched, 0);
        assert!(published.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancelled_pump_stops_without_reading() {
        let (transport, _published) = LoopbackTransport::new();
        let (_sender, inbound) = mpsc::channel(8);
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let summary = ToolCallPump::new(echo_runtime(), Arc::new(transport))
            .with_cancellation(cancellation)
            .run(inbound)
            .await;

        assert_eq!(summary, PumpSummary::default());
    }
}
