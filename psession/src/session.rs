//! Client session: credential bootstrap, tool serving, and teardown.
//!
//! ```rust
//! use psession::{Session, SessionConfig, participant_name_for_device};
//!
//! let session = Session::new(SessionConfig::default().with_device_id("kiosk-7"));
//!
//! assert_eq!(session.participant_name(), participant_name_for_device("kiosk-7"));
//! assert_eq!(session.data_channel_name(), "tool_calls");
//! assert!(!session.is_connected());
//! ```

use std::sync::Arc;
use std::time::Duration;

use pauth::{Credential, CredentialResolver, ResolveOptions, TokenGrant};
use pcommon::{RoomName, SessionId};
use ptooling::{
    SessionControl, SessionController, TOOL_CALL_CHANNEL, ToolDispatcher, ToolRuntime,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    ChannelTransport, DEFAULT_DRAIN_GRACE, DispatchMode, InboundPacket, NoopSessionHooks,
    PumpSummary, SessionError, SessionHooks, SessionState, ToolCallPump,
};

pub fn participant_name_for_device(device_id: &str) -> String {
    format!("sdk-user-{device_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub device_id: Option<String>,
    /// Overrides the name derived from `device_id`.
    pub participant_name: Option<String>,
    pub data_channel: String,
    pub dispatch_mode: DispatchMode,
    pub drain_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_id: None,
            participant_name: None,
            data_channel: TOOL_CALL_CHANNEL.to_string(),
            dispatch_mode: DispatchMode::default(),
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }
}

impl SessionConfig {
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_participant_name(mut self, participant_name: impl Into<String>) -> Self {
        self.participant_name = Some(participant_name.into());
        self
    }

    pub fn with_data_channel(mut self, data_channel: impl Into<String>) -> Self {
        self.data_channel = data_channel.into();
        self
    }

    pub fn with_dispatch_mode(mut self, dispatch_mode: DispatchMode) -> Self {
        self.dispatch_mode = dispatch_mode;
        self
    }

    pub fn with_drain_grace(mut self, drain_grace: Duration) -> Self {
        self.drain_grace = drain_grace;
        self
    }
}

/// Disconnect signal for one connection. Cheap to clone and safe to trigger
/// from any task, including tool handlers.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    cancellation: CancellationToken,
}

impl SessionHandle {
    pub fn is_disconnect_requested(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl SessionControl for SessionHandle {
    fn request_disconnect(&self) {
        self.cancellation.cancel();
    }
}

pub struct Session {
    config: SessionConfig,
    state: SessionState,
    cancellation: CancellationToken,
    hooks: Arc<dyn SessionHooks>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::default(),
            cancellation: CancellationToken::new(),
            hooks: Arc::new(NoopSessionHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn participant_name(&self) -> String {
        if let Some(name) = self
            .config
            .participant_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
        {
            return name.to_string();
        }

        self.config
            .device_id
            .as_deref()
            .filter(|device_id| !device_id.trim().is_empty())
            .map(participant_name_for_device)
            .unwrap_or_default()
    }

    /// Resolves a credential and moves to Connected. The returned credential
    /// carries the token the media transport needs to join the room.
    pub async fn connect(
        &mut self,
        resolver: &CredentialResolver,
        fallback_room: impl Into<RoomName>,
        options: &ResolveOptions,
    ) -> Result<Credential, SessionError> {
        if self.is_connected() {
            let error = SessionError::already_connected("session is already connected");
            self.hooks.on_connect_failure(&error);
            return Err(error);
        }

        let participant_name = self.participant_name();
        let credential = match resolver
            .resolve(&participant_name, fallback_room, options)
            .await
        {
            Ok(credential) => credential,
            Err(error) => {
                let error = SessionError::from(error);
                self.hooks.on_connect_failure(&error);
                return Err(error);
            }
        };

        let identity = TokenGrant::for_participant(&participant_name, credential.room.clone())
            .identity;
        if self.cancellation.is_cancelled() {
            self.cancellation = CancellationToken::new();
        }
        self.state = SessionState::connected(
            identity,
            credential.room.clone(),
            credential.transport_url.clone(),
        );
        self.hooks.on_connected(&self.state);
        Ok(credential)
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            cancellation: self.cancellation.clone(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn session_id(&self) -> SessionId {
        match (&self.state.room, &self.state.participant_identity) {
            (Some(room), Some(identity)) => SessionId::new(format!("{room}/{identity}")),
            _ => SessionId::new("unbound"),
        }
    }

    /// Binds `dispatcher` to this connection: its controller reaches this
    /// session's handle and its dispatches stop once the session closes.
    ///
    /// An unbound controller is bound in place; one already bound to an
    /// earlier connection is replaced by one bound to this session.
    pub fn attach(&self, dispatcher: ToolDispatcher) -> ToolDispatcher {
        let controller = dispatcher.controller().clone();
        let controller = match controller.bind(Arc::new(self.handle())) {
            Ok(()) => controller,
            Err(handle) => SessionController::bound(handle),
        };

        dispatcher
            .with_controller(controller)
            .with_cancellation(self.cancellation.clone())
            .with_session_id(self.session_id())
    }

    /// Runs the tool-call pump until a disconnect is requested or `inbound`
    /// closes, then closes `transport` and returns to Disconnected.
    pub async fn serve_tools(
        &mut self,
        transport: Arc<dyn ChannelTransport>,
        inbound: mpsc::Receiver<InboundPacket>,
        runtime: Arc<dyn ToolRuntime>,
    ) -> Result<PumpSummary, SessionError> {
        if !self.is_connected() {
            return Err(SessionError::not_connected(
                "serving tools requires a connected session",
            ));
        }

        let summary = ToolCallPump::new(runtime, Arc::clone(&transport))
            .with_hooks(Arc::clone(&self.hooks))
            .with_channel(self.config.data_channel.clone())
            .with_mode(self.config.dispatch_mode)
            .with_cancellation(self.cancellation.clone())
            .with_drain_grace(self.config.drain_grace)
            .run(inbound)
            .await;

        let reason = if self.cancellation.is_cancelled() {
            "disconnect requested"
        } else {
            "inbound channel closed"
        };
        let closed = transport.close().await;
        self.teardown(reason);

        closed.map(|()| summary)
    }

    /// Idempotent.
    pub fn disconnect(&mut self) {
        self.teardown("disconnected by client");
    }

    fn teardown(&mut self, reason: &str) {
        self.cancellation.cancel();
        if self.state.is_connected() {
            self.state = SessionState::default();
            self.hooks.on_disconnected(reason);
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn room_name(&self) -> Option<&RoomName> {
        self.state.room.as_ref()
    }

    pub fn data_channel_name(&self) -> &str {
        &self.config.data_channel
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
