//! Runtime wiring: resolver, session, and dispatcher assembled from one config.

use std::sync::Arc;

use pauth::{AuthError, AuthHooks, Credential, CredentialResolver, NoopAuthHooks};
use pobserve::{
    MetricsObservabilityHooks, SafeAuthHooks, SafeSessionHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
use psession::{
    ChannelTransport, END_SESSION_TOOL, InboundPacket, NoopSessionHooks, PumpSummary, Session,
    SessionError, SessionHandle, SessionHooks, register_session_tools,
};
use ptooling::{NoopToolRuntimeHooks, ToolDispatcher, ToolRegistry, ToolRuntime, ToolRuntimeHooks};
use tokio::sync::mpsc;

use crate::ClientConfig;

/// Hook set installed on every layer of a [`ToolClient`].
#[derive(Clone)]
pub struct ClientHooks {
    pub tool: Arc<dyn ToolRuntimeHooks>,
    pub auth: Arc<dyn AuthHooks>,
    pub session: Arc<dyn SessionHooks>,
}

impl ClientHooks {
    /// Structured `tracing` events, panic-isolated.
    pub fn tracing() -> Self {
        Self {
            tool: Arc::new(SafeToolHooks::new(TracingObservabilityHooks)),
            auth: Arc::new(SafeAuthHooks::new(TracingObservabilityHooks)),
            session: Arc::new(SafeSessionHooks::new(TracingObservabilityHooks)),
        }
    }

    pub fn metrics() -> Self {
        Self {
            tool: Arc::new(SafeToolHooks::new(MetricsObservabilityHooks)),
            auth: Arc::new(SafeAuthHooks::new(MetricsObservabilityHooks)),
            session: Arc::new(SafeSessionHooks::new(MetricsObservabilityHooks)),
        }
    }

    pub fn noop() -> Self {
        Self {
            tool: Arc::new(NoopToolRuntimeHooks),
            auth: Arc::new(NoopAuthHooks),
            session: Arc::new(NoopSessionHooks),
        }
    }
}

impl Default for ClientHooks {
    fn default() -> Self {
        Self::tracing()
    }
}

/// A device-side client: resolves a credential, joins the room, and answers
/// tool calls until a tool or the caller ends the session.
pub struct ToolClient {
    config: ClientConfig,
    resolver: CredentialResolver,
    session: Session,
    dispatcher: ToolDispatcher,
}

pub fn build_client(config: ClientConfig, registry: ToolRegistry) -> Result<ToolClient, AuthError> {
    build_client_with(config, registry, ClientHooks::default())
}

/// Registers `end_session` unless `registry` already carries one.
pub fn build_client_with(
    config: ClientConfig,
    mut registry: ToolRegistry,
    hooks: ClientHooks,
) -> Result<ToolClient, AuthError> {
    if !registry.contains(END_SESSION_TOOL) {
        register_session_tools(&mut registry, config.farewell);
    }

    let resolver = CredentialResolver::from_config(config.auth.clone())?.with_hooks(hooks.auth);
    let session = Session::new(config.session.clone()).with_hooks(hooks.session);

    let mut dispatcher = ToolDispatcher::new(Arc::new(registry)).with_hooks(hooks.tool);
    if let Some(call_timeout) = config.call_timeout {
        dispatcher = dispatcher.with_call_timeout(call_timeout);
    }

    Ok(ToolClient {
        config,
        resolver,
        session,
        dispatcher,
    })
}

impl ToolClient {
    /// Swaps in a resolver built elsewhere, e.g. one with a custom signer.
    pub fn with_resolver(mut self, resolver: CredentialResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        self.dispatcher.registry()
    }

    /// Lets another task end the session.
    pub fn handle(&self) -> SessionHandle {
        self.session.handle()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Resolves a credential for the configured fallback room and binds the
    /// dispatcher to the new connection.
    pub async fn connect(&mut self) -> Result<Credential, SessionError> {
        let options = self.config.resolve_options();
        let credential = self
            .session
            .connect(&self.resolver, self.config.fallback_room().clone(), &options)
            .await?;

        self.dispatcher = self.session.attach(self.dispatcher.clone());
        Ok(credential)
    }

    /// Answers tool calls from `inbound` until the session ends.
    pub async fn serve(
        &mut self,
        transport: Arc<dyn ChannelTransport>,
        inbound: mpsc::Receiver<InboundPacket>,
    ) -> Result<PumpSummary, SessionError> {
        let runtime: Arc<dyn ToolRuntime> = Arc::new(self.dispatcher.clone());
        self.session.serve_tools(transport, inbound, runtime).await
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }
}

impl std::fmt::Debug for ToolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("tools", &self.dispatcher.registry().names())
            .finish()
    }
}
