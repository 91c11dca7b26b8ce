//! Remote-first credential resolution with a local signing fallback.
//!
//! ```rust,no_run
//! use pauth::{AuthConfig, CredentialResolver, ResolveOptions};
//!
//! # async fn run() -> Result<(), pauth::AuthError> {
//! let resolver = CredentialResolver::from_config(AuthConfig::from_env())?;
//! let credential = resolver
//!     .resolve("sdk-user-kiosk-7", "default-room", &ResolveOptions::default())
//!     .await?;
//! println!("joining {} via {}", credential.room, credential.transport_url);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use pcommon::RoomName;

use crate::{
    AuthConfig, AuthError, AuthErrorKind, AuthHooks, Credential, CredentialSource,
    DEFAULT_LOCAL_TRANSPORT_URL, HttpRemoteAuthenticator, JwtTokenSigner, NoopAuthHooks,
    RemoteAuthRequest, RemoteAuthResponse, RemoteAuthenticator, SecretString, TokenGrant,
    TokenSigner,
};

/// Result of one remote attempt.
#[derive(Debug)]
pub enum RemoteOutcome {
    Issued(Credential),
    /// Recoverable; the resolver continues with local synthesis.
    SoftFailure(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOptions {
    pub use_local: bool,
    pub transport_url_override: Option<String>,
    pub assistant_name: Option<String>,
    pub session_instructions: Option<String>,
    pub initial_transcripts: Option<Vec<Value>>,
}

impl ResolveOptions {
    pub fn local() -> Self {
        Self {
            use_local: true,
            ..Self::default()
        }
    }

    pub fn with_transport_url(mut self, transport_url: impl Into<String>) -> Self {
        self.transport_url_override = Some(transport_url.into());
        self
    }

    pub fn with_assistant_name(mut self, assistant_name: impl Into<String>) -> Self {
        self.assistant_name = Some(assistant_name.into());
        self
    }

    pub fn with_session_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.session_instructions = Some(instructions.into());
        self
    }

    pub fn with_initial_transcripts(mut self, transcripts: Vec<Value>) -> Self {
        self.initial_transcripts = Some(transcripts);
        self
    }
}

#[derive(Clone)]
pub struct CredentialResolver {
    config: AuthConfig,
    remote: Option<Arc<dyn RemoteAuthenticator>>,
    signer: Arc<dyn TokenSigner>,
    hooks: Arc<dyn AuthHooks>,
}

impl CredentialResolver {
    pub fn new(
        config: AuthConfig,
        remote: Option<Arc<dyn RemoteAuthenticator>>,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self {
            config,
            remote,
            signer,
            hooks: Arc::new(NoopAuthHooks),
        }
    }

    /// HTTP authenticator when an endpoint is configured, JWT signer otherwise.
    pub fn from_config(config: AuthConfig) -> Result<Self, AuthError> {
        let remote = HttpRemoteAuthenticator::from_config(&config)?
            .map(|authenticator| Arc::new(authenticator) as Arc<dyn RemoteAuthenticator>);
        let signer = JwtTokenSigner::new(config.signing_keys.clone()).with_ttl(config.token_ttl);
        Ok(Self::new(config, remote, Arc::new(signer)))
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn AuthHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn resolve(
        &self,
        participant_name: &str,
        fallback_room: impl Into<RoomName>,
        options: &ResolveOptions,
    ) -> Result<Credential, AuthError> {
        let fallback_room = fallback_room.into();
        let fallback_room = if fallback_room.is_empty() {
            self.config.fallback_room.clone()
        } else {
            fallback_room
        };

        if options.use_local {
            self.hooks.on_remote_skipped("local mode requested");
        } else {
            match self.fetch_remote(participant_name, options).await {
                RemoteOutcome::Issued(credential) => {
                    self.hooks.on_resolved(&credential);
                    return Ok(credential);
                }
                RemoteOutcome::SoftFailure(_) => {}
            }
        }

        self.hooks.on_local_fallback(&fallback_room);
        match self.synthesize_local(participant_name, fallback_room, options) {
            Ok(credential) => {
                self.hooks.on_resolved(&credential);
                Ok(credential)
            }
            Err(error) => {
                self.hooks.on_fatal(&error);
                Err(error)
            }
        }
    }

    /// One bounded remote attempt. Every remote-side problem, quota rejections
    /// included, comes back as a soft failure.
    pub async fn fetch_remote(
        &self,
        participant_name: &str,
        options: &ResolveOptions,
    ) -> RemoteOutcome {
        let Some(remote) = &self.remote else {
            let reason = "no remote authentication endpoint configured";
            self.hooks.on_remote_skipped(reason);
            return RemoteOutcome::SoftFailure(reason.to_string());
        };
        let Some(device_id) = self
            .config
            .device_id
            .as_deref()
            .filter(|device_id| !device_id.trim().is_empty())
        else {
            let reason = "device identifier is not configured";
            self.hooks.on_remote_skipped(reason);
            return RemoteOutcome::SoftFailure(reason.to_string());
        };

        let mut request = RemoteAuthRequest::new(device_id, participant_name);
        request.assistant_name = options.assistant_name.clone();
        request.session_instructions = options.session_instructions.clone();
        request.initial_transcripts = options.initial_transcripts.clone();

        self.hooks.on_remote_attempt(participant_name);
        let started = Instant::now();
        let attempt =
            tokio::time::timeout(self.config.remote_timeout, remote.authenticate(&request)).await;

        let outcome = match attempt {
            Err(_) => RemoteOutcome::SoftFailure(format!(
                "authentication request timed out after {:?}",
                self.config.remote_timeout
            )),
            Ok(Err(error)) => RemoteOutcome::SoftFailure(error.message),
            Ok(Ok(response)) => self.interpret_response(response, options),
        };

        match &outcome {
            RemoteOutcome::Issued(credential) => {
                self.hooks.on_remote_success(&credential.room, started.elapsed())
            }
            RemoteOutcome::SoftFailure(reason) => {
                self.hooks.on_remote_soft_failure(reason, started.elapsed())
            }
        }
        outcome
    }

    fn interpret_response(
        &self,
        response: RemoteAuthResponse,
        options: &ResolveOptions,
    ) -> RemoteOutcome {
        if !response.success {
            let reason = response
                .error
                .unwrap_or_else(|| "authentication service reported failure".to_string());
            return RemoteOutcome::SoftFailure(reason);
        }

        let token = response
            .livekit_token
            .filter(|token| !token.trim().is_empty());
        let room = response.room_name.filter(|room| !room.trim().is_empty());
        let (Some(token), Some(room)) = (token, room) else {
            return RemoteOutcome::SoftFailure(
                "authentication response is missing the token or room name".to_string(),
            );
        };

        RemoteOutcome::Issued(Credential {
            token: SecretString::new(token),
            room: RoomName::new(room),
            transport_url: self.transport_url(options, response.livekit_url.as_deref()),
            source: CredentialSource::Remote,
        })
    }

    /// Signs exactly once for `room`.
    pub fn synthesize_local(
        &self,
        participant_name: &str,
        room: RoomName,
        options: &ResolveOptions,
    ) -> Result<Credential, AuthError> {
        let grant = TokenGrant::for_participant(participant_name, room);
        let token = self.signer.sign(&grant).map_err(|error| {
            match error.classify() {
                // remote kinds never leave the resolver
                soft if soft.kind == AuthErrorKind::Remote => AuthError::signing(soft.message),
                other => other,
            }
        })?;

        Ok(Credential {
            token,
            room: grant.room,
            transport_url: self.transport_url(options, None),
            source: CredentialSource::Local,
        })
    }

    fn transport_url(&self, options: &ResolveOptions, remote_url: Option<&str>) -> String {
        options
            .transport_url_override
            .as_deref()
            .or(remote_url)
            .or(self.config.transport_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_LOCAL_TRANSPORT_URL)
            .to_string()
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("config", &self.config)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}
