//! Client configuration assembled from the environment.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use parley::{ClientConfig, DispatchMode};
//!
//! let env = HashMap::from([
//!     ("DEVICE_ID", "kiosk-7"),
//!     ("ROOM_NAME", "lobby"),
//!     ("PARLEY_DISPATCH_MODE", "concurrent"),
//! ]);
//! let config = ClientConfig::from_lookup(|key| env.get(key).map(|value| value.to_string()));
//!
//! assert_eq!(config.session.device_id.as_deref(), Some("kiosk-7"));
//! assert_eq!(config.fallback_room().as_str(), "lobby");
//! assert_eq!(config.session.dispatch_mode, DispatchMode::Concurrent);
//! ```

use std::time::Duration;

use pauth::{AuthConfig, ResolveOptions};
use pcommon::RoomName;
use pobserve::{DEFAULT_LOG_FILTER, ENV_LOG_FILTER};
use psession::{DispatchMode, FarewellDelay, SessionConfig};

use crate::util::{parse_dispatch_mode, parse_flag};

pub const ENV_PARTICIPANT_NAME: &str = "PARTICIPANT_NAME";
pub const ENV_USE_LOCAL: &str = "PARLEY_USE_LOCAL";
pub const ENV_DISPATCH_MODE: &str = "PARLEY_DISPATCH_MODE";
pub const ENV_CALL_TIMEOUT_SECS: &str = "PARLEY_CALL_TIMEOUT_SECS";
pub const ENV_ASSISTANT_NAME: &str = "ASSISTANT_NAME";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub auth: AuthConfig,
    pub session: SessionConfig,
    /// Skip the remote authentication service and sign locally.
    pub use_local: bool,
    pub transport_url_override: Option<String>,
    pub assistant_name: Option<String>,
    pub session_instructions: Option<String>,
    pub call_timeout: Option<Duration>,
    pub farewell: FarewellDelay,
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            session: SessionConfig::default(),
            use_local: false,
            transport_url_override: None,
            assistant_name: None,
            session_instructions: None,
            call_timeout: None,
            farewell: FarewellDelay::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `.env` (when present) and then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as absent; unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let auth = AuthConfig::from_lookup(&lookup);

        let mut session = SessionConfig::default();
        if let Some(device_id) = &auth.device_id {
            session = session.with_device_id(device_id.clone());
        }
        if let Some(participant_name) = read(ENV_PARTICIPANT_NAME) {
            session = session.with_participant_name(participant_name);
        }
        if let Some(mode) = read(ENV_DISPATCH_MODE).and_then(|value| parse_dispatch_mode(&value)) {
            session = session.with_dispatch_mode(mode);
        }

        Self {
            auth,
            session,
            use_local: read(ENV_USE_LOCAL)
                .and_then(|value| parse_flag(&value))
                .unwrap_or(false),
            transport_url_override: None,
            assistant_name: read(ENV_ASSISTANT_NAME),
            session_instructions: None,
            call_timeout: read(ENV_CALL_TIMEOUT_SECS)
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            farewell: FarewellDelay::default(),
            log_filter: read(ENV_LOG_FILTER).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the device on both the resolver and the session.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        let device_id = device_id.into();
        self.auth = self.auth.with_device_id(device_id.clone());
        self.session = self.session.with_device_id(device_id);
        self
    }

    pub fn with_participant_name(mut self, participant_name: impl Into<String>) -> Self {
        self.session = self.session.with_participant_name(participant_name);
        self
    }

    pub fn with_local_mode(mut self, use_local: bool) -> Self {
        self.use_local = use_local;
        self
    }

    pub fn with_transport_url(mut self, transport_url: impl Into<String>) -> Self {
        self.transport_url_override = Some(transport_url.into());
        self
    }

    pub fn with_dispatch_mode(mut self, dispatch_mode: DispatchMode) -> Self {
        self.session = self.session.with_dispatch_mode(dispatch_mode);
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

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }

    pub fn with_farewell(mut self, farewell: FarewellDelay) -> Self {
        self.farewell = farewell;
        self
    }

    pub fn with_log_filter(mut self, log_filter: impl Into<String>) -> Self {
        self.log_filter = log_filter.into();
        self
    }

    pub fn fallback_room(&self) -> &RoomName {
        &self.auth.fallback_room
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        let mut options = ResolveOptions {
            use_local: self.use_local,
            ..ResolveOptions::default()
        };
        if let Some(transport_url) = &self.transport_url_override {
            options = options.with_transport_url(transport_url.clone());
        }
        if let Some(assistant_name) = &self.assistant_name {
            options = options.with_assistant_name(assistant_name.clone());
        }
        if let Some(instructions) = &self.session_instructions {
            options = options.with_session_instructions(instructions.clone());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use psession::DispatchMode;

    use super::ClientConfig;

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);

        assert!(!config.use_local);
        assert_eq!(config.fallback_room().as_str(), "default-room");
        assert_eq!(config.session.dispatch_mode, DispatchMode::Sequential);
        assert_eq!(config.log_filter, "info");
        assert!(config.call_timeout.is_none());
        assert!(config.session.device_id.is_none());
    }

    #[test]
    fn environment_populates_auth_and_session() {
        let config = config_from(&[
            ("DEVICE_ID", "kiosk-7"),
            ("LIVEKIT_API_KEY", "APIkey"),
            ("LIVEKIT_API_SECRET", "secret"),
            ("PARLEY_USE_LOCAL", "yes"),
            ("PARLEY_CALL_TIMEOUT_SECS", "15"),
            ("PARLEY_LOG", "parley=debug"),
            ("ASSISTANT_NAME", "barista"),
        ]);

        assert_eq!(config.auth.device_id.as_deref(), Some("kiosk-7"));
        assert_eq!(config.session.device_id.as_deref(), Some("kiosk-7"));
        assert!(config.auth.signing_keys.is_some());
        assert!(config.use_local);
        assert_eq!(config.call_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.log_filter, "parley=debug");
        assert_eq!(config.assistant_name.as_deref(), Some("barista"));
    }

    #[test]
    fn unparseable_values_fall_back() {
        let config = config_from(&[
            ("PARLEY_USE_LOCAL", "maybe"),
            ("PARLEY_DISPATCH_MODE", "sideways"),
            ("PARLEY_CALL_TIMEOUT_SECS", "0"),
            ("PARLEY_LOG", "   "),
        ]);

        assert!(!config.use_local);
        assert_eq!(config.session.dispatch_mode, DispatchMode::Sequential);
        assert!(config.call_timeout.is_none());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn resolve_options_carry_client_settings() {
        let options = ClientConfig::default()
            .with_local_mode(true)
            .with_transport_url("ws://media.internal:7880")
            .with_assistant_name("barista")
            .with_session_instructions("Keep it short.")
            .resolve_options();

        assert!(options.use_local);
        assert_eq!(
            options.transport_url_override.as_deref(),
            Some("ws://media.internal:7880")
        );
        assert_eq!(options.assistant_name.as_deref(), Some("barista"));
        assert_eq!(options.session_instructions.as_deref(), Some("Keep it short."));
        assert!(options.initial_transcripts.is_none());
    }

    #[test]
    fn with_device_id_sets_both_layers() {
        let config = ClientConfig::default().with_device_id("kiosk-9");

        assert_eq!(config.auth.device_id.as_deref(), Some("kiosk-9"));
        assert_eq!(config.session.device_id.as_deref(), Some("kiosk-9"));
    }
}
