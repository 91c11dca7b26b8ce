//! Resolver configuration, loaded from the environment or built explicitly.
//!
//! ```rust
//! use pauth::{AuthConfig, SigningKeys};
//!
//! let config = AuthConfig::default()
//!     .with_endpoint("https://auth.example.com/api/authenticate")
//!     .with_device_id("kiosk-7")
//!     .with_signing_keys(SigningKeys::new("APIkey", "secret"));
//!
//! assert_eq!(config.fallback_room.as_str(), "default-room");
//! assert!(config.signing_keys.is_some());
//! ```

use std::time::Duration;

use pcommon::RoomName;

use crate::SecretString;

pub const ENV_DEVICE_ID: &str = "DEVICE_ID";
pub const ENV_AUTH_API_URL: &str = "AUTH_API_URL";
pub const ENV_AUTH_API_KEY: &str = "AUTH_API_KEY";
/// Older deployments provision the device key under this name.
pub const ENV_LEGACY_API_KEY: &str = "LIGHTBERRY_API_KEY";
pub const ENV_AUTH_TIMEOUT_SECS: &str = "AUTH_TIMEOUT_SECS";
pub const ENV_SIGNING_KEY_ID: &str = "LIVEKIT_API_KEY";
pub const ENV_SIGNING_SECRET: &str = "LIVEKIT_API_SECRET";
pub const ENV_TRANSPORT_URL: &str = "LIVEKIT_URL";
pub const ENV_FALLBACK_ROOM: &str = "ROOM_NAME";

pub const DEFAULT_FALLBACK_ROOM: &str = "default-room";
pub const DEFAULT_LOCAL_TRANSPORT_URL: &str = "ws://localhost:7880";
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Key pair used to sign room tokens locally.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeys {
    pub key_id: String,
    pub secret: SecretString,
}

impl SigningKeys {
    pub fn new(key_id: impl Into<String>, secret: impl Into<SecretString>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("key_id", &self.key_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub endpoint: Option<String>,
    pub device_id: Option<String>,
    pub api_key: Option<SecretString>,
    pub signing_keys: Option<SigningKeys>,
    pub transport_url: Option<String>,
    pub fallback_room: RoomName,
    pub remote_timeout: Duration,
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            device_id: None,
            api_key: None,
            signing_keys: None,
            transport_url: None,
            fallback_room: RoomName::new(DEFAULT_FALLBACK_ROOM),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

impl AuthConfig {
    /// Reads `.env` (when present) and then the process environment.
    ///
    /// There is no built-in authentication endpoint: unless `AUTH_API_URL`
    /// is set, every resolve skips the remote attempt and signs locally.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as absent.
    ///
    /// `AUTH_API_KEY` wins over `LIGHTBERRY_API_KEY` when both are set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let signing_keys = match (read(ENV_SIGNING_KEY_ID), read(ENV_SIGNING_SECRET)) {
            (Some(key_id), Some(secret)) => Some(SigningKeys::new(key_id, secret)),
            _ => None,
        };

        let remote_timeout = read(ENV_AUTH_TIMEOUT_SECS)
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT);

        Self {
            endpoint: read(ENV_AUTH_API_URL),
            device_id: read(ENV_DEVICE_ID),
            api_key: read(ENV_AUTH_API_KEY)
                .or_else(|| read(ENV_LEGACY_API_KEY))
                .map(SecretString::new),
            signing_keys,
            transport_url: read(ENV_TRANSPORT_URL),
            fallback_room: read(ENV_FALLBACK_ROOM)
                .map(RoomName::new)
                .unwrap_or_else(|| RoomName::new(DEFAULT_FALLBACK_ROOM)),
            remote_timeout,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_signing_keys(mut self, signing_keys: SigningKeys) -> Self {
        self.signing_keys = Some(signing_keys);
        self
    }

    pub fn with_transport_url(mut self, transport_url: impl Into<String>) -> Self {
        self.transport_url = Some(transport_url.into());
        self
    }

    pub fn with_fallback_room(mut self, fallback_room: impl Into<RoomName>) -> Self {
        self.fallback_room = fallback_room.into();
        self
    }

    pub fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn lookup_populates_every_field() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            (ENV_DEVICE_ID, "kiosk-7"),
            (ENV_AUTH_API_URL, "https://auth.example.com/api/authenticate"),
            (ENV_AUTH_API_KEY, "device-key"),
            (ENV_SIGNING_KEY_ID, "APIabc"),
            (ENV_SIGNING_SECRET, "s3cret"),
            (ENV_TRANSPORT_URL, "wss://rooms.example.com"),
            (ENV_FALLBACK_ROOM, "lobby"),
            (ENV_AUTH_TIMEOUT_SECS, "3"),
        ]));

        assert_eq!(config.device_id.as_deref(), Some("kiosk-7"));
        assert_eq!(config.fallback_room.as_str(), "lobby");
        assert_eq!(config.remote_timeout, Duration::from_secs(3));
        assert_eq!(
            config.signing_keys.as_ref().map(|keys| keys.key_id.as_str()),
            Some("APIabc")
        );
        assert_eq!(config.transport_url.as_deref(), Some("wss://rooms.example.com"));
    }

    #[test]
    fn legacy_api_key_is_used_when_the_primary_is_absent() {
        let legacy = AuthConfig::from_lookup(lookup_from(&[(ENV_LEGACY_API_KEY, "old-key")]));
        assert_eq!(legacy.api_key.as_ref().map(SecretString::expose), Some("old-key"));
        assert!(legacy.endpoint.is_none());

        let both = AuthConfig::from_lookup(lookup_from(&[
            (ENV_AUTH_API_KEY, "new-key"),
            (ENV_LEGACY_API_KEY, "old-key"),
        ]));
        assert_eq!(both.api_key.as_ref().map(SecretString::expose), Some("new-key"));
    }

    #[test]
    fn half_configured_signing_keys_are_absent() {
        let config = AuthConfig::from_lookup(lookup_from(&[(ENV_SIGNING_KEY_ID, "APIabc")]));
        assert!(config.signing_keys.is_none());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            (ENV_FALLBACK_ROOM, "   "),
            (ENV_DEVICE_ID, ""),
            (ENV_AUTH_TIMEOUT_SECS, "soon"),
        ]));

        assert_eq!(config.fallback_room.as_str(), DEFAULT_FALLBACK_ROOM);
        assert!(config.device_id.is_none());
        assert_eq!(config.remote_timeout, DEFAULT_REMOTE_TIMEOUT);
    }

    #[test]
    fn signing_keys_debug_hides_secret() {
        let keys = SigningKeys::new("APIabc", "s3cret");
        let rendered = format!("{keys:?}");
        assert!(rendered.contains("APIabc"));
        assert!(!rendered.contains("s3cret"));
    }
}
