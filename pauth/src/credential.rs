//! Room-joining credential produced by the resolver.

use pcommon::RoomName;

use crate::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Remote,
    Local,
}

/// Token, room and transport URL for one connection attempt. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: SecretString,
    pub room: RoomName,
    pub transport_url: String,
    pub source: CredentialSource,
}

impl Credential {
    pub fn token(&self) -> &str {
        self.token.expose()
    }

    pub fn is_local(&self) -> bool {
        self.source == CredentialSource::Local
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("room", &self.room)
            .field("transport_url", &self.transport_url)
            .field("source", &self.source)
            .finish()
    }
}
