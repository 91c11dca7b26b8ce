//! Local room-token synthesis.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use pcommon::{ParticipantIdentity, RoomName};

use crate::{AuthError, DEFAULT_TOKEN_TTL, SecretString, SigningKeys};

/// Who the synthesized token admits, and to which room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub identity: ParticipantIdentity,
    pub display_name: String,
    pub room: RoomName,
}

impl TokenGrant {
    /// Applies the local identity defaults: an empty participant name becomes
    /// `participant-<room>`, and the display name mirrors the identity.
    pub fn for_participant(participant_name: &str, room: RoomName) -> Self {
        let identity = if participant_name.trim().is_empty() {
            ParticipantIdentity::new(format!("participant-{room}"))
        } else {
            ParticipantIdentity::new(participant_name)
        };

        Self {
            display_name: identity.as_str().to_string(),
            identity,
            room,
        }
    }
}

pub trait TokenSigner: Send + Sync {
    fn sign(&self, grant: &TokenGrant) -> Result<SecretString, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room_join: bool,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: String,
    pub name: String,
    pub nbf: u64,
    pub exp: u64,
    pub jti: String,
    pub video: VideoGrant,
}

/// HS256 signer keyed by the configured API key pair.
#[derive(Debug, Clone)]
pub struct JwtTokenSigner {
    keys: Option<SigningKeys>,
    ttl: Duration,
}

impl JwtTokenSigner {
    pub fn new(keys: Option<SigningKeys>) -> Self {
        Self {
            keys,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn claims_for(&self, key_id: &str, grant: &TokenGrant, now: Duration) -> AccessClaims {
        let issued = now.as_secs();
        AccessClaims {
            iss: key_id.to_string(),
            sub: grant.identity.as_str().to_string(),
            name: grant.display_name.clone(),
            nbf: issued,
            exp: issued + self.ttl.as_secs(),
            jti: format!("{}-{}", grant.identity, now.as_nanos()),
            video: VideoGrant {
                room_join: true,
                room: grant.room.as_str().to_string(),
            },
        }
    }
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, grant: &TokenGrant) -> Result<SecretString, AuthError> {
        let keys = self
            .keys
            .as_ref()
            .filter(|keys| !keys.key_id.trim().is_empty() && !keys.secret.is_empty())
            .ok_or_else(|| {
                AuthError::configuration("LIVEKIT_API_KEY and LIVEKIT_API_SECRET must be set")
            })?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| AuthError::signing(format!("system clock before epoch: {err}")))?;
        let claims = self.claims_for(&keys.key_id, grant, now);

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(keys.secret.expose().as_bytes()),
        )
        .map(SecretString::new)
        .map_err(|err| AuthError::signing(format!("failed to sign room token: {err}")).classify())
    }
}
