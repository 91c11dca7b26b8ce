//! Credential resolution for joining a real-time room.
//!
//! The resolver asks a remote authentication service for a room token first
//! and, when that attempt softly fails, signs a token locally for a fallback
//! room. Every remote-side problem falls back; a quota rejection or missing
//! signing keys during local synthesis are fatal.
//!
//! ```rust
//! use pauth::{AuthConfig, CredentialResolver, CredentialSource, ResolveOptions, SigningKeys};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = AuthConfig::default().with_signing_keys(SigningKeys::new("APIkey", "secret"));
//! let resolver = CredentialResolver::from_config(config).expect("resolver builds");
//!
//! let credential = resolver
//!     .resolve("alice", "lobby", &ResolveOptions::local())
//!     .await
//!     .expect("local token");
//!
//! assert_eq!(credential.source, CredentialSource::Local);
//! assert_eq!(credential.room.as_str(), "lobby");
//! assert_eq!(credential.transport_url, "ws://localhost:7880");
//! # }
//! ```

mod config;
mod credential;
mod error;
mod hooks;
mod remote;
mod resolver;
mod secret;
mod signer;

pub mod prelude {
    pub use crate::{
        AuthConfig, AuthError, AuthErrorKind, AuthHooks, Credential, CredentialResolver,
        CredentialSource, ResolveOptions, SecretString, SigningKeys,
    };
}

pub use config::{
    AuthConfig, DEFAULT_FALLBACK_ROOM, DEFAULT_LOCAL_TRANSPORT_URL, DEFAULT_REMOTE_TIMEOUT,
    DEFAULT_TOKEN_TTL, ENV_AUTH_API_KEY, ENV_AUTH_API_URL, ENV_AUTH_TIMEOUT_SECS, ENV_DEVICE_ID,
    ENV_FALLBACK_ROOM, ENV_LEGACY_API_KEY, ENV_SIGNING_KEY_ID, ENV_SIGNING_SECRET,
    ENV_TRANSPORT_URL, SigningKeys,
};
pub use credential::{Credential, CredentialSource};
pub use error::{AuthError, AuthErrorKind};
pub use hooks::{AuthHooks, NoopAuthHooks};
pub use remote::{
    HttpRemoteAuthenticator, RemoteAuthRequest, RemoteAuthResponse, RemoteAuthenticator,
};
pub use resolver::{CredentialResolver, RemoteOutcome, ResolveOptions};
pub use secret::SecretString;
pub use signer::{AccessClaims, JwtTokenSigner, TokenGrant, TokenSigner, VideoGrant};
