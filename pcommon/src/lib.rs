//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use pcommon::{MetadataMap, ParticipantIdentity, RoomName, SessionId};
//!
//! let session = SessionId::from("session-1");
//! let room = RoomName::new("default-room");
//! let identity = ParticipantIdentity::from("sdk-user-kiosk");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("device".to_string(), "kiosk".to_string());
//!
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(room.to_string(), "default-room");
//! assert!(!identity.is_empty());
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use pcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use pcommon::{RoomName, SessionId};
    //!
    //! let session = SessionId::new("session-42");
    //! let room = RoomName::from("lobby");
    //!
    //! assert_eq!(session.to_string(), "session-42");
    //! assert_eq!(room.as_str(), "lobby");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_newtype {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }

                pub fn is_empty(&self) -> bool {
                    self.0.trim().is_empty()
                }

                pub fn into_inner(self) -> String {
                    self.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }
        };
    }

    string_newtype!(
        /// Identifies one connected client session.
        SessionId
    );

    string_newtype!(
        /// Name of the room a credential grants access to.
        RoomName
    );

    string_newtype!(
        /// Identity a participant joins the room under.
        ParticipantIdentity
    );
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use pcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //! let replaced = registry.insert("alpha".to_string(), 2_u32);
    //!
    //! assert_eq!(replaced, Some(1));
    //! assert_eq!(registry.get("alpha"), Some(&2));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts `value`, returning whatever was previously stored under `key`.
        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, ParticipantIdentity, RoomName, SessionId};
pub use future::BoxFuture;
pub use registry::Registry;
