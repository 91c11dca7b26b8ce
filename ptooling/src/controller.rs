//! Set-once indirection through which tool handlers can end the hosting session.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! use ptooling::{SessionControl, SessionController};
//!
//! #[derive(Default)]
//! struct Flag(AtomicBool);
//!
//! impl SessionControl for Flag {
//!     fn request_disconnect(&self) {
//!         self.0.store(true, Ordering::SeqCst);
//!     }
//! }
//!
//! let controller = SessionController::new();
//! assert!(!controller.request_disconnect());
//!
//! let flag = Arc::new(Flag::default());
//! controller.bind(flag.clone()).ok().expect("first bind succeeds");
//! assert!(controller.request_disconnect());
//! assert!(flag.0.load(Ordering::SeqCst));
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

/// Implemented by whatever owns the transport and can tear the session down.
pub trait SessionControl: Send + Sync {
    fn request_disconnect(&self);
}

/// Clonable handle to a write-once [`SessionControl`] slot.
///
/// Clones share the slot, so a controller handed to a dispatcher before the
/// session exists observes the binding made later.
#[derive(Clone, Default)]
pub struct SessionController {
    slot: Arc<OnceLock<Arc<dyn SessionControl>>>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller whose slot is already filled with `control`.
    pub fn bound(control: Arc<dyn SessionControl>) -> Self {
        Self {
            slot: Arc::new(OnceLock::from(control)),
        }
    }

    /// Binds the slot. A second bind is rejected and hands the control back.
    pub fn bind(&self, control: Arc<dyn SessionControl>) -> Result<(), Arc<dyn SessionControl>> {
        self.slot.set(control)
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Returns whether a bound control received the request.
    pub fn request_disconnect(&self) -> bool {
        match self.slot.get() {
            Some(control) => {
                control.request_disconnect();
                true
            }
            None => false,
        }
    }
}

impl Debug for SessionController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("bound", &self.is_bound())
            .finish()
    }
}
