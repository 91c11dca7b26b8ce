//! Data-channel seam between the session and whatever room transport carries it.
//!
//! ```rust
//! use psession::{ChannelTransport, LoopbackTransport};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (transport, mut published) = LoopbackTransport::new();
//! transport.publish("tool_calls", b"{}".to_vec()).await.expect("publish");
//!
//! let packet = published.recv().await.expect("packet");
//! assert_eq!(packet.channel, "tool_calls");
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use pcommon::{BoxFuture, ParticipantIdentity};
use tokio::sync::mpsc;

use crate::SessionError;

/// A data packet received from the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPacket {
    pub channel: String,
    pub payload: Vec<u8>,
    pub sender: Option<ParticipantIdentity>,
}

impl InboundPacket {
    pub fn new(channel: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: impl Into<ParticipantIdentity>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPacket {
    pub channel: String,
    pub payload: Vec<u8>,
}

pub trait ChannelTransport: Send + Sync {
    fn publish<'a>(
        &'a self,
        channel: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), SessionError>>;

    fn close<'a>(&'a self) -> BoxFuture<'a, Result<(), SessionError>>;
}

/// In-process transport that forwards every published packet to a receiver.
#[derive(Debug)]
pub struct LoopbackTransport {
    sender: mpsc::UnboundedSender<OutboundPacket>,
    closed: AtomicBool,
}

impl LoopbackTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundPacket>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                closed: AtomicBool::new(false),
            },
            receiver,
        )
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl ChannelTransport for LoopbackTransport {
    fn publish<'a>(
        &'a self,
        channel: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            if self.is_closed() {
                return Err(SessionError::transport("transport is closed"));
            }
            self.sender
                .send(OutboundPacket {
                    channel: channel.to_string(),
                    payload,
                })
                .map_err(|_| SessionError::transport("packet receiver dropped"))
        })
    }

    fn close<'a>(&'a self) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        })
    }
}
