//! Connection state of a client session.

use pcommon::{ParticipantIdentity, RoomName};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connected,
}

/// Identity, room and transport of the current connection; all `None` while disconnected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub participant_identity: Option<ParticipantIdentity>,
    pub room: Option<RoomName>,
    pub transport_url: Option<String>,
    pub status: SessionStatus,
}

impl SessionState {
    pub fn connected(
        participant_identity: ParticipantIdentity,
        room: RoomName,
        transport_url: impl Into<String>,
    ) -> Self {
        Self {
            participant_identity: Some(participant_identity),
            room: Some(room),
            transport_url: Some(transport_url.into()),
            status: SessionStatus::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }
}
