//! Codec boundary between typed messages and frames.

use crate::commands::Command;
use crate::error::ProtocolResult;
use crate::notifications::Notification;

/// Turns commands into frames and complete frames into notifications.
///
/// The session layer only talks to the wire through this trait, so tests can
/// substitute a codec that produces arbitrary notifications.
pub trait Codec {
    /// Encode a command into a complete frame.
    fn encode(&self, command: &Command) -> ProtocolResult<Vec<u8>>;

    /// Parse a complete frame into a notification.
    fn parse(&self, frame: &[u8]) -> ProtocolResult<Notification>;
}

/// The SEM6000 wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sem6000Codec;

impl Codec for Sem6000Codec {
    fn encode(&self, command: &Command) -> ProtocolResult<Vec<u8>> {
        command.encode()
    }

    fn parse(&self, frame: &[u8]) -> ProtocolResult<Notification> {
        Notification::decode(frame)
    }
}
