//! Error types for the session layer.

use sem6000_protocol::{Notification, NotificationKind, ProtocolError};
use thiserror::Error;

/// Errors raised by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error on the underlying connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The other end went away.
    #[error("transport disconnected")]
    Disconnected,

    /// No device matched the requested address.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The device does not expose a required characteristic.
    #[error("characteristic not found: {0}")]
    CharacteristicNotFound(String),

    /// Error reported by the Bluetooth stack.
    #[error("bluetooth error: {0}")]
    Bluetooth(String),

    /// This transport cannot enumerate devices.
    #[error("device discovery is not supported by this transport")]
    DiscoveryUnsupported,
}

/// Errors raised by a [`Session`](crate::Session).
///
/// Every variant names the operation that failed. None of them is fatal to
/// the session: the next `send` starts from a clean frame buffer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The timeout elapsed before a frame sentinel was received.
    #[error("{}: timed out waiting for a complete frame ({} bytes received: {})", .operation, .received.len(), hex::encode(.received))]
    IncompleteFrame {
        /// Operation that was waiting.
        operation: &'static str,
        /// Bytes buffered when the wait gave up.
        received: Vec<u8>,
    },

    /// A complete frame could not be parsed.
    #[error("{}: cannot decode frame {}: {}", .operation, hex::encode(.frame), .source)]
    Decode {
        /// Operation that received the frame.
        operation: &'static str,
        /// The offending frame.
        frame: Vec<u8>,
        /// Parser failure.
        #[source]
        source: ProtocolError,
    },

    /// The command could not be encoded.
    #[error("{}: cannot encode command: {}", .operation, .source)]
    Encode {
        /// Operation whose command was rejected.
        operation: &'static str,
        /// Encoder failure naming the field.
        #[source]
        source: ProtocolError,
    },

    /// The plug answered with a different notification variant.
    #[error("{}: expected {}, received {}", .operation, .expected, .actual)]
    UnexpectedNotification {
        /// Operation that was waiting.
        operation: &'static str,
        /// Variant the operation requires.
        expected: NotificationKind,
        /// What actually arrived.
        actual: Box<Notification>,
    },

    /// The plug confirmed the command with `was_successful == false`.
    #[error("{0} failed")]
    OperationFailed(&'static str),

    /// A caller-supplied value violates a protocol invariant.
    #[error("validation failed: {0}")]
    Validation(#[source] ProtocolError),

    /// A caller-supplied argument could not be interpreted.
    #[error("invalid {name}: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML for the config schema.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
