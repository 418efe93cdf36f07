//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the SEM6000 protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The reassembler was asked for a frame before the sentinel arrived.
    #[error("incomplete frame: {buffered} bytes buffered without trailing sentinel")]
    IncompleteFrame {
        /// Bytes received so far.
        buffered: usize,
    },

    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// First byte is not the frame start marker.
    #[error("invalid frame start byte: 0x{0:02X}")]
    InvalidStart(u8),

    /// Frame does not end with the sentinel.
    #[error("frame is missing the 0xFFFF sentinel")]
    MissingSentinel,

    /// Length byte disagrees with the actual frame size.
    #[error("length mismatch: header says {declared}, frame carries {actual}")]
    LengthMismatch {
        /// Length declared in the frame header.
        declared: usize,
        /// Length derived from the frame size.
        actual: usize,
    },

    /// Checksum byte disagrees with the payload.
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the payload.
        expected: u8,
        /// Checksum carried by the frame.
        actual: u8,
    },

    /// Unknown command or notification code.
    #[error("unknown code: 0x{0:02X}")]
    UnknownCode(u8),

    /// Unknown sub-code within a known code group.
    #[error("unknown sub-code 0x{sub:02X} for code 0x{code:02X}")]
    UnknownSubCode {
        /// Code group.
        code: u8,
        /// Offending sub-code.
        sub: u8,
    },

    /// A field of a command cannot be represented on the wire.
    #[error("cannot encode {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A weekday value outside Sunday=0..Saturday=6.
    #[error("invalid weekday value: {0} (expected 0-6)")]
    InvalidWeekday(u8),
}

impl ProtocolError {
    /// Whether this error arose while turning a command into bytes.
    pub fn is_encode_error(&self) -> bool {
        matches!(self, ProtocolError::InvalidField { .. })
    }

    /// Whether this error is a validation failure on a constructed value.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ProtocolError::InvalidWeekday(_))
    }

    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        ProtocolError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
