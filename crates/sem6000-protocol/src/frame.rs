//! Frame encoding and reassembly.
//!
//! Every frame, in both directions, has the same shape:
//!
//! ```text
//! +------+-----+------+------+----------+----------+------+------+
//! | 0x0F | len | code | 0x00 | body ... | checksum | 0xFF | 0xFF |
//! +------+-----+------+------+----------+----------+------+------+
//! ```
//!
//! `len` counts the payload (`code` through the end of `body`) plus the
//! checksum byte. The checksum is `1 + sum(payload)` truncated to a byte.
//! The plug pushes notification frames in transport-sized fragments; only
//! the trailing `0xFFFF` tells the receiver that a frame is complete.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};

/// Compute the checksum byte for a payload.
pub fn checksum(payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(1u8, |sum, byte| sum.wrapping_add(*byte))
}

/// Wrap a payload (`code`, reserved byte, body) into a complete frame.
pub fn encode_frame(payload: &[u8]) -> ProtocolResult<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::invalid_field(
            "payload",
            format!("{} bytes exceeds maximum {}", payload.len(), MAX_PAYLOAD_SIZE),
        ));
    }

    let mut buf = BytesMut::with_capacity(payload.len() + 5);
    buf.put_u8(FRAME_START);
    buf.put_u8(payload.len() as u8 + 1);
    buf.extend_from_slice(payload);
    buf.put_u8(checksum(payload));
    buf.extend_from_slice(&FRAME_SENTINEL);
    Ok(buf.to_vec())
}

/// Validate framing and return the payload (`code`, reserved byte, body).
pub fn decode_frame(frame: &[u8]) -> ProtocolResult<&[u8]> {
    if frame.len() < MIN_FRAME_SIZE {
        return Err(ProtocolError::FrameTooShort {
            expected: MIN_FRAME_SIZE,
            actual: frame.len(),
        });
    }
    if frame[0] != FRAME_START {
        return Err(ProtocolError::InvalidStart(frame[0]));
    }
    if !ends_with_sentinel(frame) {
        return Err(ProtocolError::MissingSentinel);
    }

    // start + len + payload + checksum + sentinel
    let declared = frame[1] as usize;
    let actual = frame.len() - 4;
    if declared != actual {
        return Err(ProtocolError::LengthMismatch { declared, actual });
    }

    let payload = &frame[2..frame.len() - 3];
    let carried = frame[frame.len() - 3];
    let expected = checksum(payload);
    if carried != expected {
        return Err(ProtocolError::ChecksumMismatch {
            expected,
            actual: carried,
        });
    }

    Ok(payload)
}

/// Split an encoded frame into transport fragments of at most `size` bytes.
pub fn split_fragments(frame: &[u8], size: usize) -> Vec<Vec<u8>> {
    frame.chunks(size.max(1)).map(<[u8]>::to_vec).collect()
}

fn ends_with_sentinel(data: &[u8]) -> bool {
    data.len() >= FRAME_SENTINEL.len() && data[data.len() - FRAME_SENTINEL.len()..] == FRAME_SENTINEL
}

/// Accumulates pushed fragments until one complete frame has arrived.
///
/// Completion is judged on the most recently pushed fragment only: the frame
/// is complete once that fragment ends with the `0xFFFF` sentinel.
#[derive(Debug, Default)]
pub struct FrameReassembler {
    fragments: Vec<Bytes>,
}

impl FrameReassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        FrameReassembler::default()
    }

    /// Append a fragment in receipt order.
    pub fn push(&mut self, fragment: &[u8]) {
        self.fragments.push(Bytes::copy_from_slice(fragment));
    }

    /// Whether the last pushed fragment ends with the sentinel.
    pub fn is_complete(&self) -> bool {
        self.fragments
            .last()
            .is_some_and(|last| ends_with_sentinel(last))
    }

    /// Concatenate and consume the buffered fragments.
    ///
    /// Fails with [`ProtocolError::IncompleteFrame`] and leaves the buffer
    /// untouched if the frame is not complete yet.
    pub fn take_frame(&mut self) -> ProtocolResult<Vec<u8>> {
        if !self.is_complete() {
            return Err(ProtocolError::IncompleteFrame {
                buffered: self.buffered_len(),
            });
        }

        let mut frame = BytesMut::with_capacity(self.buffered_len());
        for fragment in self.fragments.drain(..) {
            frame.extend_from_slice(&fragment);
        }
        Ok(frame.to_vec())
    }

    /// Buffered bytes concatenated without consuming them (for diagnostics).
    pub fn peek(&self) -> Vec<u8> {
        self.fragments.iter().flat_map(|f| f.iter().copied()).collect()
    }

    /// Discard any partial frame.
    pub fn reset(&mut self) {
        self.fragments.clear();
    }

    /// Number of fragments buffered.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Number of bytes buffered.
    pub fn buffered_len(&self) -> usize {
        self.fragments.iter().map(Bytes::len).sum()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Vec<u8> {
        encode_frame(&[0x10, 0x00, 0x01, 0x00, 0x96, 0x00, 0x64, 0x01, 0x68, 0x05, 0x28, 0x01, 0x0B, 0xB8])
            .unwrap()
    }

    #[test]
    fn test_encode_frame_switch_on() {
        let frame = encode_frame(&[0x03, 0x00, 0x01, 0x00, 0x00]).unwrap();
        assert_eq!(frame, vec![0x0F, 0x06, 0x03, 0x00, 0x01, 0x00, 0x00, 0x05, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_frame_returns_payload() {
        let frame = encode_frame(&[0x10, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(decode_frame(&frame).unwrap(), &[0x10, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_frame_rejects_bad_checksum() {
        let mut frame = encode_frame(&[0x03, 0x00, 0x00]).unwrap();
        let idx = frame.len() - 3;
        frame[idx] ^= 0x55;
        assert!(matches!(
            decode_frame(&frame),
            Err(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_frame_rejects_bad_length() {
        let mut frame = encode_frame(&[0x03, 0x00, 0x00]).unwrap();
        frame[1] = 9;
        assert_eq!(
            decode_frame(&frame),
            Err(ProtocolError::LengthMismatch {
                declared: 9,
                actual: 4
            })
        );
    }

    #[test]
    fn test_decode_frame_rejects_missing_sentinel() {
        let mut frame = encode_frame(&[0x03, 0x00, 0x00]).unwrap();
        let last = frame.len() - 1;
        frame[last] = 0x00;
        assert_eq!(decode_frame(&frame), Err(ProtocolError::MissingSentinel));
    }

    #[test]
    fn test_reassembly_every_split() {
        let frame = sample_frame();

        for split in 1..frame.len() {
            let mut reassembler = FrameReassembler::new();
            let fragments: Vec<&[u8]> = frame.chunks(split).collect();
            let last = fragments.len() - 1;
            for (i, fragment) in fragments.iter().enumerate() {
                reassembler.push(fragment);
                // Only a final fragment carrying both sentinel bytes completes the frame.
                let expected = i == last && fragments[last].len() >= 2;
                assert_eq!(reassembler.is_complete(), expected, "split {split}, fragment {i}");
            }

            if fragments[last].len() >= 2 {
                assert_eq!(reassembler.take_frame().unwrap(), frame);
                assert!(reassembler.is_empty());
                assert!(!reassembler.is_complete());
            } else {
                assert_eq!(
                    reassembler.take_frame(),
                    Err(ProtocolError::IncompleteFrame {
                        buffered: frame.len()
                    })
                );
                assert_eq!(reassembler.peek(), frame);
            }
        }
    }

    #[test]
    fn test_lone_sentinel_byte_tail_stays_incomplete() {
        let frame = sample_frame();
        let (head, tail) = frame.split_at(frame.len() - 1);
        assert_eq!(tail, [0xFF]);

        let mut reassembler = FrameReassembler::new();
        reassembler.push(head);
        reassembler.push(tail);
        assert!(!reassembler.is_complete());
        assert_eq!(
            reassembler.take_frame(),
            Err(ProtocolError::IncompleteFrame {
                buffered: frame.len()
            })
        );
        assert_eq!(reassembler.fragment_count(), 2);
    }

    #[test]
    fn test_incomplete_never_completes() {
        let mut reassembler = FrameReassembler::new();
        reassembler.push(&[0x0F, 0x04, 0x03]);
        reassembler.push(&[0x00, 0x00, 0xFF]);
        assert!(!reassembler.is_complete());
        assert_eq!(
            reassembler.take_frame(),
            Err(ProtocolError::IncompleteFrame { buffered: 6 })
        );
        // Failed take leaves the buffer in place.
        assert_eq!(reassembler.fragment_count(), 2);
    }

    #[test]
    fn test_short_fragment_never_completes() {
        let mut reassembler = FrameReassembler::new();
        reassembler.push(&[0x0F, 0xFF]);
        reassembler.push(&[0xFF]);
        assert!(!reassembler.is_complete());
    }

    #[test]
    fn test_empty_buffer_is_not_complete() {
        let reassembler = FrameReassembler::new();
        assert!(!reassembler.is_complete());
    }

    #[test]
    fn test_reset_discards_partial_frame() {
        let mut reassembler = FrameReassembler::new();
        reassembler.push(&[0x0F, 0x04]);
        reassembler.reset();
        assert!(reassembler.is_empty());
        reassembler.push(&[0xFF, 0xFF]);
        assert_eq!(reassembler.take_frame().unwrap(), vec![0xFF, 0xFF]);
    }

    #[test]
    fn test_split_fragments() {
        let frame = sample_frame();
        let fragments = split_fragments(&frame, FRAGMENT_SIZE);
        assert_eq!(fragments.concat(), frame);
        assert!(fragments.iter().all(|f| f.len() <= FRAGMENT_SIZE));
    }
}
