//! SEM6000 Smart Plug Protocol
//!
//! This crate provides the message types, wire codec and frame reassembly
//! for the binary protocol spoken by the SEM6000 power plug over its serial
//! GATT characteristic.
//!
//! # Protocol Overview
//!
//! The host writes one command frame and the plug answers with one
//! notification frame, pushed in fragments of at most 20 bytes:
//!
//! - **Commands** (host → plug): [`Command`], encoded with [`Command::encode`]
//! - **Notifications** (plug → host): [`Notification`], decoded with [`Notification::decode`]
//! - **Reassembly**: [`FrameReassembler`] collects fragments until the trailing `0xFFFF`
//!
//! Notifications are either confirmations carrying a single success flag or
//! data snapshots (settings, timer status, scheduler pages).
//!
//! # Example
//!
//! ```rust
//! use sem6000_protocol::{Command, FrameReassembler, Notification, NotificationKind};
//!
//! let frame = Command::PowerSwitch { on: true }.encode()?;
//! assert_eq!(frame, [0x0F, 0x06, 0x03, 0x00, 0x01, 0x00, 0x00, 0x05, 0xFF, 0xFF]);
//!
//! let mut reassembler = FrameReassembler::new();
//! reassembler.push(&[0x0F, 0x04, 0x03, 0x00]);
//! reassembler.push(&[0x00, 0x04, 0xFF, 0xFF]);
//! let notification = Notification::decode(&reassembler.take_frame()?)?;
//! assert_eq!(notification.kind(), NotificationKind::PowerSwitch);
//! # Ok::<(), sem6000_protocol::ProtocolError>(())
//! ```

mod codec;
mod commands;
mod constants;
mod error;
mod frame;
mod notifications;
mod types;

pub use codec::*;
pub use commands::Command;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use notifications::*;
pub use types::*;
