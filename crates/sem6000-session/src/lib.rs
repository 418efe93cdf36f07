//! SEM6000 session driver.
//!
//! This crate turns the wire codec from `sem6000-protocol` into a blocking
//! request/response client for one plug:
//!
//! - [`Session`]: sends one command, reassembles the answer, checks it
//! - [`Transport`]: the byte link; implemented by [`TcpTransport`],
//!   [`ChannelTransport`], [`SimulatedPlug`] and (feature `ble`) `BleTransport`
//! - [`SessionConfig`]: PIN and timeouts, loadable from YAML
//! - [`convert`]: parsing of user-facing times, dates and booleans
//!
//! # Example
//!
//! ```rust
//! use sem6000_session::{Session, SessionConfig, SimulatedPlug};
//!
//! let mut session = Session::new(SimulatedPlug::new(), &SessionConfig::default());
//! session.authorize()?;
//! session.power_on()?;
//! let settings = session.request_settings()?;
//! assert!(settings.led_active);
//! assert!(session.transport().is_power_on());
//! # Ok::<(), sem6000_session::SessionError>(())
//! ```

#[cfg(feature = "ble")]
mod ble;
mod config;
pub mod convert;
mod error;
mod pagination;
mod session;
mod sim;
mod transport;

#[cfg(feature = "ble")]
pub use ble::{BleScanner, BleTransport};
pub use config::{SessionConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{ConfigError, SessionError, SessionResult, TransportError};
pub use session::{Session, SessionState};
pub use sim::{SimulatedPlug, MAX_SCHEDULER_SLOTS};
pub use transport::{
    plug_from_advertisement, ChannelPeer, ChannelTransport, DiscoveredDevice, Discover,
    TcpTransport, Transport, NOTIFY_CHARACTERISTIC_UUID, SERVICE_UUID, WRITE_CHARACTERISTIC_UUID,
};

pub use sem6000_protocol as protocol;
