//! Transport boundary and the transports that do not need a Bluetooth stack.
//!
//! A transport moves raw bytes: it writes one encoded command and hands back
//! whatever fragments the plug pushes, one at a time. Framing is left to the
//! session's reassembler.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::TransportError;

/// Service advertised by SEM6000 plugs; discovery filters on it.
pub const SERVICE_UUID: &str = "0000fff0-0000-1000-8000-00805f9b34fb";
/// Characteristic commands are written to.
pub const WRITE_CHARACTERISTIC_UUID: &str = "0000fff3-0000-1000-8000-00805f9b34fb";
/// Characteristic notifications are pushed on.
pub const NOTIFY_CHARACTERISTIC_UUID: &str = "0000fff4-0000-1000-8000-00805f9b34fb";

/// Byte link to one plug.
pub trait Transport {
    /// Write one encoded command.
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Block until the next pushed fragment arrives.
    ///
    /// Returns `Ok(None)` if `timeout` elapses first.
    fn wait_for_fragment(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(data)
    }

    fn wait_for_fragment(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).wait_for_fragment(timeout)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(data)
    }

    fn wait_for_fragment(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).wait_for_fragment(timeout)
    }
}

/// A plug found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Hardware address.
    pub address: String,
    /// Advertised local name.
    pub name: String,
}

/// Turn one scan result into a [`DiscoveredDevice`] if it advertises
/// [`SERVICE_UUID`]; anything else, including devices advertising no
/// services at all, is dropped.
pub fn plug_from_advertisement<S: AsRef<str>>(
    services: &[S],
    address: &str,
    name: Option<&str>,
) -> Option<DiscoveredDevice> {
    if !services
        .iter()
        .any(|service| service.as_ref().eq_ignore_ascii_case(SERVICE_UUID))
    {
        return None;
    }
    Some(DiscoveredDevice {
        address: address.to_string(),
        name: name.unwrap_or_default().to_string(),
    })
}

/// Transports that can enumerate nearby plugs.
pub trait Discover {
    /// Scan for `timeout` and return every device advertising [`SERVICE_UUID`].
    fn discover(&mut self, timeout: Duration) -> Result<Vec<DiscoveredDevice>, TransportError>;
}

// ============================================================================
// In-memory channel transport
// ============================================================================

/// Host side of an in-memory link backed by crossbeam channels.
///
/// Useful for wiring a transport whose notifications arrive on another
/// thread, and for tests that script the plug's answers.
#[derive(Debug)]
pub struct ChannelTransport {
    written: Sender<Vec<u8>>,
    fragments: Receiver<Vec<u8>>,
}

/// Device side of a [`ChannelTransport`].
#[derive(Debug, Clone)]
pub struct ChannelPeer {
    written: Receiver<Vec<u8>>,
    fragments: Sender<Vec<u8>>,
}

impl ChannelTransport {
    /// Create a connected host/device pair.
    pub fn new_pair() -> (ChannelTransport, ChannelPeer) {
        let (written_tx, written_rx) = crossbeam_channel::unbounded();
        let (fragment_tx, fragment_rx) = crossbeam_channel::unbounded();
        (
            ChannelTransport {
                written: written_tx,
                fragments: fragment_rx,
            },
            ChannelPeer {
                written: written_rx,
                fragments: fragment_tx,
            },
        )
    }
}

impl Transport for ChannelTransport {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.written
            .send(data.to_vec())
            .map_err(|_| TransportError::Disconnected)
    }

    fn wait_for_fragment(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        match self.fragments.recv_timeout(timeout) {
            Ok(fragment) => Ok(Some(fragment)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}

impl ChannelPeer {
    /// Push one fragment to the host.
    pub fn push_fragment(&self, fragment: impl Into<Vec<u8>>) -> Result<(), TransportError> {
        self.fragments
            .send(fragment.into())
            .map_err(|_| TransportError::Disconnected)
    }

    /// Wait for the next write from the host.
    pub fn recv_written(&self, timeout: Duration) -> Option<Vec<u8>> {
        self.written.recv_timeout(timeout).ok()
    }

    /// Take the next write from the host without blocking.
    pub fn try_recv_written(&self) -> Option<Vec<u8>> {
        match self.written.try_recv() {
            Ok(data) => Some(data),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Sender half for code that pushes fragments from a callback.
    pub fn fragment_sender(&self) -> Sender<Vec<u8>> {
        self.fragments.clone()
    }
}

// ============================================================================
// TCP bridge transport
// ============================================================================

/// Maximum bytes taken from the socket per fragment.
const TCP_READ_SIZE: usize = 256;

/// Link to a plug through a TCP bridge that relays its serial characteristic.
///
/// Every socket read becomes one fragment; the bridge is expected to forward
/// notification payloads unchanged.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to a bridge at `addr`.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        debug!("Connected to bridge at {:?}", stream.peer_addr().ok());
        Ok(TcpTransport { stream })
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        TcpTransport { stream }
    }
}

impl Transport for TcpTransport {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }

    fn wait_for_fragment(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        // A zero read timeout means "block forever" to the OS.
        if timeout.is_zero() {
            return Ok(None);
        }
        self.stream.set_read_timeout(Some(timeout))?;

        let mut buf = [0u8; TCP_READ_SIZE];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(TransportError::Disconnected),
            Ok(n) => {
                trace!("TCP fragment: {}", hex::encode(&buf[..n]));
                Ok(Some(buf[..n].to_vec()))
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_advertisement_requires_plug_service() {
        let address = "AA:BB:CC:DD:EE:FF";

        let none: [&str; 0] = [];
        assert_eq!(plug_from_advertisement(&none, address, Some("Voltcraft")), None);
        assert_eq!(
            plug_from_advertisement(&["0000180f-0000-1000-8000-00805f9b34fb"], address, None),
            None
        );

        let device = plug_from_advertisement(
            &["0000180f-0000-1000-8000-00805f9b34fb", "0000FFF0-0000-1000-8000-00805F9B34FB"],
            address,
            Some("Voltcraft"),
        )
        .unwrap();
        assert_eq!(device.address, address);
        assert_eq!(device.name, "Voltcraft");

        let unnamed = plug_from_advertisement(&[SERVICE_UUID], address, None).unwrap();
        assert_eq!(unnamed.name, "");
    }

    #[test]
    fn test_channel_pair_round_trip() {
        let (mut transport, peer) = ChannelTransport::new_pair();

        transport.write(&[1, 2, 3]).unwrap();
        assert_eq!(peer.try_recv_written(), Some(vec![1, 2, 3]));
        assert_eq!(peer.try_recv_written(), None);

        peer.push_fragment(vec![4, 5]).unwrap();
        peer.push_fragment(vec![6]).unwrap();
        assert_eq!(
            transport.wait_for_fragment(Duration::from_millis(100)).unwrap(),
            Some(vec![4, 5])
        );
        assert_eq!(
            transport.wait_for_fragment(Duration::from_millis(100)).unwrap(),
            Some(vec![6])
        );
    }

    #[test]
    fn test_channel_timeout_returns_none() {
        let (mut transport, _peer) = ChannelTransport::new_pair();
        assert_eq!(
            transport.wait_for_fragment(Duration::from_millis(10)).unwrap(),
            None
        );
    }

    #[test]
    fn test_channel_disconnect_is_error() {
        let (mut transport, peer) = ChannelTransport::new_pair();
        drop(peer);
        assert!(matches!(
            transport.wait_for_fragment(Duration::from_millis(10)),
            Err(TransportError::Disconnected)
        ));
        assert!(matches!(
            transport.write(&[0]),
            Err(TransportError::Disconnected)
        ));
    }

    #[test]
    fn test_tcp_transport_echo() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let bridge = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = socket.read(&mut buf).unwrap();
            socket.write_all(&buf[..n]).unwrap();
        });

        let mut transport = TcpTransport::connect(addr).unwrap();
        transport.write(&[0x0F, 0xFF, 0xFF]).unwrap();
        let fragment = transport
            .wait_for_fragment(Duration::from_secs(2))
            .unwrap()
            .unwrap();
        assert_eq!(fragment, vec![0x0F, 0xFF, 0xFF]);
        bridge.join().unwrap();

        // Bridge closed the socket.
        assert!(matches!(
            transport.wait_for_fragment(Duration::from_secs(2)),
            Err(TransportError::Disconnected)
        ));
    }
}
