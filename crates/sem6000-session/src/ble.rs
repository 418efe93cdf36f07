//! Bluetooth LE transport (feature `ble`).
//!
//! Commands go to the write characteristic without response; notifications
//! from the notify characteristic are forwarded by a task on a private tokio
//! runtime into a crossbeam channel, so the blocking [`Transport`] interface
//! can wait on them with a timeout.

use std::time::Duration;

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use futures::StreamExt;
use tokio::runtime::Runtime;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::error::TransportError;
use crate::transport::{
    plug_from_advertisement, DiscoveredDevice, Discover, Transport, NOTIFY_CHARACTERISTIC_UUID,
    SERVICE_UUID, WRITE_CHARACTERISTIC_UUID,
};

fn bt(err: btleplug::Error) -> TransportError {
    TransportError::Bluetooth(err.to_string())
}

fn parse_uuid(value: &str) -> Result<Uuid, TransportError> {
    Uuid::parse_str(value).map_err(|e| TransportError::Bluetooth(format!("{}: {}", value, e)))
}

fn runtime() -> Result<Runtime, TransportError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?)
}

async fn first_adapter() -> Result<Adapter, TransportError> {
    let manager = Manager::new().await.map_err(bt)?;
    manager
        .adapters()
        .await
        .map_err(bt)?
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::Bluetooth("no Bluetooth adapter available".to_string()))
}

async fn scan(adapter: &Adapter, timeout: Duration) -> Result<Vec<(Peripheral, DiscoveredDevice)>, TransportError> {
    let service = parse_uuid(SERVICE_UUID)?;
    adapter
        .start_scan(ScanFilter {
            services: vec![service],
        })
        .await
        .map_err(bt)?;
    tokio::time::sleep(timeout).await;
    adapter.stop_scan().await.map_err(bt)?;

    let mut found = Vec::new();
    for peripheral in adapter.peripherals().await.map_err(bt)? {
        let Some(properties) = peripheral.properties().await.map_err(bt)? else {
            continue;
        };
        let services: Vec<String> = properties.services.iter().map(Uuid::to_string).collect();
        let address = properties.address.to_string();
        let Some(device) =
            plug_from_advertisement(&services, &address, properties.local_name.as_deref())
        else {
            continue;
        };
        trace!("scan: {} {:?}", device.address, device.name);
        found.push((peripheral, device));
    }
    Ok(found)
}

fn find_characteristic(peripheral: &Peripheral, uuid: &str) -> Result<Characteristic, TransportError> {
    let wanted = parse_uuid(uuid)?;
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == wanted)
        .ok_or_else(|| TransportError::CharacteristicNotFound(uuid.to_string()))
}

/// Scans for plugs without connecting.
pub struct BleScanner {
    runtime: Runtime,
}

impl BleScanner {
    /// Create a scanner with its own runtime.
    pub fn new() -> Result<Self, TransportError> {
        Ok(BleScanner { runtime: runtime()? })
    }
}

impl Discover for BleScanner {
    fn discover(&mut self, timeout: Duration) -> Result<Vec<DiscoveredDevice>, TransportError> {
        self.runtime.block_on(async {
            let adapter = first_adapter().await?;
            let found = scan(&adapter, timeout).await?;
            info!("Discovered {} plug(s)", found.len());
            Ok(found.into_iter().map(|(_, device)| device).collect())
        })
    }
}

/// A connected plug.
pub struct BleTransport {
    runtime: Runtime,
    peripheral: Peripheral,
    write_characteristic: Characteristic,
    fragments: Receiver<Vec<u8>>,
}

impl BleTransport {
    /// Scan for up to `scan_timeout`, connect to the plug at `address` and
    /// subscribe to its notifications.
    pub fn connect(address: &str, scan_timeout: Duration) -> Result<Self, TransportError> {
        let runtime = runtime()?;
        let (tx, rx) = crossbeam_channel::unbounded();

        let (peripheral, write_characteristic) = runtime.block_on(async {
            let adapter = first_adapter().await?;
            let peripheral = scan(&adapter, scan_timeout)
                .await?
                .into_iter()
                .find(|(_, device)| device.address.eq_ignore_ascii_case(address))
                .map(|(peripheral, _)| peripheral)
                .ok_or_else(|| TransportError::DeviceNotFound(address.to_string()))?;

            peripheral.connect().await.map_err(bt)?;
            peripheral.discover_services().await.map_err(bt)?;
            info!("Connected to {}", address);

            let write_characteristic = find_characteristic(&peripheral, WRITE_CHARACTERISTIC_UUID)?;
            let notify_characteristic = find_characteristic(&peripheral, NOTIFY_CHARACTERISTIC_UUID)?;
            peripheral.subscribe(&notify_characteristic).await.map_err(bt)?;

            let mut notifications = peripheral.notifications().await.map_err(bt)?;
            let notify_uuid = notify_characteristic.uuid;
            tokio::spawn(async move {
                while let Some(notification) = notifications.next().await {
                    if notification.uuid != notify_uuid {
                        continue;
                    }
                    if tx.send(notification.value).is_err() {
                        break;
                    }
                }
                debug!("notification stream ended");
            });

            Ok::<_, TransportError>((peripheral, write_characteristic))
        })?;

        Ok(BleTransport {
            runtime,
            peripheral,
            write_characteristic,
            fragments: rx,
        })
    }
}

impl Transport for BleTransport {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.runtime
            .block_on(
                self.peripheral
                    .write(&self.write_characteristic, data, WriteType::WithoutResponse),
            )
            .map_err(bt)
    }

    fn wait_for_fragment(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        match self.fragments.recv_timeout(timeout) {
            Ok(fragment) => Ok(Some(fragment)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}

impl Drop for BleTransport {
    fn drop(&mut self) {
        if let Err(e) = self.runtime.block_on(self.peripheral.disconnect()) {
            warn!("disconnect failed: {}", e);
        }
    }
}
