//! Transmit interface enumeration and frame injection.
//!
//! Wraps libpcap (via the `pcap` crate) for interface listing, address
//! lookup, and raw frame injection. The `Transmit` trait is the seam the
//! replay engine sends through, so tests can substitute a scripted fake.

use std::net::Ipv4Addr;

use pcap::{Active, Capture, Device};
use tracing::debug;

use crate::error::{Error, InterfaceError, Result};

/// Sink for raw frames. One transmitter is exclusively owned by one
/// replay worker for the duration of a request.
pub trait Transmit {
    /// Name of the interface this transmitter is bound to. The engine
    /// checks it against the request before sending anything.
    fn interface_name(&self) -> &str;

    /// Inject one frame. Per-frame failures are recoverable; the engine
    /// logs them and moves on.
    fn transmit(&mut self, frame: &[u8]) -> Result<()>;
}

/// Names of the currently available send-capable interfaces.
pub fn list_interfaces() -> Result<Vec<String>> {
    let devices = Device::list().map_err(|e| {
        Error::Interface(InterfaceError::Enumeration {
            reason: e.to_string(),
        })
    })?;
    Ok(devices.into_iter().map(|d| d.name).collect())
}

/// IPv4 address of an interface, when it has one.
pub fn interface_address(name: &str) -> Result<Option<Ipv4Addr>> {
    let devices = Device::list().map_err(|e| {
        Error::Interface(InterfaceError::Enumeration {
            reason: e.to_string(),
        })
    })?;

    let address = devices
        .into_iter()
        .find(|d| d.name == name)
        .and_then(|d| {
            d.addresses.into_iter().find_map(|a| match a.addr {
                std::net::IpAddr::V4(v4) => Some(v4),
                _ => None,
            })
        });

    Ok(address)
}

/// Live transmitter over a pcap injection handle.
pub struct PcapTransmitter {
    capture: Capture<Active>,
    name: String,
}

impl PcapTransmitter {
    /// Open `name` for injection. Fails with `InvalidInterface` when the
    /// name is unknown, before any capture file is touched.
    pub fn open(name: &str) -> Result<Self> {
        let device = Device::list()
            .map_err(|e| {
                Error::Interface(InterfaceError::Enumeration {
                    reason: e.to_string(),
                })
            })?
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| {
                Error::Interface(InterfaceError::InvalidInterface {
                    name: name.to_string(),
                })
            })?;

        let capture = Capture::from_device(device)
            .map_err(|e| open_failed(name, e))?
            .promisc(false)
            .snaplen(65535)
            .open()
            .map_err(|e| open_failed(name, e))?;

        debug!(interface = name, "opened interface for injection");

        Ok(Self {
            capture,
            name: name.to_string(),
        })
    }
}

impl std::fmt::Debug for PcapTransmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcapTransmitter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn open_failed(name: &str, e: pcap::Error) -> Error {
    Error::Interface(InterfaceError::OpenFailed {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

impl Transmit for PcapTransmitter {
    fn interface_name(&self) -> &str {
        &self.name
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<()> {
        self.capture.sendpacket(frame).map_err(|e| {
            Error::Interface(InterfaceError::TransmitFailed {
                reason: e.to_string(),
            })
        })
    }
}
