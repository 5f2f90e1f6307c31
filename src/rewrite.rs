//! IPv4 address rewriting with checksum recomputation.
//!
//! Frames are parsed once into an explicit layer representation; header
//! presence is then a variant match instead of a repeated capability probe.
//! Anything that is not IPv4 over Ethernet passes through byte-for-byte.

use std::net::Ipv4Addr;

use etherparse::{Ipv4Header, NetSlice, SlicedPacket, TcpHeader, TransportSlice, UdpHeader};
use tracing::trace;

use crate::capture::Frame;
use crate::error::{Error, Result};

/// LINKTYPE_ETHERNET.
const LINKTYPE_ETHERNET: u16 = 1;

/// Optional IPv4 address replacements, parsed once at the request boundary.
///
/// Blank or whitespace-only strings are treated as absent so that empty
/// configuration fields never corrupt packets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressOverrides {
    pub source: Option<Ipv4Addr>,
    pub dest: Option<Ipv4Addr>,
}

impl AddressOverrides {
    /// Parse raw override strings from a caller or configuration layer.
    pub fn parse(source: Option<&str>, dest: Option<&str>) -> Result<Self> {
        Ok(Self {
            source: parse_override("source", source)?,
            dest: parse_override("destination", dest)?,
        })
    }

    /// True when no rewrite is requested.
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.dest.is_none()
    }
}

fn parse_override(field: &'static str, value: Option<&str>) -> Result<Option<Ipv4Addr>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<Ipv4Addr>()
        .map(Some)
        .map_err(|_| Error::InvalidOverride {
            field,
            value: value.to_string(),
        })
}

/// Parsed view of a frame, built when a frame is first considered for rewrite.
enum FrameLayers<'a> {
    /// IPv4 over Ethernet; addresses may be rewritten.
    Ipv4 {
        /// Link-layer bytes up to the start of the IP header (Ethernet,
        /// plus VLAN tags when present), copied verbatim.
        prefix: &'a [u8],
        ip: Ipv4Header,
        transport: Transport,
        /// Transport payload, or the whole IP payload when the transport
        /// header is absent or unparsed.
        payload: &'a [u8],
        /// Link-layer padding after the IP datagram, preserved so rewritten
        /// frames keep their original length.
        trailer: &'a [u8],
    },
    /// Everything else is transmitted untouched.
    Passthrough,
}

enum Transport {
    Tcp(TcpHeader),
    Udp(UdpHeader),
    /// ICMP, IP fragments, unknown protocols: no transport checksum covers
    /// the IP addresses, so the payload is carried raw.
    Other,
}

fn parse_layers(data: &[u8], link_type: u16) -> FrameLayers<'_> {
    if link_type != LINKTYPE_ETHERNET {
        return FrameLayers::Passthrough;
    }

    let sliced = match SlicedPacket::from_ethernet(data) {
        Ok(sliced) => sliced,
        Err(_) => return FrameLayers::Passthrough,
    };

    let ipv4 = match &sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => ipv4,
        _ => return FrameLayers::Passthrough,
    };

    let vlan_len = match &sliced.vlan {
        None => 0,
        Some(etherparse::VlanSlice::SingleVlan(_)) => 4,
        Some(etherparse::VlanSlice::DoubleVlan(_)) => 8,
    };
    let prefix_len = 14 + vlan_len;

    let header = ipv4.header();
    let datagram_len = header.total_len() as usize;
    if prefix_len + datagram_len > data.len() {
        // Truncated capture; leave it alone.
        return FrameLayers::Passthrough;
    }

    let (transport, payload) = match &sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => (Transport::Tcp(tcp.to_header()), tcp.payload()),
        Some(TransportSlice::Udp(udp)) => (Transport::Udp(udp.to_header()), udp.payload()),
        _ => (Transport::Other, ipv4.payload().payload),
    };

    FrameLayers::Ipv4 {
        prefix: &data[..prefix_len],
        ip: header.to_header(),
        transport,
        payload,
        trailer: &data[prefix_len + datagram_len..],
    }
}

/// Apply address overrides to a frame, recomputing checksums.
///
/// Returns the rewritten bytes, or `None` when the frame is sent as-is
/// (no overrides, or the frame carries no IPv4 header). The frame itself
/// is never mutated.
pub fn rewrite_frame(frame: &Frame, overrides: &AddressOverrides) -> Result<Option<Vec<u8>>> {
    if overrides.is_empty() {
        return Ok(None);
    }

    let FrameLayers::Ipv4 {
        prefix,
        mut ip,
        transport,
        payload,
        trailer,
    } = parse_layers(&frame.data, frame.link_type)
    else {
        return Ok(None);
    };

    if let Some(source) = overrides.source {
        ip.source = source.octets();
    }
    if let Some(dest) = overrides.dest {
        ip.destination = dest.octets();
    }

    // The transport checksum covers the rewritten addresses through the
    // pseudo header, so it must be recomputed before serialization. The
    // IPv4 header checksum is recomputed by `Ipv4Header::write`.
    let mut out = Vec::with_capacity(frame.len());
    out.extend_from_slice(prefix);

    match transport {
        Transport::Tcp(mut tcp) => {
            tcp.checksum = tcp
                .calc_checksum_ipv4(&ip, payload)
                .map_err(|e| checksum_error(frame.sequence_index, &e))?;
            ip.write(&mut out)
                .map_err(|e| serialize_error(frame.sequence_index, &e))?;
            tcp.write(&mut out)
                .map_err(|e| serialize_error(frame.sequence_index, &e))?;
        }
        Transport::Udp(mut udp) => {
            udp.checksum = udp
                .calc_checksum_ipv4(&ip, payload)
                .map_err(|e| checksum_error(frame.sequence_index, &e))?;
            ip.write(&mut out)
                .map_err(|e| serialize_error(frame.sequence_index, &e))?;
            udp.write(&mut out)
                .map_err(|e| serialize_error(frame.sequence_index, &e))?;
        }
        Transport::Other => {
            ip.write(&mut out)
                .map_err(|e| serialize_error(frame.sequence_index, &e))?;
        }
    }

    out.extend_from_slice(payload);
    out.extend_from_slice(trailer);

    trace!(
        frame = frame.sequence_index,
        src = ?overrides.source,
        dst = ?overrides.dest,
        "rewrote IPv4 addresses"
    );

    Ok(Some(out))
}

fn checksum_error(frame: u64, e: &dyn std::fmt::Display) -> Error {
    Error::Rewrite {
        frame,
        reason: format!("checksum recomputation failed: {e}"),
    }
}

fn serialize_error(frame: u64, e: &dyn std::fmt::Display) -> Error {
    Error::Rewrite {
        frame,
        reason: format!("header serialization failed: {e}"),
    }
}
