//! Builders for synthetic capture files used across unit tests.

/// Build a classic little-endian microsecond PCAP file from
/// (timestamp seconds, frame bytes) pairs.
pub fn build_pcap(frames: &[(f64, Vec<u8>)]) -> Vec<u8> {
    build_classic([0xd4, 0xc3, 0xb2, 0xa1], 1e6, frames)
}

/// Build a classic little-endian nanosecond-resolution PCAP file.
pub fn build_pcap_ns(frames: &[(f64, Vec<u8>)]) -> Vec<u8> {
    build_classic([0x4d, 0x3c, 0xb2, 0xa1], 1e9, frames)
}

fn build_classic(magic: [u8; 4], ts_divisor: f64, frames: &[(f64, Vec<u8>)]) -> Vec<u8> {
    let mut data = Vec::new();

    // Global header
    data.extend_from_slice(&magic);
    data.extend_from_slice(&[0x02, 0x00]); // Version major (2)
    data.extend_from_slice(&[0x04, 0x00]); // Version minor (4)
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Thiszone
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Sigfigs
    data.extend_from_slice(&[0xff, 0xff, 0x00, 0x00]); // Snaplen (65535)
    data.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // Network (Ethernet)

    for (timestamp, frame) in frames {
        let ts_sec = *timestamp as u32;
        let ts_frac = ((timestamp - ts_sec as f64) * ts_divisor).round() as u32;
        let len = frame.len() as u32;

        data.extend_from_slice(&ts_sec.to_le_bytes());
        data.extend_from_slice(&ts_frac.to_le_bytes());
        data.extend_from_slice(&len.to_le_bytes()); // caplen
        data.extend_from_slice(&len.to_le_bytes()); // origlen
        data.extend_from_slice(frame);
    }

    data
}

/// Build a little-endian PCAPNG file (section header plus one Ethernet
/// interface, microsecond timestamps): `epbs` become enhanced packet
/// blocks, `spbs` become simple packet blocks appended after them.
///
/// Block bodies are padded to 32-bit boundaries as the format requires,
/// so frame lengths that are not multiples of four exercise the caplen
/// truncation on the read side.
pub fn build_pcapng(epbs: &[(f64, Vec<u8>)], spbs: &[Vec<u8>]) -> Vec<u8> {
    let mut data = Vec::new();

    // Section header block
    data.extend_from_slice(&[0x0a, 0x0d, 0x0d, 0x0a]);
    data.extend_from_slice(&28u32.to_le_bytes());
    data.extend_from_slice(&[0x4d, 0x3c, 0x2b, 0x1a]); // Byte-order magic
    data.extend_from_slice(&1u16.to_le_bytes()); // Version major
    data.extend_from_slice(&0u16.to_le_bytes()); // Version minor
    data.extend_from_slice(&(-1i64).to_le_bytes()); // Section length: unknown
    data.extend_from_slice(&28u32.to_le_bytes());

    // Interface description block (Ethernet, no options)
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&20u32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes()); // Linktype
    data.extend_from_slice(&0u16.to_le_bytes()); // Reserved
    data.extend_from_slice(&65535u32.to_le_bytes()); // Snaplen
    data.extend_from_slice(&20u32.to_le_bytes());

    for (timestamp, frame) in epbs {
        let ts_units = (timestamp * 1e6).round() as u64;
        let caplen = frame.len() as u32;
        let padded = (frame.len() + 3) & !3;
        let block_len = 32 + padded as u32;

        data.extend_from_slice(&6u32.to_le_bytes()); // Enhanced packet block
        data.extend_from_slice(&block_len.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes()); // Interface ID
        data.extend_from_slice(&((ts_units >> 32) as u32).to_le_bytes());
        data.extend_from_slice(&(ts_units as u32).to_le_bytes());
        data.extend_from_slice(&caplen.to_le_bytes());
        data.extend_from_slice(&caplen.to_le_bytes()); // origlen
        data.extend_from_slice(frame);
        data.resize(data.len() + padded - frame.len(), 0);
        data.extend_from_slice(&block_len.to_le_bytes());
    }

    for frame in spbs {
        let padded = (frame.len() + 3) & !3;
        let block_len = 16 + padded as u32;

        data.extend_from_slice(&3u32.to_le_bytes()); // Simple packet block
        data.extend_from_slice(&block_len.to_le_bytes());
        data.extend_from_slice(&(frame.len() as u32).to_le_bytes()); // origlen
        data.extend_from_slice(frame);
        data.resize(data.len() + padded - frame.len(), 0);
        data.extend_from_slice(&block_len.to_le_bytes());
    }

    data
}

/// Minimal Ethernet frame with an unroutable ethertype and arbitrary payload.
pub fn ethernet_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]); // dst MAC
    frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]); // src MAC
    frame.extend_from_slice(&[0x88, 0xb5]); // ethertype: local experimental
    frame.extend_from_slice(payload);
    frame
}
