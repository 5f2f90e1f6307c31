//! Captured frame representation.

/// One link-layer packet record read from a capture file.
///
/// Frames are never mutated after being read; address rewriting always
/// builds a fresh buffer so the original capture data stays reusable.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position within the file (1-indexed), used for per-frame error reporting.
    pub sequence_index: u64,

    /// Capture timestamp in seconds since epoch, used for inter-frame pacing.
    pub timestamp: f64,

    /// Link layer type of the capture (e.g., 1 = Ethernet).
    pub link_type: u16,

    /// Raw frame data, link-layer framing included.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(sequence_index: u64, timestamp: f64, link_type: u16, data: Vec<u8>) -> Self {
        Self {
            sequence_index,
            timestamp,
            link_type,
            data,
        }
    }

    /// Frame length in bytes as captured.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
