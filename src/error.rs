//! Error types for pcapreplay.

use thiserror::Error;

/// Main error type for pcapreplay operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading or parsing a capture file
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Error validating or transmitting on an interface
    #[error("interface error: {0}")]
    Interface(#[from] InterfaceError),

    /// Invalid address override supplied at request construction
    #[error("invalid {field} override {value:?}: not an IPv4 address")]
    InvalidOverride {
        field: &'static str,
        value: String,
    },

    /// Header rewrite failed for a single frame
    #[error("frame {frame} rewrite failed: {reason}")]
    Rewrite { frame: u64, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to capture file reading.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// File not found
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Insufficient permissions to open the file
    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    /// Malformed PCAP or PCAPNG structure
    #[error("corrupt capture {path}: {reason}")]
    CorruptCapture { path: String, reason: String },

    /// Valid container with zero packet records
    #[error("empty capture")]
    EmptyCapture,
}

/// Errors related to the transmit interface.
#[derive(Error, Debug)]
pub enum InterfaceError {
    /// Interface name is not among the available send-capable interfaces
    #[error("invalid interface: {name}")]
    InvalidInterface { name: String },

    /// Interface could not be opened for injection
    #[error("failed to open interface {name}: {reason}")]
    OpenFailed { name: String, reason: String },

    /// A single frame failed to transmit
    #[error("transmit failed: {reason}")]
    TransmitFailed { reason: String },

    /// Interface enumeration failed
    #[error("failed to enumerate interfaces: {reason}")]
    Enumeration { reason: String },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
