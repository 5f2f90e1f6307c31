//! Replay request construction.

use std::path::PathBuf;

use crate::error::Result;
use crate::rewrite::AddressOverrides;

/// Everything the engine needs for one replay invocation.
///
/// Immutable once constructed; consumed by a single worker and never
/// shared across concurrent invocations on the same interface.
#[derive(Debug, Clone)]
pub struct ReplayRequest {
    /// Capture files, processed in order.
    pub files: Vec<PathBuf>,

    /// Transmit interface name; must match the interface the engine's
    /// transmitter was opened on, checked before the first send.
    pub interface: String,

    /// Optional IPv4 address rewrites.
    pub overrides: AddressOverrides,

    /// Honor original inter-frame gaps instead of sending flat out.
    pub preserve_timing: bool,
}

impl ReplayRequest {
    pub fn new(files: Vec<PathBuf>, interface: impl Into<String>) -> Self {
        Self {
            files,
            interface: interface.into(),
            overrides: AddressOverrides::default(),
            preserve_timing: false,
        }
    }

    /// Attach overrides from raw configuration strings. Blank values are
    /// treated as absent; anything else must parse as an IPv4 address.
    pub fn with_override_strings(
        mut self,
        source: Option<&str>,
        dest: Option<&str>,
    ) -> Result<Self> {
        self.overrides = AddressOverrides::parse(source, dest)?;
        Ok(self)
    }

    pub fn with_overrides(mut self, overrides: AddressOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_preserve_timing(mut self, preserve_timing: bool) -> Self {
        self.preserve_timing = preserve_timing;
        self
    }
}
