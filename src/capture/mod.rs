//! Capture file reading module.
//!
//! This module handles reading PCAP and PCAPNG files and
//! exposing ordered frame sequences for replay.

mod frame;
mod reader;

#[cfg(test)]
pub mod testdata;

pub use frame::Frame;
pub use reader::CaptureReader;
