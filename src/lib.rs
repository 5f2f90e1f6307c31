//! pcapreplay - Replay captured traffic onto a live interface.
//!
//! This library reads PCAP/PCAPNG files and retransmits their frames on a
//! chosen interface, optionally rewriting IPv4 source/destination
//! addresses (with checksum recomputation) for test-case reproduction.
//!
//! # Example
//!
//! ```no_run
//! use pcapreplay::replay::{NullSink, ReplayEngine, ReplayRequest, ReplayWorker};
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = ReplayEngine::open("eth0")?;
//!     let request = ReplayRequest::new(vec!["capture.pcap".into()], "eth0")
//!         .with_preserve_timing(true);
//!     let summary = ReplayWorker::spawn(engine, request, NullSink).join();
//!     println!("{}", summary.message());
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod cli;
pub mod error;
pub mod iface;
pub mod replay;
pub mod rewrite;

pub use error::{Error, Result};
