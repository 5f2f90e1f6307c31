//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Replay PCAP/PCAPNG captures onto a network interface.
#[derive(Parser, Debug)]
#[command(name = "pcapreplay")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Capture files to replay, in order. Directories are scanned for
    /// .pcap/.pcapng files (gzipped variants included).
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Interface to transmit on
    #[arg(short = 'i', long = "interface", value_name = "IFACE")]
    pub interface: Option<String>,

    /// Rewrite the IPv4 source address of every IPv4 frame
    #[arg(long = "src-ip", value_name = "ADDR")]
    pub source_ip: Option<String>,

    /// Rewrite the IPv4 destination address of every IPv4 frame
    #[arg(long = "dst-ip", value_name = "ADDR")]
    pub dest_ip: Option<String>,

    /// Honor original inter-frame gaps (capped at 10s per gap)
    #[arg(short = 't', long = "preserve-timing")]
    pub preserve_timing: bool,

    /// In fast mode, pause 1ms after every Nth frame (0 disables)
    #[arg(long = "throttle-every", default_value = "100", value_name = "N")]
    pub throttle_every: u64,

    /// List available interfaces and exit
    #[arg(short = 'L', long = "list-interfaces")]
    pub list_interfaces: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
