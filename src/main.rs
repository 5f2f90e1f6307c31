//! pcapreplay CLI entry point.

use std::sync::mpsc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcapreplay::cli::{collect_capture_files, Args};
use pcapreplay::iface::{interface_address, list_interfaces};
use pcapreplay::replay::{
    ChannelSink, ReplayEngine, ReplayEvent, ReplayRequest, ReplayWorker, ThrottleConfig,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    if args.list_interfaces {
        return print_interfaces();
    }

    let interface = args
        .interface
        .as_deref()
        .context("an interface is required. Use -i or --list-interfaces.")?;

    let files = collect_capture_files(&args.paths)?;
    if files.is_empty() {
        bail!("no capture files given. Pass files or a folder containing .pcap/.pcapng files.");
    }

    let request = ReplayRequest::new(files, interface)
        .with_override_strings(args.source_ip.as_deref(), args.dest_ip.as_deref())?
        .with_preserve_timing(args.preserve_timing);

    // Validates the interface and opens it for injection before any
    // capture file is read.
    let engine = ReplayEngine::open(interface)
        .with_context(|| format!("cannot replay on interface {interface}"))?
        .with_throttle(if args.throttle_every == 0 {
            ThrottleConfig::DISABLED
        } else {
            ThrottleConfig {
                every: args.throttle_every,
                ..ThrottleConfig::default()
            }
        });

    // The worker runs off this thread; events arrive over a channel so
    // progress output never blocks transmission.
    let (tx, rx) = mpsc::channel();
    let worker = ReplayWorker::spawn(engine, request, ChannelSink::new(tx));

    for event in rx {
        match event {
            ReplayEvent::FileStarted { file_name } => {
                println!("replaying {file_name}...");
            }
            ReplayEvent::Progress {
                files_done,
                files_total,
            } => {
                println!("  {files_done}/{files_total} files done");
            }
            ReplayEvent::Finished { success: _, message } => {
                println!("{message}");
            }
        }
    }

    let summary = worker.join();

    for outcome in &summary.outcomes {
        if let Some(error) = &outcome.error_message {
            eprintln!("  {}: {error}", outcome.path.display());
        } else if !outcome.frame_errors.is_empty() {
            eprintln!(
                "  {}: {} of {} frames failed",
                outcome.path.display(),
                outcome.frame_errors.len(),
                outcome.frames_attempted
            );
        }
    }

    if summary.success() {
        Ok(())
    } else {
        bail!("{}", summary.message())
    }
}

fn print_interfaces() -> Result<()> {
    let names = list_interfaces().context("failed to enumerate interfaces")?;

    println!("Available interfaces:");
    for name in names {
        match interface_address(&name)? {
            Some(addr) => println!("  {name} ({addr})"),
            None => println!("  {name}"),
        }
    }
    Ok(())
}
