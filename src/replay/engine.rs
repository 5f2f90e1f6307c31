//! The replay engine: rewrite, pace, transmit, isolate failures.

use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::events::EventSink;
use super::outcome::{FileState, FrameError, ReplayOutcome, RequestSummary};
use super::pacing::{inter_frame_delay, ThrottleConfig};
use super::request::ReplayRequest;
use crate::capture::{CaptureReader, Frame};
use crate::error::{CaptureError, Result};
use crate::iface::{PcapTransmitter, Transmit};
use crate::rewrite::rewrite_frame;

/// Replays capture files through a transmitter, one request at a time.
///
/// The transmitter is exclusively owned for the lifetime of the engine;
/// serializing concurrent requests against one interface is the caller's
/// contract.
#[derive(Debug)]
pub struct ReplayEngine<T: Transmit> {
    transmitter: T,
    throttle: ThrottleConfig,
}

impl ReplayEngine<PcapTransmitter> {
    /// Open a live engine on the named interface.
    ///
    /// Fails with `InvalidInterface` before any capture file is touched
    /// when the name is not among the available interfaces.
    pub fn open(interface: &str) -> Result<Self> {
        Ok(Self::new(PcapTransmitter::open(interface)?))
    }
}

impl<T: Transmit> ReplayEngine<T> {
    pub fn new(transmitter: T) -> Self {
        Self {
            transmitter,
            throttle: ThrottleConfig::default(),
        }
    }

    pub fn with_throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }

    /// Run one request to completion: every file in order, frame by frame.
    ///
    /// File-level failures do not stop later files; cancellation does.
    /// Emits one `on_finished` exactly, whatever happens.
    pub fn run(
        &mut self,
        request: &ReplayRequest,
        sink: &mut dyn EventSink,
        cancel: &CancelToken,
    ) -> RequestSummary {
        let files_total = request.files.len();

        // The request names an interface; this engine owns a transmitter
        // bound to one. A mismatch fails the whole request before any
        // capture file is read.
        if self.transmitter.interface_name() != request.interface {
            let reason = format!(
                "interface mismatch: request names {}, transmitter is bound to {}",
                request.interface,
                self.transmitter.interface_name()
            );
            warn!(error = %reason, "refusing request");
            let outcomes = request
                .files
                .iter()
                .map(|path| ReplayOutcome::failed(path, reason.clone()))
                .collect();
            let summary = RequestSummary::new(files_total, outcomes, false);
            sink.on_finished(summary.success(), &summary.message());
            return summary;
        }

        let mut outcomes = Vec::with_capacity(files_total);
        let mut cancelled = false;

        for (i, path) in request.files.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            sink.on_file_started(&file_name);

            let outcome = self.replay_file(path, request, cancel);
            info!(
                file = %path.display(),
                state = ?outcome.state(),
                attempted = outcome.frames_attempted,
                sent = outcome.frames_sent,
                "file done"
            );

            let was_cancelled = outcome.cancelled;
            outcomes.push(outcome);
            if was_cancelled {
                cancelled = true;
                break;
            }

            sink.on_progress(i + 1, files_total);
        }

        let summary = RequestSummary::new(files_total, outcomes, cancelled);
        sink.on_finished(summary.success(), &summary.message());
        summary
    }

    /// Replay a single file: `Idle -> Reading -> Sending -> Completed`,
    /// or `Failed`/`Cancelled`.
    pub fn replay_file(
        &mut self,
        path: &Path,
        request: &ReplayRequest,
        cancel: &CancelToken,
    ) -> ReplayOutcome {
        let mut state = FileState::Reading;
        debug!(file = %path.display(), ?state, "reading capture");

        // Reading: file-level errors fail this file only.
        let frames = match CaptureReader::open(path).and_then(CaptureReader::read_all) {
            Ok(frames) => frames,
            Err(e) => return ReplayOutcome::failed(path, e.to_string()),
        };

        if frames.is_empty() {
            return ReplayOutcome::failed(path, CaptureError::EmptyCapture.to_string());
        }

        state = FileState::Sending;
        debug!(file = %path.display(), ?state, frames = frames.len(), "sending");

        let frames_attempted = frames.len() as u64;
        let mut frames_sent = 0u64;
        let mut frame_errors = Vec::new();
        let mut previous_ts: Option<f64> = None;

        for frame in &frames {
            if cancel.is_cancelled() {
                return self.cancelled_outcome(path, frames_attempted, frames_sent, frame_errors);
            }

            // Pacing happens whether or not this frame ends up sendable, so
            // the schedule tracks capture timestamps, not transmit results.
            if request.preserve_timing {
                if let Some(previous) = previous_ts {
                    let delay = inter_frame_delay(previous, frame.timestamp);
                    if !cancel.sleep(delay) {
                        return self.cancelled_outcome(
                            path,
                            frames_attempted,
                            frames_sent,
                            frame_errors,
                        );
                    }
                }
                previous_ts = Some(frame.timestamp);
            } else if let Some(pause) = self.throttle.pause_after(frame.sequence_index) {
                std::thread::sleep(pause);
            }

            match self.send_frame(frame, request) {
                Ok(()) => frames_sent += 1,
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        frame = frame.sequence_index,
                        error = %e,
                        "frame failed, continuing"
                    );
                    frame_errors.push(FrameError {
                        frame: frame.sequence_index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        ReplayOutcome {
            path: path.to_path_buf(),
            frames_attempted,
            frames_sent,
            success: frames_sent > 0,
            error_message: None,
            frame_errors,
            cancelled: false,
        }
    }

    /// Rewrite (on a fresh buffer) and transmit one frame.
    fn send_frame(&mut self, frame: &Frame, request: &ReplayRequest) -> Result<()> {
        let bytes: Cow<'_, [u8]> = match rewrite_frame(frame, &request.overrides)? {
            Some(rewritten) => Cow::Owned(rewritten),
            None => Cow::Borrowed(&frame.data),
        };

        self.transmitter.transmit(&bytes)
    }

    fn cancelled_outcome(
        &self,
        path: &Path,
        frames_attempted: u64,
        frames_sent: u64,
        frame_errors: Vec<FrameError>,
    ) -> ReplayOutcome {
        debug!(file = %path.display(), "cancelled mid-file");
        ReplayOutcome {
            path: path.to_path_buf(),
            frames_attempted,
            frames_sent,
            success: false,
            error_message: Some("cancelled".to_string()),
            frame_errors,
            cancelled: true,
        }
    }
}
