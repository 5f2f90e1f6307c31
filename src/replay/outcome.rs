//! Per-file and per-request replay results.

use std::path::{Path, PathBuf};

/// Lifecycle of one file inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Idle,
    Reading,
    Sending,
    Completed,
    Failed,
    Cancelled,
}

/// One frame that could not be rewritten or transmitted.
#[derive(Debug, Clone)]
pub struct FrameError {
    /// 1-based position of the frame within its file.
    pub frame: u64,
    pub reason: String,
}

/// Result of replaying one capture file.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub path: PathBuf,
    pub frames_attempted: u64,
    pub frames_sent: u64,
    /// True iff at least one frame was sent successfully.
    pub success: bool,
    /// Set iff a file-level failure occurred (missing, corrupt, empty).
    pub error_message: Option<String>,
    /// Individual frame failures within an otherwise processed file.
    pub frame_errors: Vec<FrameError>,
    /// The request was cancelled while this file was in flight.
    pub cancelled: bool,
}

impl ReplayOutcome {
    /// File-level failure before any frame was sent.
    pub fn failed(path: &Path, error_message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            frames_attempted: 0,
            frames_sent: 0,
            success: false,
            error_message: Some(error_message.into()),
            frame_errors: Vec::new(),
            cancelled: false,
        }
    }

    pub fn state(&self) -> FileState {
        if self.cancelled {
            FileState::Cancelled
        } else if self.success {
            FileState::Completed
        } else {
            FileState::Failed
        }
    }
}

/// Aggregate result of one replay request.
#[derive(Debug)]
pub struct RequestSummary {
    pub files_total: usize,
    pub files_succeeded: usize,
    pub cancelled: bool,
    pub outcomes: Vec<ReplayOutcome>,
}

impl RequestSummary {
    pub fn new(files_total: usize, outcomes: Vec<ReplayOutcome>, cancelled: bool) -> Self {
        let files_succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            files_total,
            files_succeeded,
            cancelled,
            outcomes,
        }
    }

    /// True when every file in the request replayed successfully.
    pub fn success(&self) -> bool {
        !self.cancelled && self.files_succeeded == self.files_total
    }

    /// Human-readable aggregate message for the final event.
    pub fn message(&self) -> String {
        if self.cancelled {
            format!(
                "cancelled after {} of {} files",
                self.outcomes.len(),
                self.files_total
            )
        } else if self.success() {
            format!("successfully sent {} files", self.files_total)
        } else {
            format!(
                "sent {} of {} files successfully",
                self.files_succeeded, self.files_total
            )
        }
    }
}
