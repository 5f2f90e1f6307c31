//! Progress reporting from the engine to its caller.
//!
//! The engine only ever pushes events out; it never queries caller state.
//! Callers either implement `EventSink` directly or receive `ReplayEvent`s
//! over a channel via `ChannelSink`.

use std::sync::mpsc::Sender;

/// Callbacks emitted by the engine during one request.
pub trait EventSink: Send {
    /// Emitted before a file begins processing.
    fn on_file_started(&mut self, _file_name: &str) {}

    /// Emitted once per completed file.
    fn on_progress(&mut self, _files_done: usize, _files_total: usize) {}

    /// Emitted exactly once per request.
    fn on_finished(&mut self, _success: bool, _message: &str) {}
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {}

/// Event form of the sink callbacks, for channel-based callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayEvent {
    FileStarted { file_name: String },
    Progress { files_done: usize, files_total: usize },
    Finished { success: bool, message: String },
}

/// Sink that forwards events over an mpsc channel. A dropped receiver is
/// not an error; the replay keeps running.
pub struct ChannelSink {
    sender: Sender<ReplayEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<ReplayEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn on_file_started(&mut self, file_name: &str) {
        let _ = self.sender.send(ReplayEvent::FileStarted {
            file_name: file_name.to_string(),
        });
    }

    fn on_progress(&mut self, files_done: usize, files_total: usize) {
        let _ = self.sender.send(ReplayEvent::Progress {
            files_done,
            files_total,
        });
    }

    fn on_finished(&mut self, success: bool, message: &str) {
        let _ = self.sender.send(ReplayEvent::Finished {
            success,
            message: message.to_string(),
        });
    }
}
