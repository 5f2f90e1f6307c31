//! One-request worker thread.
//!
//! Each replay request gets a fresh worker with an explicit
//! spawn/cancel/join lifecycle; workers are never recycled across
//! requests.

use std::thread::JoinHandle;

use super::cancel::CancelToken;
use super::engine::ReplayEngine;
use super::events::EventSink;
use super::outcome::RequestSummary;
use super::request::ReplayRequest;
use crate::iface::Transmit;

/// Handle to a running replay request.
pub struct ReplayWorker {
    handle: JoinHandle<RequestSummary>,
    cancel: CancelToken,
}

impl ReplayWorker {
    /// Run `request` through `engine` on its own thread. The engine (and
    /// with it the transmit handle) moves into the worker, enforcing
    /// exclusive ownership for the duration of the request.
    pub fn spawn<T, S>(mut engine: ReplayEngine<T>, request: ReplayRequest, mut sink: S) -> Self
    where
        T: Transmit + Send + 'static,
        S: EventSink + 'static,
    {
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();

        let handle = std::thread::spawn(move || {
            engine.run(&request, &mut sink, &worker_cancel)
        });

        Self { handle, cancel }
    }

    /// Request cooperative cancellation; the in-flight file will be marked
    /// `Cancelled` rather than `Failed`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the request to finish and return its summary.
    pub fn join(self) -> RequestSummary {
        match self.handle.join() {
            Ok(summary) => summary,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
