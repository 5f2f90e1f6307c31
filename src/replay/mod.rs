//! Packet replay engine.
//!
//! Turns ordered frame sequences plus a `ReplayRequest` into wire
//! transmissions, with optional address rewriting, timing-preserving
//! pacing, per-frame fault isolation, and cooperative cancellation.

mod cancel;
mod engine;
mod events;
mod outcome;
mod pacing;
mod request;
mod worker;

pub use cancel::CancelToken;
pub use engine::ReplayEngine;
pub use events::{ChannelSink, EventSink, NullSink, ReplayEvent};
pub use outcome::{FileState, FrameError, ReplayOutcome, RequestSummary};
pub use pacing::{inter_frame_delay, ThrottleConfig, MAX_INTER_FRAME_DELAY_SECS};
pub use request::ReplayRequest;
pub use worker::ReplayWorker;
