//! Decorator sinks: each wraps an inner sink and adds one cross-cutting behavior.

pub mod buffering;
pub mod capture;
pub mod fan_out;
pub mod indexing;
pub mod unique_anchor;

pub use buffering::BufferingSink;
pub use capture::{CaptureLog, EventCapture};
pub use fan_out::FanOutSink;
pub use indexing::{AnchorsForIndexEntries, IndexingSink};
pub use unique_anchor::{UniqueAnchorSink, UniqueAnchors};
