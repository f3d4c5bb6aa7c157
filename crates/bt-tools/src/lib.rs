//! Tooling primitives for observing behavior tree runs.
//!
//! Events are recorded into a [`TraceSink`] chosen by whoever drives the tree; nothing here
//! formats or exports them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, TraceEvent, TraceLog, TraceSink, VecTraceSink};
