//! Deterministic, single-threaded primitives shared by the behavior tree runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod error;
pub mod rng;

pub use blackboard::{Access, BbKey, Blackboard, BlackboardClient, ReadWriter, Reader, Writer};
pub use error::BlackboardError;
pub use rng::{DeterministicRng, SplitMix64};
