//! Tick-driven behavior tree runtime built on `bt-core`.
//!
//! Nodes form a closed set of variants (see [`NodeKind`]): three composites, two decorators
//! and leaves. Leaves are the extension point; implement [`Behaviour`] to plug in an action
//! or a condition.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod composites;
pub mod decorators;
pub mod error;
pub mod leaves;
pub mod node;
pub mod runner;
pub mod status;
pub mod tick;

pub use composites::{Parallel, ParallelPolicy, Selector, Sequence};
pub use decorators::{Invert, InvertMode, Retry};
pub use error::{BtError, SetupError};
pub use leaves::Condition;
pub use node::{Behaviour, BtNode, NodeKind};
pub use runner::{BtRunner, CancelToken, RunOutcome, RunnerConfig};
pub use status::BtStatus;
pub use tick::TickContext;
