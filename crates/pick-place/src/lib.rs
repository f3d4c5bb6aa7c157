//! Pick-and-place task built on the behavior tree runtime.
//!
//! The [`world`] module owns the physical bookkeeping (what the gripper holds and where the
//! object is), the [`collaborators`] traits are what the tree's leaves talk to, and [`mock`]
//! provides seeded simulated devices that drive the world model.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod collaborators;
pub mod config;
pub mod math;
pub mod mock;
pub mod sim;
pub mod tasks;
pub mod tree;
pub mod world;

pub use collaborators::{
    ForceSensor, Manipulator, ObjectDetector, SharedForceSensor, SharedManipulator,
    SharedObjectDetector,
};
pub use config::{ConfigError, SimConfig};
pub use math::Vec3;
pub use mock::{MockForceSensor, MockManipulator, MockObjectDetector};
pub use sim::Simulation;
pub use tree::{create_pickup_tree, run_tree, run_tree_with};
pub use world::{Attachment, ManipulatorState, SharedWorld, WorldState};
