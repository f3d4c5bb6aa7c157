//! Devices the task tree acts through.
//!
//! Leaves hold shared handles so one device can serve several nodes (the manipulator is
//! used by every move, grasp and release leaf).

use std::cell::RefCell;
use std::rc::Rc;

use crate::Vec3;

pub trait Manipulator {
    /// `true` when the end-effector reached `target`. On failure the end-effector position
    /// becomes unknown.
    fn move_to_position(&mut self, target: Vec3) -> bool;

    /// End-effector pose for grasping an object at `object`.
    fn grasp_position_for(&self, object: Vec3) -> Vec3;

    /// Close the gripper. Already closed: `true` without another attempt.
    fn grasp(&mut self) -> bool;

    /// Open the gripper. Already open: `true`.
    fn release(&mut self) -> bool;
}

pub trait ObjectDetector {
    /// Never reports a position the object is not at.
    fn detect_object(&mut self) -> Option<Vec3>;
}

pub trait ForceSensor {
    /// Never reports contact while nothing is held.
    fn detect_force(&mut self) -> bool;
}

pub type SharedManipulator = Rc<RefCell<dyn Manipulator>>;
pub type SharedObjectDetector = Rc<RefCell<dyn ObjectDetector>>;
pub type SharedForceSensor = Rc<RefCell<dyn ForceSensor>>;
