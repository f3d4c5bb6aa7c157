//! Seeded simulated devices backed by a shared [`WorldState`](crate::WorldState).

use bt_core::{DeterministicRng, SplitMix64};

use crate::collaborators::{ForceSensor, Manipulator, ObjectDetector};
use crate::world::SharedWorld;
use crate::Vec3;

#[derive(Debug)]
pub struct MockManipulator {
    world: SharedWorld,
    rng: SplitMix64,
    move_success_rate: f64,
    grasp_success_rate: f64,
}

impl MockManipulator {
    pub const DEFAULT_MOVE_SUCCESS_RATE: f64 = 0.9;
    pub const DEFAULT_GRASP_SUCCESS_RATE: f64 = 0.9;

    pub fn new(world: SharedWorld, seed: u64) -> Self {
        Self {
            world,
            rng: SplitMix64::new(seed),
            move_success_rate: Self::DEFAULT_MOVE_SUCCESS_RATE,
            grasp_success_rate: Self::DEFAULT_GRASP_SUCCESS_RATE,
        }
    }

    pub fn with_move_success_rate(mut self, rate: f64) -> Self {
        self.move_success_rate = rate;
        self
    }

    pub fn with_grasp_success_rate(mut self, rate: f64) -> Self {
        self.grasp_success_rate = rate;
        self
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    pub fn gripper_closed(&self) -> bool {
        self.world.borrow().manipulator().gripper_closed
    }

    pub fn endeffector_position(&self) -> Option<Vec3> {
        self.world.borrow().manipulator().endeffector_position
    }
}

impl Manipulator for MockManipulator {
    fn move_to_position(&mut self, target: Vec3) -> bool {
        let reached = self.rng.chance(self.move_success_rate);
        let mut world = self.world.borrow_mut();
        world.manipulator_mut().endeffector_position = reached.then_some(target);
        world.reconcile();
        tracing::debug!(%target, reached, "move");
        reached
    }

    fn grasp_position_for(&self, object: Vec3) -> Vec3 {
        self.world.borrow().manipulator().grasp_position_for(object)
    }

    fn grasp(&mut self) -> bool {
        if self.gripper_closed() {
            return true;
        }
        let closed = self.rng.chance(self.grasp_success_rate);
        if closed {
            let mut world = self.world.borrow_mut();
            world.manipulator_mut().gripper_closed = true;
            world.reconcile();
        }
        tracing::debug!(closed, "grasp");
        closed
    }

    fn release(&mut self) -> bool {
        if !self.gripper_closed() {
            return true;
        }
        let mut world = self.world.borrow_mut();
        world.manipulator_mut().gripper_closed = false;
        world.reconcile();
        tracing::debug!("release");
        true
    }
}

#[derive(Debug)]
pub struct MockObjectDetector {
    world: SharedWorld,
    rng: SplitMix64,
    detection_rate: f64,
}

impl MockObjectDetector {
    pub const DEFAULT_DETECTION_RATE: f64 = 0.8;

    pub fn new(world: SharedWorld, seed: u64) -> Self {
        Self {
            world,
            rng: SplitMix64::new(seed),
            detection_rate: Self::DEFAULT_DETECTION_RATE,
        }
    }

    pub fn with_detection_rate(mut self, rate: f64) -> Self {
        self.detection_rate = rate;
        self
    }
}

impl ObjectDetector for MockObjectDetector {
    fn detect_object(&mut self) -> Option<Vec3> {
        let world = self.world.borrow();
        if world.is_object_within_fov() && self.rng.chance(self.detection_rate) {
            world.object_position()
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct MockForceSensor {
    world: SharedWorld,
    rng: SplitMix64,
    detection_rate: f64,
}

impl MockForceSensor {
    pub const DEFAULT_DETECTION_RATE: f64 = 0.9;

    pub fn new(world: SharedWorld, seed: u64) -> Self {
        Self {
            world,
            rng: SplitMix64::new(seed),
            detection_rate: Self::DEFAULT_DETECTION_RATE,
        }
    }

    pub fn with_detection_rate(mut self, rate: f64) -> Self {
        self.detection_rate = rate;
        self
    }
}

impl ForceSensor for MockForceSensor {
    fn detect_force(&mut self) -> bool {
        self.world.borrow().holding_object() && self.rng.chance(self.detection_rate)
    }
}
