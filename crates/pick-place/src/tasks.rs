//! Leaf behaviours of the pick-and-place tree.
//!
//! Every leaf resolves within the tick it is updated in. Leaves that exchange poses do so
//! through the blackboard, so a writer has to sit earlier in the tree than its readers.

use bt_core::{BbKey, Blackboard, BlackboardClient, BlackboardError, Reader, Writer};
use bt_runtime::{Behaviour, BtStatus, TickContext};

use crate::collaborators::{SharedForceSensor, SharedManipulator, SharedObjectDetector};
use crate::Vec3;

/// Last detected object position.
pub const OBJECT_POSE: BbKey<Vec3> = BbKey::new(0x7069_636B_0000_0001, "object_pose");

/// Pose the next move should reach.
pub const MANIPULATOR_TARGET: BbKey<Vec3> =
    BbKey::new(0x7069_636B_0000_0002, "manipulator_target");

/// Where a leaf takes its input pose from.
#[derive(Debug, Clone, Copy)]
pub enum PoseInput {
    Fixed(Vec3),
    Blackboard(BbKey<Vec3>),
}

#[derive(Debug, Clone, Copy)]
enum PoseSource {
    Fixed(Vec3),
    Blackboard(Reader<Vec3>),
}

impl PoseSource {
    fn register(input: PoseInput, client: &mut BlackboardClient) -> Result<Self, BlackboardError> {
        Ok(match input {
            PoseInput::Fixed(pose) => PoseSource::Fixed(pose),
            PoseInput::Blackboard(key) => PoseSource::Blackboard(client.register_read(key)?),
        })
    }

    fn resolve(&self, blackboard: &Blackboard) -> Option<Vec3> {
        match self {
            PoseSource::Fixed(pose) => Some(*pose),
            PoseSource::Blackboard(reader) => reader.get(blackboard).copied(),
        }
    }
}

/// Looks for the object and publishes its position.
pub struct DetectObject {
    detector: SharedObjectDetector,
    pose: Writer<Vec3>,
    client: BlackboardClient,
}

impl DetectObject {
    pub fn new(detector: SharedObjectDetector, pose: BbKey<Vec3>) -> Result<Self, BlackboardError> {
        let mut client = BlackboardClient::new("DetectObject");
        let pose = client.register_write(pose)?;
        Ok(Self {
            detector,
            pose,
            client,
        })
    }

    pub fn blackboard_client(&self) -> &BlackboardClient {
        &self.client
    }
}

impl Behaviour for DetectObject {
    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        match self.detector.borrow_mut().detect_object() {
            Some(position) => {
                tracing::debug!(tick = ctx.tick, %position, "object detected");
                self.pose.set(ctx.blackboard, position);
                BtStatus::Success
            }
            None => {
                tracing::debug!(tick = ctx.tick, "object not detected");
                BtStatus::Failure
            }
        }
    }
}

/// Turns an object pose into the end-effector pose that grasps (or places) it.
pub struct CalculateGraspPosition {
    manipulator: SharedManipulator,
    object: PoseSource,
    target: Writer<Vec3>,
    client: BlackboardClient,
}

impl CalculateGraspPosition {
    pub fn new(
        manipulator: SharedManipulator,
        object: PoseInput,
        target: BbKey<Vec3>,
    ) -> Result<Self, BlackboardError> {
        let mut client = BlackboardClient::new("CalculateGraspPosition");
        let object = PoseSource::register(object, &mut client)?;
        let target = client.register_write(target)?;
        Ok(Self {
            manipulator,
            object,
            target,
            client,
        })
    }

    pub fn blackboard_client(&self) -> &BlackboardClient {
        &self.client
    }
}

impl Behaviour for CalculateGraspPosition {
    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        let Some(object) = self.object.resolve(ctx.blackboard) else {
            tracing::debug!(tick = ctx.tick, "no object pose to compute a grasp for");
            return BtStatus::Failure;
        };
        let grasp = self.manipulator.borrow().grasp_position_for(object);
        self.target.set(ctx.blackboard, grasp);
        BtStatus::Success
    }
}

pub struct MoveToPosition {
    manipulator: SharedManipulator,
    target: PoseSource,
    client: BlackboardClient,
}

impl MoveToPosition {
    pub fn new(manipulator: SharedManipulator, target: PoseInput) -> Result<Self, BlackboardError> {
        let mut client = BlackboardClient::new("MoveToPosition");
        let target = PoseSource::register(target, &mut client)?;
        Ok(Self {
            manipulator,
            target,
            client,
        })
    }

    pub fn blackboard_client(&self) -> &BlackboardClient {
        &self.client
    }
}

impl Behaviour for MoveToPosition {
    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        let Some(target) = self.target.resolve(ctx.blackboard) else {
            tracing::debug!(tick = ctx.tick, "move target not set");
            return BtStatus::Failure;
        };
        if self.manipulator.borrow_mut().move_to_position(target) {
            BtStatus::Success
        } else {
            tracing::debug!(tick = ctx.tick, %target, "move failed");
            BtStatus::Failure
        }
    }
}

/// Closes the gripper and confirms the grasp by force.
pub struct GripperClose {
    manipulator: SharedManipulator,
    force_sensor: SharedForceSensor,
}

impl GripperClose {
    pub fn new(manipulator: SharedManipulator, force_sensor: SharedForceSensor) -> Self {
        Self {
            manipulator,
            force_sensor,
        }
    }
}

impl Behaviour for GripperClose {
    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        if !self.manipulator.borrow_mut().grasp() {
            tracing::debug!(tick = ctx.tick, "gripper did not close");
            return BtStatus::Failure;
        }
        if self.force_sensor.borrow_mut().detect_force() {
            BtStatus::Success
        } else {
            tracing::debug!(tick = ctx.tick, "gripper closed on nothing");
            BtStatus::Failure
        }
    }
}

/// Opens the gripper and confirms nothing is held any more.
pub struct GripperOpen {
    manipulator: SharedManipulator,
    force_sensor: SharedForceSensor,
}

impl GripperOpen {
    pub fn new(manipulator: SharedManipulator, force_sensor: SharedForceSensor) -> Self {
        Self {
            manipulator,
            force_sensor,
        }
    }
}

impl Behaviour for GripperOpen {
    fn update(&mut self, ctx: &mut TickContext<'_>) -> BtStatus {
        if !self.manipulator.borrow_mut().release() {
            tracing::debug!(tick = ctx.tick, "gripper did not open");
            return BtStatus::Failure;
        }
        if self.force_sensor.borrow_mut().detect_force() {
            tracing::debug!(tick = ctx.tick, "force still sensed after opening");
            BtStatus::Failure
        } else {
            BtStatus::Success
        }
    }
}

/// Condition: the force sensor reports a held object.
pub struct ObjectHeld {
    force_sensor: SharedForceSensor,
}

impl ObjectHeld {
    pub fn new(force_sensor: SharedForceSensor) -> Self {
        Self { force_sensor }
    }
}

impl Behaviour for ObjectHeld {
    fn update(&mut self, _ctx: &mut TickContext<'_>) -> BtStatus {
        if self.force_sensor.borrow_mut().detect_force() {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }
}
