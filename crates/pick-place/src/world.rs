use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bt_core::{DeterministicRng, SplitMix64};

use crate::Vec3;

/// World model shared by every simulated device of one run.
pub type SharedWorld = Rc<RefCell<WorldState>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ManipulatorState {
    pub name: String,

    /// `None` after a failed move: the arm stopped somewhere unknown.
    pub endeffector_position: Option<Vec3>,
    pub gripper_closed: bool,

    grasp_offset_z: f64,
    grasp_tolerance: f64,
}

impl ManipulatorState {
    pub const DEFAULT_GRASP_OFFSET_Z: f64 = 0.1;
    pub const DEFAULT_GRASP_TOLERANCE: f64 = 0.1;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endeffector_position: None,
            gripper_closed: false,
            grasp_offset_z: Self::DEFAULT_GRASP_OFFSET_Z,
            grasp_tolerance: Self::DEFAULT_GRASP_TOLERANCE,
        }
    }

    pub fn with_endeffector_position(mut self, position: Vec3) -> Self {
        self.endeffector_position = Some(position);
        self
    }

    pub fn with_grasp_geometry(mut self, offset_z: f64, tolerance: f64) -> Self {
        self.grasp_offset_z = offset_z;
        self.grasp_tolerance = tolerance;
        self
    }

    pub fn grasp_offset_z(&self) -> f64 {
        self.grasp_offset_z
    }

    pub fn grasp_tolerance(&self) -> f64 {
        self.grasp_tolerance
    }

    /// Where the end-effector has to be to close around an object at `object`.
    pub fn grasp_position_for(&self, object: Vec3) -> Vec3 {
        object - Vec3::new(0.0, 0.0, self.grasp_offset_z)
    }

    /// False whenever either position is unknown.
    pub fn is_object_within_grasp_offset(&self, object: Option<Vec3>) -> bool {
        match (self.endeffector_position, object) {
            (Some(ee), Some(object)) => self.within_tolerance(ee, object),
            _ => false,
        }
    }

    fn within_tolerance(&self, ee: Vec3, object: Vec3) -> bool {
        ee.distance(self.grasp_position_for(object)) <= self.grasp_tolerance
    }
}

/// What the gripper currently has to do with the object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attachment {
    Detached,

    /// Held; the object follows the end-effector at `offset`.
    Attached { offset: Vec3 },

    /// The last close slipped. Nothing can attach until the gripper is seen open again.
    SlipLatched,
}

/// Physical bookkeeping for one manipulator and one object.
///
/// Every device action that can change the gripper or the end-effector position must be
/// followed by [`WorldState::reconcile`], which is the only place the attachment changes.
#[derive(Debug, Clone)]
pub struct WorldState {
    object_position: Option<Vec3>,
    object_visible: bool,
    manipulator: ManipulatorState,
    attachment: Attachment,
    slip_probability: f64,
    rng: SplitMix64,
}

impl WorldState {
    pub const DEFAULT_SLIP_PROBABILITY: f64 = 0.3;

    pub fn new(object_position: Vec3, manipulator: ManipulatorState) -> Self {
        Self {
            object_position: Some(object_position),
            object_visible: true,
            manipulator,
            attachment: Attachment::Detached,
            slip_probability: Self::DEFAULT_SLIP_PROBABILITY,
            rng: SplitMix64::new(0),
        }
    }

    pub fn with_slip_probability(mut self, slip_probability: f64) -> Self {
        self.slip_probability = slip_probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SplitMix64::new(seed);
        self
    }

    pub fn into_shared(self) -> SharedWorld {
        Rc::new(RefCell::new(self))
    }

    pub fn manipulator(&self) -> &ManipulatorState {
        &self.manipulator
    }

    /// Devices change the arm through this; call [`WorldState::reconcile`] afterwards.
    pub fn manipulator_mut(&mut self) -> &mut ManipulatorState {
        &mut self.manipulator
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    pub fn holding_object(&self) -> bool {
        matches!(self.attachment, Attachment::Attached { .. })
    }

    pub fn is_slip_latched(&self) -> bool {
        self.attachment == Attachment::SlipLatched
    }

    pub fn slip_probability(&self) -> f64 {
        self.slip_probability
    }

    pub fn set_slip_probability(&mut self, slip_probability: f64) {
        self.slip_probability = slip_probability;
    }

    /// Current object position. While held it is derived from the end-effector, so it is
    /// `None` whenever the end-effector position is unknown.
    pub fn object_position(&self) -> Option<Vec3> {
        match self.attachment {
            Attachment::Attached { offset } => {
                self.manipulator.endeffector_position.map(|ee| ee + offset)
            }
            Attachment::Detached | Attachment::SlipLatched => self.object_position,
        }
    }

    /// Panics while the object is held.
    pub fn set_object_position(&mut self, position: Vec3) {
        assert!(
            !self.holding_object(),
            "cannot set the position of an object held by `{}`",
            self.manipulator.name
        );
        self.object_position = Some(position);
    }

    /// Panics unless the object is held.
    pub fn attached_offset(&self) -> Vec3 {
        match self.attachment {
            Attachment::Attached { offset } => offset,
            other => panic!("no attachment offset while {other:?}"),
        }
    }

    pub fn is_object_within_grasp_offset(&self) -> bool {
        self.manipulator
            .is_object_within_grasp_offset(self.object_position())
    }

    pub fn is_object_within_fov(&self) -> bool {
        self.object_visible
    }

    pub fn set_object_visible(&mut self, visible: bool) {
        self.object_visible = visible;
    }

    /// Bring the attachment in line with the gripper and end-effector.
    ///
    /// A close that finds the object in tolerance samples the slip probability exactly once;
    /// a slipped grasp stays latched until a reconcile observes the gripper open.
    pub fn reconcile(&mut self) {
        let closed = self.manipulator.gripper_closed;
        match self.attachment {
            Attachment::Attached { offset } if !closed => {
                self.object_position = self.manipulator.endeffector_position.map(|ee| ee + offset);
                self.attachment = Attachment::Detached;
                tracing::debug!(
                    manipulator = %self.manipulator.name,
                    released_at = ?self.object_position,
                    "object released"
                );
            }
            Attachment::SlipLatched if !closed => {
                self.attachment = Attachment::Detached;
                tracing::debug!(manipulator = %self.manipulator.name, "slip latch cleared");
            }
            Attachment::Detached if closed => {
                let (Some(ee), Some(object)) =
                    (self.manipulator.endeffector_position, self.object_position)
                else {
                    return;
                };
                if !self.manipulator.within_tolerance(ee, object) {
                    return;
                }
                if self.rng.chance(self.slip_probability) {
                    self.attachment = Attachment::SlipLatched;
                    tracing::debug!(manipulator = %self.manipulator.name, "grasp slipped");
                } else {
                    self.attachment = Attachment::Attached {
                        offset: object - ee,
                    };
                    tracing::debug!(manipulator = %self.manipulator.name, "object attached");
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = |p: Option<Vec3>| p.map_or_else(|| "unknown".to_string(), |p| p.to_string());
        write!(
            f,
            "{} ee={} gripper={} object={} attachment={:?}",
            self.manipulator.name,
            position(self.manipulator.endeffector_position),
            if self.manipulator.gripper_closed { "closed" } else { "open" },
            position(self.object_position()),
            self.attachment,
        )
    }
}
