use std::time::Duration;

use bt_runtime::{BtError, BtNode, BtRunner, ParallelPolicy, RunOutcome, RunnerConfig};
use bt_tools::{NullTraceSink, TraceSink};

use crate::collaborators::{SharedForceSensor, SharedManipulator, SharedObjectDetector};
use crate::tasks::{
    CalculateGraspPosition, DetectObject, GripperClose, GripperOpen, MoveToPosition, ObjectHeld,
    PoseInput, MANIPULATOR_TARGET, OBJECT_POSE,
};
use crate::Vec3;

pub const DEFAULT_TARGET_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);
pub const DEFAULT_HOME_POSITION: Vec3 = Vec3::new(15.0, 15.0, 15.0);

/// Consecutive failures tolerated by each retried step before it fails the attempt.
pub const STEP_ATTEMPTS: u32 = 3;

/// Pause between ticks for [`run_tree`].
pub const RUN_TREE_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Build the pick-and-place tree.
///
/// ```text
/// Pick and place                      (sequence, memory)
/// ├── Ensure object grasped           (selector)
/// │   ├── Object held?
/// │   └── Pick object                 (sequence, memory)
/// │       ├── Detect object           (retry)
/// │       ├── Calculate pick position
/// │       ├── Move to object          (retry)
/// │       └── Grasp object            (retry)
/// │           └── Grasp or recover    (selector)
/// │               ├── Close gripper
/// │               └── Recover grasp   (success is failure)
/// │                   └── Open gripper
/// ├── Carry object                    (parallel, success on all)
/// │   ├── Move to target              (sequence, memory)
/// │   │   ├── Calculate place position
/// │   │   └── Move to place           (retry)
/// │   └── Object still held?
/// ├── Release object                  (retry)
/// └── Move home                       (retry)
/// ```
///
/// The pick branch writes the detected pose and the grasp target to the blackboard before
/// any move reads them; the carry branch overwrites the target with the place pose.
pub fn create_pickup_tree(
    manipulator: SharedManipulator,
    detector: SharedObjectDetector,
    force_sensor: SharedForceSensor,
    target: Vec3,
    home: Vec3,
) -> Result<BtNode, BtError> {
    let pick = BtNode::mem_sequence(
        "Pick object",
        vec![
            BtNode::retry(
                "Detect object",
                STEP_ATTEMPTS,
                BtNode::leaf("Detect", DetectObject::new(detector, OBJECT_POSE)?),
            ),
            BtNode::leaf(
                "Calculate pick position",
                CalculateGraspPosition::new(
                    manipulator.clone(),
                    PoseInput::Blackboard(OBJECT_POSE),
                    MANIPULATOR_TARGET,
                )?,
            ),
            BtNode::retry(
                "Move to object",
                STEP_ATTEMPTS,
                BtNode::leaf(
                    "Move to pick position",
                    MoveToPosition::new(
                        manipulator.clone(),
                        PoseInput::Blackboard(MANIPULATOR_TARGET),
                    )?,
                ),
            ),
            BtNode::retry(
                "Grasp object",
                STEP_ATTEMPTS,
                BtNode::selector(
                    "Grasp or recover",
                    vec![
                        BtNode::leaf(
                            "Close gripper",
                            GripperClose::new(manipulator.clone(), force_sensor.clone()),
                        ),
                        BtNode::success_is_failure(
                            "Recover grasp",
                            BtNode::leaf(
                                "Open gripper after failed grasp",
                                GripperOpen::new(manipulator.clone(), force_sensor.clone()),
                            ),
                        ),
                    ],
                ),
            ),
        ],
    );

    let ensure_grasped = BtNode::selector(
        "Ensure object grasped",
        vec![
            BtNode::leaf("Object held?", ObjectHeld::new(force_sensor.clone())),
            pick,
        ],
    );

    let carry = BtNode::parallel(
        "Carry object",
        ParallelPolicy::SuccessOnAll { synchronise: false },
        vec![
            BtNode::mem_sequence(
                "Move to target",
                vec![
                    BtNode::leaf(
                        "Calculate place position",
                        CalculateGraspPosition::new(
                            manipulator.clone(),
                            PoseInput::Fixed(target),
                            MANIPULATOR_TARGET,
                        )?,
                    ),
                    BtNode::retry(
                        "Move to place",
                        STEP_ATTEMPTS,
                        BtNode::leaf(
                            "Move to place position",
                            MoveToPosition::new(
                                manipulator.clone(),
                                PoseInput::Blackboard(MANIPULATOR_TARGET),
                            )?,
                        ),
                    ),
                ],
            ),
            BtNode::leaf("Object still held?", ObjectHeld::new(force_sensor.clone())),
        ],
    );

    let release = BtNode::retry(
        "Release object",
        STEP_ATTEMPTS,
        BtNode::leaf("Open gripper", GripperOpen::new(manipulator.clone(), force_sensor)),
    );

    let go_home = BtNode::retry(
        "Move home",
        STEP_ATTEMPTS,
        BtNode::leaf(
            "Move to home position",
            MoveToPosition::new(manipulator, PoseInput::Fixed(home))?,
        ),
    );

    Ok(BtNode::mem_sequence(
        "Pick and place",
        vec![ensure_grasped, carry, release, go_home],
    ))
}

/// Run `root` until it succeeds or has failed `max_num_runs` times.
///
/// A failed root is ticked again as it is: nodes and the world they act on keep their state.
pub fn run_tree(root: &mut BtNode, max_num_runs: u32) -> bool {
    let config = RunnerConfig::default()
        .with_max_attempts(max_num_runs)
        .with_tick_interval(RUN_TREE_TICK_INTERVAL);
    match run_tree_with(root, config, NullTraceSink) {
        Ok(outcome) => outcome.is_success(),
        Err(err) => {
            tracing::error!(error = %err, "tree run aborted");
            false
        }
    }
}

pub fn run_tree_with<'a>(
    root: &'a mut BtNode,
    config: RunnerConfig,
    sink: impl TraceSink + 'a,
) -> Result<RunOutcome, BtError> {
    BtRunner::new(root, config).with_sink(sink).run()
}
