use std::cell::RefCell;
use std::rc::Rc;

use bt_core::rng::derive_seed;
use bt_runtime::{BtError, BtNode, RunOutcome};
use bt_tools::{NullTraceSink, TraceSink};

use crate::config::{ConfigError, SimConfig};
use crate::mock::{MockForceSensor, MockManipulator, MockObjectDetector};
use crate::tree::{create_pickup_tree, run_tree_with};
use crate::world::{ManipulatorState, SharedWorld, WorldState};

const WORLD_STREAM: u64 = 0;
const MANIPULATOR_STREAM: u64 = 1;
const DETECTOR_STREAM: u64 = 2;
const FORCE_SENSOR_STREAM: u64 = 3;

/// One simulated work cell: the world model plus the mock devices acting on it.
///
/// Each device samples from its own stream derived from the config seed, so changing how
/// often one device is used does not shift the outcomes of the others.
pub struct Simulation {
    config: SimConfig,
    world: SharedWorld,
    manipulator: Rc<RefCell<MockManipulator>>,
    detector: Rc<RefCell<MockObjectDetector>>,
    force_sensor: Rc<RefCell<MockForceSensor>>,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed;

        let arm = ManipulatorState::new("manipulator")
            .with_grasp_geometry(config.grasp_offset_z, config.grasp_tolerance);
        let world = WorldState::new(config.object_position, arm)
            .with_slip_probability(config.slip_probability)
            .with_seed(derive_seed(seed, WORLD_STREAM))
            .into_shared();

        let manipulator = MockManipulator::new(world.clone(), derive_seed(seed, MANIPULATOR_STREAM))
            .with_move_success_rate(config.move_success)
            .with_grasp_success_rate(config.grasp_success);
        let detector = MockObjectDetector::new(world.clone(), derive_seed(seed, DETECTOR_STREAM))
            .with_detection_rate(config.object_detect_success);
        let force_sensor =
            MockForceSensor::new(world.clone(), derive_seed(seed, FORCE_SENSOR_STREAM))
                .with_detection_rate(config.force_detect_success);

        Ok(Self {
            config: config.clone(),
            world,
            manipulator: Rc::new(RefCell::new(manipulator)),
            detector: Rc::new(RefCell::new(detector)),
            force_sensor: Rc::new(RefCell::new(force_sensor)),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    pub fn manipulator(&self) -> &Rc<RefCell<MockManipulator>> {
        &self.manipulator
    }

    pub fn detector(&self) -> &Rc<RefCell<MockObjectDetector>> {
        &self.detector
    }

    pub fn force_sensor(&self) -> &Rc<RefCell<MockForceSensor>> {
        &self.force_sensor
    }

    pub fn build_tree(&self) -> Result<BtNode, BtError> {
        create_pickup_tree(
            self.manipulator.clone(),
            self.detector.clone(),
            self.force_sensor.clone(),
            self.config.target_position,
            self.config.home_position,
        )
    }

    /// Build a fresh tree and run it against this simulation's world.
    pub fn run(&self) -> Result<RunOutcome, BtError> {
        self.run_with_sink(NullTraceSink)
    }

    pub fn run_with_sink(&self, sink: impl TraceSink) -> Result<RunOutcome, BtError> {
        let mut root = self.build_tree()?;
        let outcome = run_tree_with(&mut root, self.config.runner_config(), sink)?;
        tracing::info!(?outcome, world = %self.world.borrow(), "simulation finished");
        Ok(outcome)
    }
}
