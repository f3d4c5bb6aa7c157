use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use bt_runtime::RunnerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{DEFAULT_HOME_POSITION, DEFAULT_TARGET_POSITION};
use crate::world::{ManipulatorState, WorldState};
use crate::Vec3;

/// Simulated pick-and-place run, usually loaded from a YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Chance the detector sees a visible object
    pub object_detect_success: f64,

    /// Chance a move reaches its target
    pub move_success: f64,

    /// Chance the gripper closes when asked
    pub grasp_success: f64,

    /// Chance an in-tolerance close slips instead of attaching
    pub slip_probability: f64,

    /// Chance the force sensor reports a held object
    pub force_detect_success: f64,

    pub object_position: Vec3,
    pub target_position: Vec3,
    pub home_position: Vec3,

    /// Grasp depth below the object along z
    pub grasp_offset_z: f64,

    /// Maximum end-effector distance from the grasp pose for a close to attach
    pub grasp_tolerance: f64,

    /// Root failures tolerated before the run is reported as failed
    pub max_num_runs: u32,

    pub tick_interval_ms: u64,

    /// Hard cap on ticks; unbounded when absent
    pub max_ticks: Option<u64>,

    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            object_detect_success: 0.8,
            move_success: 0.9,
            grasp_success: 0.9,
            slip_probability: WorldState::DEFAULT_SLIP_PROBABILITY,
            force_detect_success: 0.9,
            object_position: Vec3::new(1.0, 2.0, 3.0),
            target_position: DEFAULT_TARGET_POSITION,
            home_position: DEFAULT_HOME_POSITION,
            grasp_offset_z: ManipulatorState::DEFAULT_GRASP_OFFSET_Z,
            grasp_tolerance: ManipulatorState::DEFAULT_GRASP_TOLERANCE,
            max_num_runs: 10,
            tick_interval_ms: 100,
            max_ticks: None,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("`{field}` must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("`grasp_offset_z` must be finite and not negative, got {0}")]
    NegativeGraspOffset(f64),

    #[error("`max_num_runs` must be at least 1")]
    NoRuns,
}

impl SimConfig {
    /// Every device succeeds and grasps never slip.
    pub fn deterministic() -> Self {
        Self {
            object_detect_success: 1.0,
            move_success: 1.0,
            grasp_success: 1.0,
            slip_probability: 0.0,
            force_detect_success: 1.0,
            ..Self::default()
        }
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("object_detect_success", self.object_detect_success),
            ("move_success", self.move_success),
            ("grasp_success", self.grasp_success),
            ("slip_probability", self.slip_probability),
            ("force_detect_success", self.force_detect_success),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }

        if !(self.grasp_tolerance.is_finite() && self.grasp_tolerance > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "grasp_tolerance",
                value: self.grasp_tolerance,
            });
        }
        if !(self.grasp_offset_z.is_finite() && self.grasp_offset_z >= 0.0) {
            return Err(ConfigError::NegativeGraspOffset(self.grasp_offset_z));
        }
        if self.max_num_runs == 0 {
            return Err(ConfigError::NoRuns);
        }
        Ok(())
    }

    pub fn runner_config(&self) -> RunnerConfig {
        let config = RunnerConfig::default()
            .with_max_attempts(self.max_num_runs)
            .with_tick_interval(Duration::from_millis(self.tick_interval_ms));
        match self.max_ticks {
            Some(max_ticks) => config.with_max_ticks(max_ticks),
            None => config,
        }
    }
}
