//! Controller configuration.
//!
//! The flat parameter surface for one controller instance, deserializable
//! from TOML. Parsing accepts any shape the types allow; [`ControllerConfig::validate`]
//! is where admissible ranges and name registries are enforced, so both the
//! static (construction-time) and dynamic (re-binding) paths share one gate.

use std::path::Path as FsPath;

use serde::Deserialize;
use trundle_core::error::ConfigError;

use crate::critics::{
    ApproxReferenceTrajectoryCriticConfig, GoalAngleCriticConfig, GoalCriticConfig,
    ObstaclesCriticConfig, PathAngleCriticConfig, PathFollowCriticConfig,
    PreferForwardCriticConfig, ReferenceTrajectoryCriticConfig, SmootherCriticConfig,
    TwirlingCriticConfig,
};
use crate::motion::MotionModel;
use crate::settings::{Constraints, OptimizerSettings, SamplingStd};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_model_dt() -> f64 {
    0.1
}
const fn default_time_steps() -> usize {
    15
}
const fn default_batch_size() -> usize {
    400
}
const fn default_iteration_count() -> usize {
    1
}
const fn default_temperature() -> f64 {
    0.25
}
const fn default_vx_max() -> f64 {
    0.5
}
const fn default_vy_max() -> f64 {
    0.5
}
const fn default_wz_max() -> f64 {
    1.3
}
const fn default_vx_std() -> f64 {
    0.2
}
const fn default_vy_std() -> f64 {
    0.2
}
const fn default_wz_std() -> f64 {
    1.0
}
const fn default_retry_attempt_limit() -> u32 {
    1
}
const fn default_min_turning_radius() -> f64 {
    0.2
}
fn default_motion_model() -> String {
    "DiffDrive".into()
}
fn default_base_frame() -> String {
    "base_link".into()
}
fn default_critics() -> Vec<String> {
    [
        "Obstacles",
        "ApproxReferenceTrajectory",
        "PathAngle",
        "PathFollow",
        "Goal",
        "GoalAngle",
        "PreferForward",
        "Twirling",
        "Smoother",
    ]
    .map(String::from)
    .to_vec()
}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Full parameter surface for one controller instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControllerConfig {
    /// Seconds per integration step.
    #[serde(default = "default_model_dt")]
    pub model_dt: f64,

    /// Horizon length T.
    #[serde(default = "default_time_steps")]
    pub time_steps: usize,

    /// Samples per tick B.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Softmin refinements per tick.
    #[serde(default = "default_iteration_count")]
    pub iteration_count: usize,

    /// Softmin scale.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Base velocity constraints, absolute values.
    #[serde(default = "default_vx_max")]
    pub vx_max: f64,
    #[serde(default = "default_vy_max")]
    pub vy_max: f64,
    #[serde(default = "default_wz_max")]
    pub wz_max: f64,

    /// Sampling noise standard deviations.
    #[serde(default = "default_vx_std")]
    pub vx_std: f64,
    #[serde(default = "default_vy_std")]
    pub vy_std: f64,
    #[serde(default = "default_wz_std")]
    pub wz_std: f64,

    /// Consecutive failing ticks tolerated before giving up.
    #[serde(default = "default_retry_attempt_limit")]
    pub retry_attempt_limit: u32,

    /// Motion model name: DiffDrive, Omni, or Ackermann.
    #[serde(default = "default_motion_model")]
    pub motion_model: String,

    /// Ackermann only: minimum turning radius in meters.
    #[serde(default = "default_min_turning_radius")]
    pub min_turning_radius: f64,

    /// Master seed for the sampling noise stream.
    #[serde(default)]
    pub seed: u64,

    /// Frame id stamped onto outgoing commands.
    #[serde(default = "default_base_frame")]
    pub base_frame: String,

    /// Critic names, invoked in this order each tick.
    #[serde(default = "default_critics")]
    pub critics: Vec<String>,

    #[serde(default)]
    pub goal: GoalCriticConfig,
    #[serde(default)]
    pub goal_angle: GoalAngleCriticConfig,
    #[serde(default)]
    pub reference_trajectory: ReferenceTrajectoryCriticConfig,
    #[serde(default)]
    pub approx_reference_trajectory: ApproxReferenceTrajectoryCriticConfig,
    #[serde(default)]
    pub path_angle: PathAngleCriticConfig,
    #[serde(default)]
    pub path_follow: PathFollowCriticConfig,
    #[serde(default)]
    pub prefer_forward: PreferForwardCriticConfig,
    #[serde(default)]
    pub twirling: TwirlingCriticConfig,
    #[serde(default)]
    pub obstacles: ObstaclesCriticConfig,
    #[serde(default)]
    pub smoother: SmootherCriticConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            model_dt: default_model_dt(),
            time_steps: default_time_steps(),
            batch_size: default_batch_size(),
            iteration_count: default_iteration_count(),
            temperature: default_temperature(),
            vx_max: default_vx_max(),
            vy_max: default_vy_max(),
            wz_max: default_wz_max(),
            vx_std: default_vx_std(),
            vy_std: default_vy_std(),
            wz_std: default_wz_std(),
            retry_attempt_limit: default_retry_attempt_limit(),
            motion_model: default_motion_model(),
            min_turning_radius: default_min_turning_radius(),
            seed: 0,
            base_frame: default_base_frame(),
            critics: default_critics(),
            goal: GoalCriticConfig::default(),
            goal_angle: GoalAngleCriticConfig::default(),
            reference_trajectory: ReferenceTrajectoryCriticConfig::default(),
            approx_reference_trajectory: ApproxReferenceTrajectoryCriticConfig::default(),
            path_angle: PathAngleCriticConfig::default(),
            path_follow: PathFollowCriticConfig::default(),
            prefer_forward: PreferForwardCriticConfig::default(),
            twirling: TwirlingCriticConfig::default(),
            obstacles: ObstaclesCriticConfig::default(),
            smoother: SmootherCriticConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Parse a TOML document; absent keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load and parse a TOML file.
    pub fn from_file(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate the full surface. Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.model_dt.is_finite() || self.model_dt <= 0.0 {
            return Err(ConfigError::out_of_range(
                "model_dt",
                format!("must be finite and > 0, got {}", self.model_dt),
            ));
        }
        if self.time_steps < 2 {
            return Err(ConfigError::out_of_range(
                "time_steps",
                format!("must be >= 2, got {}", self.time_steps),
            ));
        }
        if self.batch_size < 1 {
            return Err(ConfigError::out_of_range("batch_size", "must be >= 1"));
        }
        if self.iteration_count < 1 {
            return Err(ConfigError::out_of_range("iteration_count", "must be >= 1"));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(ConfigError::out_of_range(
                "temperature",
                format!("must be finite and > 0, got {}", self.temperature),
            ));
        }
        for (field, value) in [
            ("vx_max", self.vx_max),
            ("vy_max", self.vy_max),
            ("wz_max", self.wz_max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::out_of_range(
                    field,
                    format!("must be finite and >= 0, got {value}"),
                ));
            }
        }
        for (field, value) in [
            ("vx_std", self.vx_std),
            ("vy_std", self.vy_std),
            ("wz_std", self.wz_std),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::out_of_range(
                    field,
                    format!("must be finite and >= 0, got {value}"),
                ));
            }
        }
        // Rejects unknown names and a non-positive Ackermann radius.
        MotionModel::from_name(&self.motion_model, self.min_turning_radius)?;
        Ok(())
    }

    /// Derive the optimizer settings. Shift derivation happens separately,
    /// where the host's controller frequency is known.
    pub fn to_settings(&self) -> OptimizerSettings {
        let base_constraints = Constraints {
            vx: self.vx_max,
            vy: self.vy_max,
            wz: self.wz_max,
        };
        OptimizerSettings {
            model_dt: self.model_dt,
            time_steps: self.time_steps,
            batch_size: self.batch_size,
            iteration_count: self.iteration_count,
            temperature: self.temperature,
            base_constraints,
            constraints: base_constraints,
            sampling_std: SamplingStd {
                vx: self.vx_std,
                vy: self.vy_std,
                wz: self.wz_std,
            },
            retry_attempt_limit: self.retry_attempt_limit,
            shift_control_sequence: false,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_surface() {
        let config = ControllerConfig::default();
        assert_eq!(config.model_dt, 0.1);
        assert_eq!(config.time_steps, 15);
        assert_eq!(config.batch_size, 400);
        assert_eq!(config.iteration_count, 1);
        assert_eq!(config.temperature, 0.25);
        assert_eq!(config.vx_max, 0.5);
        assert_eq!(config.wz_max, 1.3);
        assert_eq!(config.wz_std, 1.0);
        assert_eq!(config.retry_attempt_limit, 1);
        assert_eq!(config.motion_model, "DiffDrive");
        assert_eq!(config.min_turning_radius, 0.2);
        assert_eq!(config.base_frame, "base_link");
        assert!(config.critics.iter().any(|name| name == "Obstacles"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_and_defaults_compose() {
        let config = ControllerConfig::from_toml_str(
            r#"
            batch_size = 1000
            motion_model = "Omni"
            critics = ["Goal", "Obstacles"]

            [goal]
            cost_weight = 9.5
            "#,
        )
        .unwrap();
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.motion_model, "Omni");
        assert_eq!(config.critics, vec!["Goal", "Obstacles"]);
        assert_eq!(config.goal.cost_weight, 9.5);
        // Untouched keys keep their defaults.
        assert_eq!(config.time_steps, 15);
        assert!(config.goal.enabled);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = ControllerConfig::from_toml_str("batch_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn validate_rejects_out_of_range_numerics() {
        let mut config = ControllerConfig::default();
        config.model_dt = 0.0;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.time_steps = 1;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.temperature = -1.0;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.vx_std = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_motion_model() {
        let mut config = ControllerConfig::default();
        config.motion_model = "Tank".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Tank"));
    }

    #[test]
    fn settings_copy_constraints_from_base() {
        let config = ControllerConfig::default();
        let settings = config.to_settings();
        assert_eq!(settings.constraints, settings.base_constraints);
        assert_eq!(settings.base_constraints.wz, 1.3);
        assert_eq!(settings.sampling_std.vx, 0.2);
    }
}
