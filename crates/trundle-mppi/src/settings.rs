//! Resolved optimizer settings.
//!
//! [`OptimizerSettings`] is the validated, immutable-within-tick bundle the
//! optimizer works from. It is derived from [`ControllerConfig`](crate::config::ControllerConfig)
//! at construction and on dynamic re-binding; the only field mutated between
//! ticks is the working [`Constraints`] copy, through speed-limit signals.

// ---------------------------------------------------------------------------
// Constraints / SamplingStd
// ---------------------------------------------------------------------------

/// Per-axis symmetric velocity bounds (absolute values).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub vx: f64,
    pub vy: f64,
    pub wz: f64,
}

/// Per-axis standard deviation of the control sampling noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingStd {
    pub vx: f64,
    pub vy: f64,
    pub wz: f64,
}

// ---------------------------------------------------------------------------
// SpeedLimit
// ---------------------------------------------------------------------------

/// Runtime speed-limit signal from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedLimit {
    /// Remove any active limit and restore the base constraints exactly.
    None,
    /// Limit expressed in percent of the base maxima, `0.0..=100.0`.
    Percentage(f64),
    /// Absolute cap on `vx` in m/s; `vy` and `wz` scale proportionally.
    Absolute(f64),
}

// ---------------------------------------------------------------------------
// OptimizerSettings
// ---------------------------------------------------------------------------

/// Validated optimizer settings, stable for the duration of a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    /// Seconds per integration step.
    pub model_dt: f64,
    /// Horizon length T.
    pub time_steps: usize,
    /// Samples per tick B.
    pub batch_size: usize,
    /// Softmin refinements per tick.
    pub iteration_count: usize,
    /// Softmin scale; the update reduces to argmin as this goes to zero.
    pub temperature: f64,
    /// Configured maxima.
    pub base_constraints: Constraints,
    /// Working maxima, possibly reduced by a speed limit.
    pub constraints: Constraints,
    pub sampling_std: SamplingStd,
    /// Consecutive failing ticks tolerated before the optimizer gives up.
    pub retry_attempt_limit: u32,
    /// Derived: true iff the controller period equals `model_dt`.
    pub shift_control_sequence: bool,
    /// Master seed for the sampling noise stream.
    pub seed: u64,
}

impl OptimizerSettings {
    /// Apply a speed-limit signal to the working constraints.
    ///
    /// The base constraints are never touched, so [`SpeedLimit::None`]
    /// restores them exactly. An absolute limit scales `vy` and `wz` by the
    /// same ratio as `vx`; when `base.vx` is zero there is no meaningful
    /// ratio and the other axes are left at their base values.
    pub fn apply_speed_limit(&mut self, limit: SpeedLimit) {
        let base = self.base_constraints;
        match limit {
            SpeedLimit::None => {
                self.constraints = base;
            }
            SpeedLimit::Percentage(percent) => {
                let ratio = (percent / 100.0).clamp(0.0, 1.0);
                self.constraints = Constraints {
                    vx: base.vx * ratio,
                    vy: base.vy * ratio,
                    wz: base.wz * ratio,
                };
            }
            SpeedLimit::Absolute(limit) => {
                if base.vx > 0.0 {
                    let ratio = (limit / base.vx).clamp(0.0, 1.0);
                    self.constraints = Constraints {
                        vx: base.vx * ratio,
                        vy: base.vy * ratio,
                        wz: base.wz * ratio,
                    };
                } else {
                    self.constraints = base;
                }
            }
        }
    }
}
