//! The MPPI optimization loop.
//!
//! Each control tick the optimizer perturbs its nominal control sequence
//! with Gaussian noise, simulates every perturbed sequence forward through
//! the motion model, scores the resulting trajectories with the critic
//! pipeline, and folds the scores back into the nominal via the softmin
//! update. The nominal persists across ticks as a warm start; when the
//! controller period matches the model step it is shifted by one step so
//! the horizon stays aligned with wall-clock time.

use log::{debug, info, warn};
use nalgebra::DVector;

use trundle_core::costmap::Costmap;
use trundle_core::error::{ConfigError, OptimizerError};
use trundle_core::goal_checker::GoalChecker;
use trundle_core::types::{Path, Pose2, PoseStamped, Twist2, TwistStamped};

use crate::config::ControllerConfig;
use crate::control::ControlSequence;
use crate::critics::{CriticData, CriticManager};
use crate::integrator::integrate;
use crate::motion::MotionModel;
use crate::noise::NoiseGenerator;
use crate::settings::{OptimizerSettings, SpeedLimit};
use crate::state::StateBatch;
use crate::trajectories::Trajectories;

// ---------------------------------------------------------------------------
// Softmin
// ---------------------------------------------------------------------------

/// Softmin weights over the batch: `w_i ∝ exp(-(c_i - min c) / temperature)`,
/// normalized to sum to one. The minimum-cost sample always receives the
/// largest weight; as temperature goes to zero the weights collapse onto it.
pub fn softmin_weights(costs: &DVector<f64>, temperature: f64) -> DVector<f64> {
    let min = costs.min();
    let mut weights = DVector::zeros(costs.len());
    let mut total = 0.0;
    for (w, c) in weights.iter_mut().zip(costs.iter()) {
        *w = (-(c - min) / temperature).exp();
        total += *w;
    }
    // The minimum-cost sample contributes exp(0), so total >= 1.
    weights / total
}

fn derive_shift(controller_frequency: f64, model_dt: f64) -> Result<bool, ConfigError> {
    const EPS: f64 = 1e-6;
    if !controller_frequency.is_finite() || controller_frequency <= 0.0 {
        return Err(ConfigError::out_of_range(
            "controller_frequency",
            format!("must be finite and > 0, got {controller_frequency}"),
        ));
    }
    let period = 1.0 / controller_frequency;
    if (period - model_dt).abs() < EPS {
        info!("controller period equals model_dt; control sequence shifting enabled");
        Ok(true)
    } else if period < model_dt {
        Err(ConfigError::PeriodShorterThanModelDt { period, model_dt })
    } else {
        warn!(
            "controller period {period} s exceeds model_dt {model_dt} s; \
             control sequence shifting disabled"
        );
        Ok(false)
    }
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

/// Owns the persistent nominal control, the batch buffers, and the sampling
/// pipeline. One instance per controller; reentrant per instance.
#[derive(Debug)]
pub struct Optimizer {
    settings: OptimizerSettings,
    controller_frequency: f64,
    base_frame: String,
    motion_model: MotionModel,
    noise: NoiseGenerator,
    critics: CriticManager,
    state: StateBatch,
    trajectories: Trajectories,
    costs: DVector<f64>,
    control_sequence: ControlSequence,
    retry_counter: u32,
}

impl Optimizer {
    /// Build an optimizer from the validated configuration and the host's
    /// controller frequency in Hz.
    pub fn new(config: &ControllerConfig, controller_frequency: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        let motion_model = MotionModel::from_name(&config.motion_model, config.min_turning_radius)?;
        let mut settings = config.to_settings();
        settings.shift_control_sequence = derive_shift(controller_frequency, settings.model_dt)?;
        let critics = CriticManager::from_config(config)?;

        let layout = motion_model.layout();
        let noise = NoiseGenerator::new(&settings, motion_model.is_holonomic());
        let state = StateBatch::new(
            settings.batch_size,
            settings.time_steps,
            settings.model_dt,
            layout,
        );
        let trajectories = Trajectories::new(settings.batch_size, settings.time_steps);
        let costs = DVector::zeros(settings.batch_size);
        let control_sequence = ControlSequence::new(settings.time_steps, layout);

        info!(
            "optimizer configured: model={}, batch_size={}, time_steps={}, critics={:?}",
            motion_model.name(),
            settings.batch_size,
            settings.time_steps,
            critics.names().collect::<Vec<_>>()
        );

        Ok(Self {
            settings,
            controller_frequency,
            base_frame: config.base_frame.clone(),
            motion_model,
            noise,
            critics,
            state,
            trajectories,
            costs,
            control_sequence,
            retry_counter: 0,
        })
    }

    /// Compute the control command for one tick.
    ///
    /// Runs the optimization loop; on a transient failure (a critic flagged
    /// every sample unusable) the buffers are rebuilt and the tick retried
    /// once with fresh noise. A tick that still fails commands a stop via
    /// the freshly zeroed sequence and consumes one unit of the retry
    /// budget; once `retry_attempt_limit` consecutive ticks have failed, the
    /// next failure surfaces as [`OptimizerError::OptimizationFailed`]. Any
    /// successful tick returns the budget to full.
    pub fn eval_control(
        &mut self,
        robot_pose: &PoseStamped,
        robot_speed: Twist2,
        path: &Path,
        goal_checker: &dyn GoalChecker,
        costmap: &dyn Costmap,
    ) -> Result<TwistStamped, OptimizerError> {
        if path.is_empty() {
            return Err(ConfigError::out_of_range("path", "reference path is empty").into());
        }
        let pose = robot_pose.pose;
        self.state.pose = pose;

        let mut fail = self.optimize(pose, robot_speed, path, goal_checker, costmap);
        if fail {
            warn!("no usable sample in batch; resetting for an in-tick recovery attempt");
            self.reset();
            self.state.pose = pose;
            fail = self.optimize(pose, robot_speed, path, goal_checker, costmap);
        }

        if fail {
            self.reset();
            self.retry_counter += 1;
            if self.retry_counter > self.settings.retry_attempt_limit {
                let attempts = self.retry_counter;
                self.retry_counter = 0;
                return Err(OptimizerError::OptimizationFailed { attempts });
            }
            // The zeroed sequence commands a stop while the budget lasts.
        } else {
            self.retry_counter = 0;
        }

        let offset = usize::from(self.settings.shift_control_sequence);
        let twist = self.control_sequence.command_at(offset);
        if self.settings.shift_control_sequence {
            self.control_sequence.shift();
        }

        Ok(TwistStamped::new(
            twist,
            robot_pose.stamp,
            self.base_frame.clone(),
        ))
    }

    /// Run `iteration_count` refinements; returns the final fail flag.
    fn optimize(
        &mut self,
        pose: Pose2,
        speed: Twist2,
        path: &Path,
        goal_checker: &dyn GoalChecker,
        costmap: &dyn Costmap,
    ) -> bool {
        let mut fail = false;
        for _ in 0..self.settings.iteration_count {
            fail = false;
            self.costs.fill(0.0);

            self.generate_noised_controls();
            self.apply_control_constraints();
            self.motion_model.roll_out_velocities(&mut self.state, speed);
            integrate(&mut self.trajectories, &self.state, pose);

            let mut data = CriticData::new(
                &self.state,
                &self.trajectories,
                path,
                pose,
                &mut self.costs,
                &mut fail,
                goal_checker,
                costmap,
                self.settings.model_dt,
            );
            self.critics.evaluate(&mut data);

            self.update_control_sequence();
        }
        fail
    }

    /// Write `nominal + noise` into the control planes.
    fn generate_noised_controls(&mut self) {
        self.noise.generate();
        let holonomic = self.motion_model.is_holonomic();
        for t in 0..self.state.time_steps() {
            for b in 0..self.state.batch_size() {
                self.state.cvx[(b, t)] = self.control_sequence.vx[t] + self.noise.vx()[(b, t)];
                self.state.cwz[(b, t)] = self.control_sequence.wz[t] + self.noise.wz()[(b, t)];
                if holonomic {
                    self.state.cvy[(b, t)] = self.control_sequence.vy[t] + self.noise.vy()[(b, t)];
                }
            }
        }
    }

    /// Clip every control axis to the working constraints, then let the
    /// motion model enforce what the box cannot express. The model pass runs
    /// last so its guarantees survive to scoring.
    fn apply_control_constraints(&mut self) {
        let c = self.settings.constraints;
        for v in self.state.cvx.iter_mut() {
            *v = v.clamp(-c.vx, c.vx);
        }
        for v in self.state.cwz.iter_mut() {
            *v = v.clamp(-c.wz, c.wz);
        }
        if self.motion_model.is_holonomic() {
            for v in self.state.cvy.iter_mut() {
                *v = v.clamp(-c.vy, c.vy);
            }
        }
        self.motion_model.apply_constraints(&mut self.state);
    }

    /// Softmin update: the nominal becomes the weight-averaged control batch.
    fn update_control_sequence(&mut self) {
        let weights = softmin_weights(&self.costs, self.settings.temperature);
        let holonomic = self.motion_model.is_holonomic();
        for t in 0..self.state.time_steps() {
            let mut vx = 0.0;
            let mut vy = 0.0;
            let mut wz = 0.0;
            for b in 0..self.state.batch_size() {
                let w = weights[b];
                vx += w * self.state.cvx[(b, t)];
                wz += w * self.state.cwz[(b, t)];
                if holonomic {
                    vy += w * self.state.cvy[(b, t)];
                }
            }
            self.control_sequence.vx[t] = vx;
            self.control_sequence.wz[t] = wz;
            if holonomic {
                self.control_sequence.vy[t] = vy;
            }
        }
    }

    /// Zero every buffer, reset the nominal, and re-arm the noise stream.
    pub fn reset(&mut self) {
        self.state.reset(
            self.settings.batch_size,
            self.settings.time_steps,
            self.settings.model_dt,
        );
        self.trajectories
            .reset(self.settings.batch_size, self.settings.time_steps);
        self.control_sequence.reset(self.settings.time_steps);
        if self.costs.len() == self.settings.batch_size {
            self.costs.fill(0.0);
        } else {
            self.costs = DVector::zeros(self.settings.batch_size);
        }
        self.noise
            .reset(&self.settings, self.motion_model.is_holonomic());
        info!("optimizer reset");
    }

    /// Apply a speed-limit signal to the working constraints.
    pub fn set_speed_limit(&mut self, limit: SpeedLimit) {
        self.settings.apply_speed_limit(limit);
        debug!(
            "speed limit {:?}: constraints now vx={}, vy={}, wz={}",
            limit,
            self.settings.constraints.vx,
            self.settings.constraints.vy,
            self.settings.constraints.wz
        );
    }

    /// Dynamic parameter re-binding: re-read the whole surface, rebuild the
    /// motion model only when its name changed, rebuild the critics, and
    /// reset every buffer.
    pub fn update_parameters(&mut self, config: &ControllerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let shift = derive_shift(self.controller_frequency, config.model_dt)?;
        let motion_model = if config.motion_model != self.motion_model.name() {
            let model = MotionModel::from_name(&config.motion_model, config.min_turning_radius)?;
            info!(
                "motion model changed: {} -> {}",
                self.motion_model.name(),
                model.name()
            );
            model
        } else if matches!(self.motion_model, MotionModel::Ackermann { .. }) {
            MotionModel::Ackermann {
                min_turning_radius: config.min_turning_radius,
            }
        } else {
            self.motion_model
        };
        let critics = CriticManager::from_config(config)?;

        let mut settings = config.to_settings();
        settings.shift_control_sequence = shift;
        let layout = motion_model.layout();

        self.settings = settings;
        self.motion_model = motion_model;
        self.critics = critics;
        self.base_frame = config.base_frame.clone();
        self.state = StateBatch::new(
            self.settings.batch_size,
            self.settings.time_steps,
            self.settings.model_dt,
            layout,
        );
        self.trajectories = Trajectories::new(self.settings.batch_size, self.settings.time_steps);
        self.control_sequence = ControlSequence::new(self.settings.time_steps, layout);
        self.costs = DVector::zeros(self.settings.batch_size);
        self.noise
            .reset(&self.settings, self.motion_model.is_holonomic());
        self.retry_counter = 0;
        info!("parameters rebound; optimizer reset");
        Ok(())
    }

    /// Single-sample rollout of the current nominal control from the last
    /// prepared pose and twist, for visualization.
    pub fn optimized_trajectory(&self) -> Vec<Pose2> {
        let layout = self.motion_model.layout();
        let time_steps = self.settings.time_steps;
        let mut state = StateBatch::new(1, time_steps, self.settings.model_dt, layout);
        for t in 0..time_steps {
            state.cvx[(0, t)] = self.control_sequence.vx[t];
            state.cwz[(0, t)] = self.control_sequence.wz[t];
            if layout.is_holonomic() {
                state.cvy[(0, t)] = self.control_sequence.vy[t];
            }
        }
        self.motion_model
            .roll_out_velocities(&mut state, self.state.speed);
        let mut trajectories = Trajectories::new(1, time_steps);
        integrate(&mut trajectories, &state, self.state.pose);
        trajectories.sample(0)
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    pub fn control_sequence(&self) -> &ControlSequence {
        &self.control_sequence
    }

    /// The last scored trajectory batch, for visualization.
    pub fn trajectories(&self) -> &Trajectories {
        &self.trajectories
    }

    pub const fn motion_model(&self) -> &MotionModel {
        &self.motion_model
    }
}
