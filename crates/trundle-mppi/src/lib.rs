//! Sampling-based MPPI local trajectory controller.
//!
//! This crate implements a Model Predictive Path Integral controller for
//! ground mobile robots. Each control tick:
//!
//! 1. **Noise Generator** — perturbs the nominal control sequence into a
//!    batch of candidate sequences
//! 2. **Motion Model** — clips the candidates to the platform's kinematics
//!    and rolls measured velocities through the horizon
//! 3. **Trajectory Integrator** — simulates every candidate into a
//!    world-frame trajectory
//! 4. **Critics** — score each trajectory against the reference path, the
//!    costmap, and motion-quality terms
//! 5. **Softmin Update** — folds the scores back into an improved nominal
//!
//! # Architecture
//!
//! There is no gradient and no QP: the optimizer approximates the control
//! posterior by weighting forward simulations with `exp(-cost/temperature)`.
//! All batch buffers are preallocated `nalgebra` planes owned by the
//! [`Optimizer`]; a tick allocates nothing on the hot path and runs to
//! completion on the caller's thread.
//!
//! Obstacle avoidance is statistical: critics are soft costs, and the
//! fallback policy (reset, fresh noise, bounded retries) is the only
//! recovery mechanism when every sample is rejected.

pub mod config;
pub mod control;
pub mod critics;
pub mod integrator;
pub mod motion;
pub mod noise;
pub mod optimizer;
pub mod settings;
pub mod state;
pub mod trajectories;

pub use config::ControllerConfig;
pub use control::ControlSequence;
pub use critics::{Critic, CriticData, CriticManager};
pub use integrator::integrate;
pub use motion::MotionModel;
pub use noise::NoiseGenerator;
pub use optimizer::{Optimizer, softmin_weights};
pub use settings::{Constraints, OptimizerSettings, SamplingStd, SpeedLimit};
pub use state::{StateBatch, StateLayout};
pub use trajectories::Trajectories;
