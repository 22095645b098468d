//! Gaussian exploration noise for the control batch.
//!
//! Produces independent zero-mean samples per control axis with the
//! configured standard deviations. The stream is deterministic: it is seeded
//! from the settings seed mixed with a reset epoch, so two optimizers built
//! from the same configuration sample identical noise, while every reset
//! (including fallback recovery) moves to a fresh stream.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::settings::OptimizerSettings;

#[derive(Debug)]
pub struct NoiseGenerator {
    rng: ChaCha8Rng,
    seed: u64,
    epoch: u64,
    vx: DMatrix<f64>,
    vy: DMatrix<f64>,
    wz: DMatrix<f64>,
    std_vx: f64,
    std_vy: f64,
    std_wz: f64,
    holonomic: bool,
}

impl NoiseGenerator {
    pub fn new(settings: &OptimizerSettings, holonomic: bool) -> Self {
        let mut generator = Self {
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            seed: settings.seed,
            epoch: 0,
            vx: DMatrix::zeros(settings.batch_size, settings.time_steps),
            vy: DMatrix::zeros(settings.batch_size, settings.time_steps),
            wz: DMatrix::zeros(settings.batch_size, settings.time_steps),
            std_vx: settings.sampling_std.vx,
            std_vy: settings.sampling_std.vy,
            std_wz: settings.sampling_std.wz,
            holonomic,
        };
        generator.reset(settings, holonomic);
        generator
    }

    /// Re-arm the generator: reallocate on shape change, pick up the current
    /// standard deviations, and advance to the next seed epoch.
    pub fn reset(&mut self, settings: &OptimizerSettings, holonomic: bool) {
        let (batch_size, time_steps) = (settings.batch_size, settings.time_steps);
        if self.vx.shape() != (batch_size, time_steps) {
            self.vx = DMatrix::zeros(batch_size, time_steps);
            self.vy = DMatrix::zeros(batch_size, time_steps);
            self.wz = DMatrix::zeros(batch_size, time_steps);
        } else {
            self.vx.fill(0.0);
            self.vy.fill(0.0);
            self.wz.fill(0.0);
        }
        self.std_vx = settings.sampling_std.vx;
        self.std_vy = settings.sampling_std.vy;
        self.std_wz = settings.sampling_std.wz;
        self.holonomic = holonomic;
        self.seed = settings.seed;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(self.epoch));
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Fill the noise planes with fresh samples. The planes are stable until
    /// the next `generate` or `reset`.
    pub fn generate(&mut self) {
        fill_gaussian(&mut self.vx, self.std_vx, &mut self.rng);
        fill_gaussian(&mut self.wz, self.std_wz, &mut self.rng);
        if self.holonomic {
            fill_gaussian(&mut self.vy, self.std_vy, &mut self.rng);
        }
    }

    pub fn vx(&self) -> &DMatrix<f64> {
        &self.vx
    }

    pub fn vy(&self) -> &DMatrix<f64> {
        &self.vy
    }

    pub fn wz(&self) -> &DMatrix<f64> {
        &self.wz
    }
}

fn fill_gaussian(plane: &mut DMatrix<f64>, std: f64, rng: &mut ChaCha8Rng) {
    if std == 0.0 {
        plane.fill(0.0);
        return;
    }
    let dist = Normal::new(0.0, std).expect("validated in configuration");
    for value in plane.iter_mut() {
        *value = dist.sample(rng);
    }
}
