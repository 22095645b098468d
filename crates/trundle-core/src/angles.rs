//! Angle arithmetic on the unit circle.
//!
//! All functions take and return radians. Normalization maps onto the
//! half-open interval `(-pi, pi]`.

use std::f64::consts::PI;

/// Normalize an angle to `(-pi, pi]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let theta = (angle + PI) % (2.0 * PI);
    if theta <= 0.0 { theta + PI } else { theta - PI }
}

/// Shortest signed angular difference from `from` to `to`, in `[-pi, pi]`.
///
/// Adding the result to `from` yields an angle equivalent to `to`.
pub fn shortest_angular_distance(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}
