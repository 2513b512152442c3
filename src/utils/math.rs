//! Small angle/unit helpers used throughout the force model and integrators.

use std::f64::consts::PI;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Wraps an angle to (-π, π].
pub fn wrap_pi(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut a = angle % two_pi;
    if a > PI {
        a -= two_pi;
    } else if a <= -PI {
        a += two_pi;
    }
    a
}

/// Wraps an angle to [0, 2π).
pub fn wrap_two_pi(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let a = angle % two_pi;
    if a < 0.0 {
        a + two_pi
    } else {
        a
    }
}

/// Linear interpolation between `a` and `b` with `t` clamped to [0, 1].
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}
