//! Analytic vacuum propagator: osculating Kepler elements advanced in mean
//! anomaly, drift-free for arbitrary timesteps.
//!
//! Degenerate geometries (radial trajectories, escape energy, near-parabolic
//! eccentricity, non-finite intermediates) are rejected with [`KeplerError`]
//! so the caller can fall back to the Euler integrator for the tick.

use nalgebra::{Rotation3, Vector3};
use thiserror::Error;

use crate::utils::constants::{MU_EARTH, R_EARTH};
use crate::vehicles::state::Geodetic;

/// Specific angular momentum below which the trajectory is treated as radial
/// [m²/s].
const MIN_ANGULAR_MOMENTUM: f64 = 1e3;
/// Eccentricity above which the Kepler solve is numerically untrustworthy.
const MAX_ECCENTRICITY: f64 = 0.99;
/// Newton-Raphson iteration cap and convergence tolerance for Kepler's
/// equation.
const KEPLER_MAX_ITERATIONS: usize = 20;
const KEPLER_TOLERANCE: f64 = 1e-12;
/// Threshold for near-zero vector norms in frame construction.
const EPS: f64 = 1e-11;

/// Why the analytic propagator declined a state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeplerError {
    #[error("angular momentum too small for an orbit")]
    ZeroAngularMomentum,
    #[error("non-negative specific energy (parabolic or escape trajectory)")]
    Unbound,
    #[error("eccentricity too close to parabolic")]
    NearParabolic,
    #[error("non-finite intermediate value")]
    NonFinite,
}

/// Classical osculating orbital elements.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalElements {
    /// Semi-major axis [m]
    pub semi_major_axis: f64,
    /// Eccentricity
    pub eccentricity: f64,
    /// Inclination [rad]
    pub inclination: f64,
    /// Right ascension of the ascending node [rad]
    pub raan: f64,
    /// Argument of periapsis [rad]
    pub arg_periapsis: f64,
    /// True anomaly [rad]
    pub true_anomaly: f64,
}

/// Velocity-frame kinematics recovered after propagation.
#[derive(Debug, Clone, Copy)]
pub struct VacuumState {
    pub position: Geodetic,
    pub speed: f64,
    pub heading: f64,
    pub gamma: f64,
}

/// Cartesian state in a non-rotating Earth-centered frame.
#[derive(Debug, Clone, Copy)]
struct CartesianState {
    r: Vector3<f64>,
    v: Vector3<f64>,
}

/// ENU basis vectors at a geodetic location.
fn enu_basis(latitude: f64, longitude: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();
    let east = Vector3::new(-sin_lon, cos_lon, 0.0);
    let north = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let up = Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);
    (east, north, up)
}

fn cartesian_from_geodetic(
    position: &Geodetic,
    speed: f64,
    heading: f64,
    gamma: f64,
) -> CartesianState {
    let radius = R_EARTH + position.altitude;
    let (east, north, up) = enu_basis(position.latitude, position.longitude);
    let r = up * radius;
    let (sin_psi, cos_psi) = heading.sin_cos();
    let (sin_gamma, cos_gamma) = gamma.sin_cos();
    let v = (east * (cos_gamma * sin_psi) + north * (cos_gamma * cos_psi) + up * sin_gamma) * speed;
    CartesianState { r, v }
}

fn geodetic_from_cartesian(state: &CartesianState) -> Result<VacuumState, KeplerError> {
    let radius = state.r.norm();
    if radius <= 0.0 || !radius.is_finite() {
        return Err(KeplerError::NonFinite);
    }
    let latitude = (state.r.z / radius).clamp(-1.0, 1.0).asin();
    let longitude = state.r.y.atan2(state.r.x);

    let (east, north, up) = enu_basis(latitude, longitude);
    let v_east = state.v.dot(&east);
    let v_north = state.v.dot(&north);
    let v_up = state.v.dot(&up);
    let speed = state.v.norm();

    let gamma = if speed > 0.0 {
        (v_up / speed).clamp(-1.0, 1.0).asin()
    } else {
        0.0
    };
    // atan2(0, 0) yields 0, which is an acceptable heading at the poles.
    let heading = v_east.atan2(v_north);

    let out = VacuumState {
        position: Geodetic {
            latitude,
            longitude,
            altitude: radius - R_EARTH,
        },
        speed,
        heading,
        gamma,
    };
    if !(out.position.latitude.is_finite()
        && out.position.longitude.is_finite()
        && out.position.altitude.is_finite()
        && out.speed.is_finite()
        && out.heading.is_finite()
        && out.gamma.is_finite())
    {
        return Err(KeplerError::NonFinite);
    }
    Ok(out)
}

fn elements_from_cartesian(state: &CartesianState) -> Result<OrbitalElements, KeplerError> {
    let r_mag = state.r.norm();
    let v_mag = state.v.norm();

    let h_vec = state.r.cross(&state.v);
    let h = h_vec.norm();
    if !h.is_finite() {
        return Err(KeplerError::NonFinite);
    }
    if h < MIN_ANGULAR_MOMENTUM {
        return Err(KeplerError::ZeroAngularMomentum);
    }

    let energy = v_mag * v_mag / 2.0 - MU_EARTH / r_mag;
    if energy >= 0.0 {
        return Err(KeplerError::Unbound);
    }
    let semi_major_axis = -MU_EARTH / (2.0 * energy);

    let e_vec = (state.r * (v_mag * v_mag - MU_EARTH / r_mag) - state.v * state.r.dot(&state.v))
        / MU_EARTH;
    let eccentricity = e_vec.norm();
    if !eccentricity.is_finite() {
        return Err(KeplerError::NonFinite);
    }
    if eccentricity >= MAX_ECCENTRICITY {
        return Err(KeplerError::NearParabolic);
    }

    let inclination = (h_vec.z / h).clamp(-1.0, 1.0).acos();

    let node = Vector3::z().cross(&h_vec);
    let node_mag = node.norm();

    let raan = if node_mag > EPS {
        node.y.atan2(node.x)
    } else {
        0.0
    };

    let arg_periapsis = if eccentricity > EPS {
        if node_mag > EPS {
            let mut omega = (node.dot(&e_vec) / (node_mag * eccentricity))
                .clamp(-1.0, 1.0)
                .acos();
            if e_vec.z < 0.0 {
                omega = -omega;
            }
            omega
        } else {
            // Equatorial: measure from the x axis, retrograde flips the sign.
            let mut omega = e_vec.y.atan2(e_vec.x);
            if h_vec.z < 0.0 {
                omega = -omega;
            }
            omega
        }
    } else {
        0.0
    };

    let true_anomaly = if eccentricity > EPS {
        let mut nu = (e_vec.dot(&state.r) / (eccentricity * r_mag))
            .clamp(-1.0, 1.0)
            .acos();
        if state.r.dot(&state.v) < 0.0 {
            nu = -nu;
        }
        nu
    } else if node_mag > EPS {
        // Circular inclined: argument of latitude.
        let mut u = (node.dot(&state.r) / (node_mag * r_mag)).clamp(-1.0, 1.0).acos();
        if state.r.z < 0.0 {
            u = -u;
        }
        u
    } else {
        // Circular equatorial: true longitude.
        let mut l = state.r.y.atan2(state.r.x);
        if h_vec.z < 0.0 {
            l = -l;
        }
        l
    };

    let elements = OrbitalElements {
        semi_major_axis,
        eccentricity,
        inclination,
        raan,
        arg_periapsis,
        true_anomaly,
    };
    if !(elements.semi_major_axis.is_finite()
        && elements.inclination.is_finite()
        && elements.raan.is_finite()
        && elements.arg_periapsis.is_finite()
        && elements.true_anomaly.is_finite())
    {
        return Err(KeplerError::NonFinite);
    }
    Ok(elements)
}

fn eccentric_from_true(nu: f64, e: f64) -> f64 {
    ((1.0 - e * e).sqrt() * nu.sin()).atan2(e + nu.cos())
}

fn true_from_eccentric(ecc_anomaly: f64, e: f64) -> f64 {
    ((1.0 - e * e).sqrt() * ecc_anomaly.sin()).atan2(ecc_anomaly.cos() - e)
}

/// Newton-Raphson solve of Kepler's equation M = E - e·sin E.
fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc_anomaly = if e < 0.8 { mean_anomaly } else { std::f64::consts::PI };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly;
        let f_prime = 1.0 - e * ecc_anomaly.cos();
        let delta = f / f_prime;
        ecc_anomaly -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ecc_anomaly
}

fn cartesian_from_elements(elements: &OrbitalElements) -> CartesianState {
    let a = elements.semi_major_axis;
    let e = elements.eccentricity;
    let nu = elements.true_anomaly;

    let p = a * (1.0 - e * e);
    let r_mag = p / (1.0 + e * nu.cos());

    let r_pf = Vector3::new(r_mag * nu.cos(), r_mag * nu.sin(), 0.0);
    let v_factor = (MU_EARTH / p).sqrt();
    let v_pf = Vector3::new(-v_factor * nu.sin(), v_factor * (e + nu.cos()), 0.0);

    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), elements.raan)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), elements.inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), elements.arg_periapsis);

    CartesianState {
        r: rotation * r_pf,
        v: rotation * v_pf,
    }
}

/// Osculating elements for a geodetic state; the public inspection hook used
/// by analytics and tests.
pub fn osculating_elements(
    position: &Geodetic,
    speed: f64,
    heading: f64,
    gamma: f64,
) -> Result<OrbitalElements, KeplerError> {
    elements_from_cartesian(&cartesian_from_geodetic(position, speed, heading, gamma))
}

/// Advances a force-free state by `dt` along its osculating Kepler orbit.
///
/// Energy and angular momentum are conserved to round-off for any `dt`; the
/// caller is responsible for confirming the state is actually force-free.
pub fn propagate(
    position: &Geodetic,
    speed: f64,
    heading: f64,
    gamma: f64,
    dt: f64,
) -> Result<VacuumState, KeplerError> {
    let cartesian = cartesian_from_geodetic(position, speed, heading, gamma);
    let elements = elements_from_cartesian(&cartesian)?;

    let e = elements.eccentricity;
    let ecc_anomaly = eccentric_from_true(elements.true_anomaly, e);
    let mean_anomaly = ecc_anomaly - e * ecc_anomaly.sin();
    let mean_motion = (MU_EARTH / elements.semi_major_axis.powi(3)).sqrt();

    let advanced_mean = mean_anomaly + mean_motion * dt;
    let advanced_ecc = solve_kepler(advanced_mean, e);
    let advanced_true = true_from_eccentric(advanced_ecc, e);

    if !advanced_true.is_finite() {
        return Err(KeplerError::NonFinite);
    }

    let advanced = OrbitalElements {
        true_anomaly: advanced_true,
        ..elements
    };
    geodetic_from_cartesian(&cartesian_from_elements(&advanced))
}
