//! Control mapper: normalized pilot/AI directives to attitude-rate commands,
//! with envelope protection in atmosphere and free rotation in vacuum.

use serde::{Deserialize, Serialize};

use crate::systems::forces::{gravity, AeroEnvironment};
use crate::utils::math::wrap_pi;
use crate::vehicles::config::VehicleConfig;
use crate::vehicles::state::VehicleState;

use std::f64::consts::PI;

/// Throttle slew rate for up/down commands [1/s].
const THROTTLE_RATE: f64 = 0.5;
/// Sideslip command rate [rad/s] and bound [rad].
const BETA_RATE: f64 = 10.0 * PI / 180.0;
const BETA_LIMIT: f64 = 5.0 * PI / 180.0;
/// Sideslip decay rate toward zero absent input [1/s].
const BETA_DAMPING: f64 = 2.0;
/// Reaction-control yaw rate in vacuum [rad/s].
const RCS_YAW_RATE: f64 = 30.0 * PI / 180.0;
/// Nose-offset realignment rate at full aero blend [1/s].
const YAW_REALIGN_RATE: f64 = 1.5;
/// Lower angle-of-attack bound in atmosphere [rad].
const MIN_ALPHA: f64 = -10.0 * PI / 180.0;
/// Blend value above which the atmospheric clamp regime applies.
const ATMOSPHERIC_BLEND: f64 = 0.5;

/// Normalized control directives for one tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ControlInputs {
    /// Pitch command, roughly [-1, 1]
    pub pitch: f64,
    /// Roll command, roughly [-1, 1]
    pub roll: f64,
    /// Yaw command, roughly [-1, 1]
    pub yaw: f64,
    /// Discrete throttle increase
    pub throttle_up: bool,
    /// Discrete throttle decrease
    pub throttle_down: bool,
    /// Direct throttle setting; overrides up/down when present
    pub throttle_set: Option<f64>,
}

/// Applies one tick of control input to the attitude/throttle state.
pub fn apply_controls(
    state: &mut VehicleState,
    controls: &ControlInputs,
    config: &VehicleConfig,
    env: &AeroEnvironment,
    dt: f64,
) {
    apply_throttle(state, controls, dt);

    // Roll persists like a trim setting in every regime and is never clamped;
    // sustained banked turns and vacuum tumbling are both valid.
    let roll_cmd = controls.roll.clamp(-1.0, 1.0);
    state.roll = wrap_pi(state.roll + roll_cmd * config.limits.max_roll_rate * dt);

    apply_pitch(state, controls, config, env, dt);
    apply_yaw(state, controls, env, dt);
}

fn apply_throttle(state: &mut VehicleState, controls: &ControlInputs, dt: f64) {
    if let Some(setting) = controls.throttle_set {
        state.throttle = setting.clamp(0.0, 1.0);
        return;
    }
    if controls.throttle_up {
        state.throttle += THROTTLE_RATE * dt;
    }
    if controls.throttle_down {
        state.throttle -= THROTTLE_RATE * dt;
    }
    state.throttle = state.throttle.clamp(0.0, 1.0);
}

fn apply_pitch(
    state: &mut VehicleState,
    controls: &ControlInputs,
    config: &VehicleConfig,
    env: &AeroEnvironment,
    dt: f64,
) {
    let pitch_cmd = controls.pitch.clamp(-1.0, 1.0);
    let alpha = state.alpha + pitch_cmd * config.limits.max_pitch_rate * dt;

    if env.blend >= ATMOSPHERIC_BLEND {
        state.alpha = alpha.clamp(MIN_ALPHA, config.limits.max_alpha);
        let g_cap = alpha_for_load_limit(state, config, env);
        state.alpha = state.alpha.clamp(-g_cap, g_cap.min(config.limits.max_alpha));
    } else {
        state.alpha = wrap_pi(alpha);
    }
}

/// Angle of attack producing exactly the structural G limit at the current
/// dynamic pressure, from inverting the lift equation. Uses the zero-sideslip
/// lift curve even when sideslip is non-zero; a documented approximation.
fn alpha_for_load_limit(
    state: &VehicleState,
    config: &VehicleConfig,
    env: &AeroEnvironment,
) -> f64 {
    let qs = env.dynamic_pressure * config.wing.area * env.blend * config.aero.cl_alpha;
    if qs <= 0.0 {
        return f64::INFINITY;
    }
    let max_lift = config.limits.max_g * state.mass(config) * gravity(state.position.altitude);
    max_lift / qs
}

fn apply_yaw(state: &mut VehicleState, controls: &ControlInputs, env: &AeroEnvironment, dt: f64) {
    let yaw_cmd = controls.yaw.clamp(-1.0, 1.0);

    if env.blend >= ATMOSPHERIC_BLEND {
        // Damped sideslip: decays toward zero, bounded, commanded by input.
        state.beta += yaw_cmd * BETA_RATE * dt;
        state.beta -= state.beta * (BETA_DAMPING * dt).min(1.0);
        state.beta = state.beta.clamp(-BETA_LIMIT, BETA_LIMIT);
    } else {
        // RCS semantics: rotate the cosmetic nose offset without touching the
        // velocity vector.
        state.yaw_offset = wrap_pi(state.yaw_offset + yaw_cmd * RCS_YAW_RATE * dt);
        state.beta -= state.beta * (BETA_DAMPING * dt).min(1.0);
    }

    // Aerosurfaces re-align the nose with the velocity vector as the
    // atmosphere thickens.
    let realign = (YAW_REALIGN_RATE * env.blend * dt).min(1.0);
    state.yaw_offset -= state.yaw_offset * realign;
}
