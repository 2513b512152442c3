//! Force model: gravity, blended aerodynamics, and mode-dependent propulsion.

use serde::{Deserialize, Serialize};

use crate::atmosphere::AtmosphereModel;
use crate::utils::constants::{
    MU_EARTH, Q_FULL_AERO, Q_VACUUM, R_EARTH, SEA_LEVEL_DENSITY,
};
use crate::utils::math::lerp;
use crate::vehicles::config::VehicleConfig;
use crate::vehicles::state::{PropulsionMode, VehicleState};

/// Throttle position of the military/afterburner breakpoint.
const AFTERBURNER_BREAK: f64 = 0.85;
/// Exponent of the air-breathing density lapse.
const THRUST_LAPSE_EXPONENT: f64 = 0.7;
/// Quadratic wave-drag coefficient applied above the drag-divergence Mach.
const WAVE_DRAG_FACTOR: f64 = 0.1;
/// Drag-divergence Mach number.
const MACH_DRAG_RISE: f64 = 0.85;
/// Hypersonic coefficient blend window [Mach].
const MACH_HYPERSONIC_START: f64 = 5.0;
const MACH_HYPERSONIC_FULL: f64 = 8.0;

/// Atmospheric conditions sampled once per tick at the current state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AeroEnvironment {
    pub density: f64,
    pub speed_of_sound: f64,
    pub mach: f64,
    pub dynamic_pressure: f64,
    /// Smooth 0..1 weighting of aerodynamic forces (1 = full atmosphere,
    /// 0 = vacuum).
    pub blend: f64,
}

impl AeroEnvironment {
    pub fn sample<A: AtmosphereModel>(atmosphere: &A, altitude: f64, speed: f64) -> Self {
        let density = atmosphere.density(altitude);
        let speed_of_sound = atmosphere.speed_of_sound(altitude);
        let dynamic_pressure = atmosphere.dynamic_pressure(altitude, speed);
        Self {
            density,
            speed_of_sound,
            mach: if speed_of_sound > 0.0 {
                speed / speed_of_sound
            } else {
                0.0
            },
            dynamic_pressure,
            blend: aero_blend(dynamic_pressure),
        }
    }
}

/// Inverse-square gravity, valid from ground roll to orbit [m/s²].
pub fn gravity(altitude: f64) -> f64 {
    let r = R_EARTH + altitude;
    MU_EARTH / (r * r)
}

/// Aero blend factor: 1.0 above q = 100 Pa, 0.0 below q = 1 Pa, log-linear in
/// between. Downstream envelope displays are defined relative to this exact
/// shape, so it must not be reshaped.
pub fn aero_blend(dynamic_pressure: f64) -> f64 {
    if dynamic_pressure >= Q_FULL_AERO {
        1.0
    } else if dynamic_pressure <= Q_VACUUM {
        0.0
    } else {
        (dynamic_pressure / Q_VACUUM).ln() / (Q_FULL_AERO / Q_VACUUM).ln()
    }
}

/// Aerodynamic forces for the current state, already scaled by the blend
/// factor.
#[derive(Debug, Clone, Copy)]
pub struct AeroForces {
    /// Lift [N]
    pub lift: f64,
    /// Drag [N]
    pub drag: f64,
    /// Lift coefficient after clamping
    pub cl: f64,
    /// Total drag coefficient
    pub cd: f64,
}

pub fn aero_forces(
    state: &VehicleState,
    config: &VehicleConfig,
    env: &AeroEnvironment,
) -> AeroForces {
    let systems = &state.systems;

    let mut cd0 = config.aero.cd0_clean;
    if systems.gear_down {
        cd0 += config.aero.cd0_gear;
    }
    if systems.flaps_down {
        cd0 += config.aero.cd0_flaps;
    }
    if systems.speed_brake {
        cd0 += config.aero.cd0_speedbrake;
    }

    let mut cl_alpha = config.aero.cl_alpha;
    if let Some(hyper) = config.aero.hypersonic {
        let t = (env.mach - MACH_HYPERSONIC_START)
            / (MACH_HYPERSONIC_FULL - MACH_HYPERSONIC_START);
        cl_alpha = lerp(cl_alpha, hyper.cl_alpha, t);
        cd0 = lerp(cd0, hyper.cd0, t);
    }

    let cl_limit = if systems.flaps_down {
        config.aero.cl_max_flaps
    } else {
        config.aero.cl_max
    };
    let cl = (cl_alpha * state.alpha).clamp(-cl_limit, cl_limit);

    let mut cd = cd0 + cl * cl / (std::f64::consts::PI * config.aero.oswald * config.wing.aspect_ratio);
    if env.mach > MACH_DRAG_RISE {
        let excess = env.mach - MACH_DRAG_RISE;
        cd += WAVE_DRAG_FACTOR * excess * excess;
    }

    let qs = env.dynamic_pressure * config.wing.area * env.blend;
    AeroForces {
        lift: qs * cl,
        drag: qs * cd,
        cl,
        cd,
    }
}

/// Thrust magnitude and fuel flow for the current state.
#[derive(Debug, Clone, Copy)]
pub struct ThrustOutput {
    /// Thrust magnitude [N]
    pub force: f64,
    /// Fuel flow [kg/s]; zero for modes without modeled burn
    pub fuel_flow: f64,
}

pub fn thrust_output(
    state: &VehicleState,
    config: &VehicleConfig,
    env: &AeroEnvironment,
) -> ThrustOutput {
    if !state.systems.engine_on || (state.fuel <= 0.0 && !state.systems.infinite_fuel) {
        return ThrustOutput {
            force: 0.0,
            fuel_flow: 0.0,
        };
    }

    let throttle = state.throttle.clamp(0.0, 1.0);
    match state.propulsion_mode {
        PropulsionMode::Air => {
            let lapse = (env.density / SEA_LEVEL_DENSITY)
                .max(0.0)
                .powf(THRUST_LAPSE_EXPONENT);
            let (thrust_sl, sfc) = if throttle <= AFTERBURNER_BREAK {
                let fraction = throttle / AFTERBURNER_BREAK;
                (
                    config.propulsion.thrust_military * fraction,
                    config.propulsion.sfc_military,
                )
            } else {
                let fraction = (throttle - AFTERBURNER_BREAK) / (1.0 - AFTERBURNER_BREAK);
                (
                    lerp(
                        config.propulsion.thrust_military,
                        config.propulsion.thrust_afterburner,
                        fraction,
                    ),
                    lerp(
                        config.propulsion.sfc_military,
                        config.propulsion.sfc_afterburner,
                        fraction,
                    ),
                )
            };
            let force = thrust_sl * lapse;
            ThrustOutput {
                force,
                fuel_flow: sfc * force,
            }
        }
        PropulsionMode::Hypersonic => ThrustOutput {
            force: config.propulsion.thrust_hypersonic.unwrap_or(0.0) * throttle,
            fuel_flow: 0.0,
        },
        PropulsionMode::Rocket => ThrustOutput {
            force: config.propulsion.thrust_rocket.unwrap_or(0.0) * throttle,
            fuel_flow: 0.0,
        },
        PropulsionMode::Taxi => ThrustOutput {
            force: config.propulsion.thrust_taxi.unwrap_or(0.0) * throttle,
            fuel_flow: 0.0,
        },
    }
}

/// Thrust decomposed along the velocity frame via angle of attack and the
/// cosmetic yaw offset.
#[derive(Debug, Clone, Copy)]
pub struct ThrustComponents {
    /// Along the velocity vector [N]
    pub prograde: f64,
    /// Normal to the velocity vector, in the lift plane [N]
    pub normal: f64,
    /// Lateral [N]
    pub lateral: f64,
}

pub fn decompose_thrust(force: f64, alpha: f64, yaw_offset: f64) -> ThrustComponents {
    ThrustComponents {
        prograde: force * alpha.cos() * yaw_offset.cos(),
        normal: force * alpha.sin(),
        lateral: force * alpha.cos() * yaw_offset.sin(),
    }
}

/// 1-g stall speed for the current mass and density [m/s].
pub fn stall_speed(state: &VehicleState, config: &VehicleConfig, density: f64) -> f64 {
    if density <= 0.0 {
        return f64::INFINITY;
    }
    let cl_limit = if state.systems.flaps_down {
        config.aero.cl_max_flaps
    } else {
        config.aero.cl_max
    };
    let weight = state.weight(config);
    (2.0 * weight / (density * config.wing.area * cl_limit)).sqrt()
}
