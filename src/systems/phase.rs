//! Phase state machine: transitions between ground handling and free flight.

use log::debug;

use crate::utils::math::deg_to_rad;
use crate::vehicles::config::VehicleConfig;
use crate::vehicles::state::{Phase, VehicleState};

/// Speed above which a parked vehicle starts taxiing [m/s].
const TAXI_SPEED: f64 = 1.0;
/// Speed below which a taxiing vehicle parks [m/s].
const STOP_SPEED: f64 = 0.5;
/// Throttle below which a stop counts as parking.
const PARK_THROTTLE: f64 = 0.1;
/// Speed that begins the takeoff roll [m/s].
const TAKEOFF_ROLL_SPEED: f64 = 30.0;
/// Aborted-takeoff thresholds.
const ABORT_SPEED: f64 = 20.0;
const ABORT_THROTTLE: f64 = 0.3;
/// Survivable touchdown limits.
const MAX_TOUCHDOWN_SINK: f64 = 5.0;
const MAX_TOUCHDOWN_SPEED: f64 = 120.0;

/// Post-integration measurements the transition table needs.
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext {
    /// Aerodynamic lift this tick [N]
    pub lift: f64,
    /// Current weight [N]
    pub weight: f64,
    /// Descent rate, positive downward [m/s]
    pub sink_rate: f64,
    /// Whether altitude reached the ground this tick
    pub on_surface: bool,
}

/// Evaluates the phase transition table for the freshly integrated state.
pub fn update_phase(state: &mut VehicleState, config: &VehicleConfig, ctx: &PhaseContext) {
    let next = match state.phase {
        Phase::Parked => {
            if state.systems.engine_on && state.speed > TAXI_SPEED {
                Some(Phase::Taxi)
            } else {
                None
            }
        }
        Phase::Taxi => {
            if state.speed > TAKEOFF_ROLL_SPEED {
                Some(Phase::Takeoff)
            } else if state.speed < STOP_SPEED && state.throttle < PARK_THROTTLE {
                Some(Phase::Parked)
            } else {
                None
            }
        }
        Phase::Takeoff => {
            if ctx.lift >= ctx.weight {
                Some(Phase::Flight)
            } else if state.speed < ABORT_SPEED && state.throttle < ABORT_THROTTLE {
                Some(Phase::Taxi)
            } else {
                None
            }
        }
        Phase::Flight | Phase::Approach | Phase::Landing => {
            if ctx.on_surface {
                if state.systems.gear_down
                    && state.roll.abs() < deg_to_rad(10.0)
                    && ctx.sink_rate < MAX_TOUCHDOWN_SINK
                    && state.speed < MAX_TOUCHDOWN_SPEED
                {
                    Some(Phase::Landed)
                } else {
                    Some(Phase::Crashed)
                }
            } else {
                None
            }
        }
        Phase::Landed => {
            if state.speed < STOP_SPEED {
                Some(Phase::Parked)
            } else {
                None
            }
        }
        Phase::Crashed => None,
    };

    if let Some(next) = next {
        debug!("phase transition {:?} -> {:?}", state.phase, next);
        if next == Phase::Flight && state.phase == Phase::Takeoff {
            seed_liftoff_attitude(state, config);
        }
        if next == Phase::Landed {
            state.gamma = 0.0;
            state.alpha = 0.0;
            state.pitch = 0.0;
        }
        state.phase = next;
    }
}

/// At the liftoff instant the climb attitude is seeded with small positive
/// values so the flight integrator starts from a sensible climb.
fn seed_liftoff_attitude(state: &mut VehicleState, config: &VehicleConfig) {
    state.gamma = deg_to_rad(3.0);
    state.alpha = deg_to_rad(5.0).min(config.limits.max_alpha);
    state.pitch = state.gamma + state.alpha;
}
