//! Flight integrator: advances one vehicle by one tick.
//!
//! Ground phases use a 1-D longitudinal model, atmospheric flight uses
//! explicit Euler over the point-mass equations of motion, and force-free
//! vacuum flight is handed to the analytic orbital propagator. The regimes
//! blend through the dynamic-pressure aero blend factor, never a hard switch.

use log::debug;

use crate::atmosphere::AtmosphereModel;
use crate::systems::controls::{apply_controls, ControlInputs};
use crate::systems::forces::{
    aero_forces, decompose_thrust, gravity, stall_speed, thrust_output, AeroEnvironment,
};
use crate::systems::orbital;
use crate::systems::phase::{update_phase, PhaseContext};
use crate::utils::constants::{
    GROUND_ELEVATION, MAX_EULER_DT, MIN_ORBITAL_SPEED, R_EARTH, VACUUM_BLEND_THRESHOLD,
};
use crate::utils::math::wrap_pi;
use crate::vehicles::config::VehicleConfig;
use crate::vehicles::state::{Phase, VehicleState};

/// Throttle below which thrust is negligible for vacuum eligibility.
const IDLE_THROTTLE: f64 = 0.01;
/// Structural flight-path-angle bound in the aero regime [rad].
const MAX_AERO_GAMMA: f64 = 80.0 * std::f64::consts::PI / 180.0;
/// Nosewheel steering rate at low speed [rad/s].
const NOSEWHEEL_RATE: f64 = 0.4;
/// Speed at which nosewheel authority has faded to its floor [m/s].
const NOSEWHEEL_FADE_SPEED: f64 = 80.0;
/// Stall warning margin over the 1-g stall speed.
const STALL_MARGIN: f64 = 1.05;
/// Guard for divisions by speed and cos(gamma).
const SPEED_GUARD: f64 = 0.1;

/// Advances `state` by `dt` seconds under `controls`.
///
/// Non-positive `dt` and the `Crashed` phase are no-ops. The analytic vacuum
/// propagator takes the full `dt`; every Euler path clamps it to
/// [`MAX_EULER_DT`] — including the fallback taken when the propagator
/// declines a degenerate state, so such a tick advances at most
/// [`MAX_EULER_DT`] of the requested interval. Identical inputs produce
/// bit-identical outputs.
pub fn step<A: AtmosphereModel>(
    state: &mut VehicleState,
    controls: &ControlInputs,
    dt: f64,
    config: &VehicleConfig,
    atmosphere: &A,
) {
    if dt <= 0.0 || state.phase == Phase::Crashed {
        return;
    }

    let env = AeroEnvironment::sample(atmosphere, state.position.altitude, state.speed);
    let coasting = coasting_candidate(state, &env);
    let euler_dt = dt.min(MAX_EULER_DT);

    // Controls map before dispatch: a command arriving on a coasting tick
    // takes effect this tick, not the next.
    apply_controls(state, controls, config, &env, if coasting { dt } else { euler_dt });

    let thrust = thrust_output(state, config, &env);
    let vacuum = coasting && thrust_negligible(state);

    // How much simulated time this tick actually covers.
    let mut advanced_dt = euler_dt;

    if state.phase.on_ground() {
        integrate_ground(state, controls, config, &env, thrust.force, euler_dt);
    } else if vacuum {
        match orbital::propagate(&state.position, state.speed, state.heading, state.gamma, dt) {
            Ok(out) => {
                state.position = out.position;
                state.speed = out.speed;
                state.heading = out.heading;
                state.gamma = out.gamma;
                advanced_dt = dt;
            }
            Err(err) => {
                debug!("orbital propagation declined ({err}), using Euler");
                integrate_flight(state, config, &env, thrust.force, euler_dt);
            }
        }
    } else {
        integrate_flight(state, config, &env, thrust.force, euler_dt);
    }

    if !state.systems.infinite_fuel {
        state.fuel = (state.fuel - thrust.fuel_flow * advanced_dt).max(0.0);
    }

    finish_tick(state, config, atmosphere);
}

/// Coast candidacy from the environment alone: negligible aero and enough
/// speed to define an orbit. Thrust is judged separately, after the control
/// mapper has run.
fn coasting_candidate(state: &VehicleState, env: &AeroEnvironment) -> bool {
    state.phase.airborne()
        && env.blend < VACUUM_BLEND_THRESHOLD
        && state.speed >= MIN_ORBITAL_SPEED
}

/// Whether the propulsion system can be ignored for the analytic propagator.
fn thrust_negligible(state: &VehicleState) -> bool {
    !state.systems.engine_on
        || state.throttle < IDLE_THROTTLE
        || (state.fuel <= 0.0 && !state.systems.infinite_fuel)
}

/// 1-D longitudinal ground dynamics with bounded nosewheel steering.
fn integrate_ground(
    state: &mut VehicleState,
    controls: &ControlInputs,
    config: &VehicleConfig,
    env: &AeroEnvironment,
    thrust: f64,
    dt: f64,
) {
    let mass = state.mass(config);
    let weight = state.weight(config);
    let aero = aero_forces(state, config, env);

    let normal_force = (weight - aero.lift).max(0.0);
    let rolling = config.ground.rolling_friction * normal_force;
    let braking = if state.systems.brakes_on && state.speed > 0.0 {
        mass * config.ground.brake_decel
    } else {
        0.0
    };

    let accel = (thrust - aero.drag - rolling - braking) / mass;
    state.speed = (state.speed + accel * dt).max(0.0);

    // Nosewheel authority fades with speed but never vanishes entirely.
    if state.speed > 0.0 {
        let authority = (1.0 - state.speed / NOSEWHEEL_FADE_SPEED).clamp(0.15, 1.0);
        let steer = controls.yaw.clamp(-1.0, 1.0) * NOSEWHEEL_RATE * authority;
        state.heading = wrap_pi(state.heading + steer * dt);
    }

    let radius = R_EARTH + state.position.altitude;
    let (sin_psi, cos_psi) = state.heading.sin_cos();
    state.position.latitude += state.speed * cos_psi / radius * dt;
    state.position.longitude +=
        state.speed * sin_psi / (radius * state.position.latitude.cos().abs().max(1e-6)) * dt;
    state.position.altitude = GROUND_ELEVATION;
    state.gamma = 0.0;
}

/// Explicit Euler over the point-mass equations of motion in the
/// speed/gamma/heading formulation.
fn integrate_flight(
    state: &mut VehicleState,
    config: &VehicleConfig,
    env: &AeroEnvironment,
    thrust: f64,
    dt: f64,
) {
    let mass = state.mass(config);
    let g = gravity(state.position.altitude);
    let radius = R_EARTH + state.position.altitude;
    let aero = aero_forces(state, config, env);
    let thrust = decompose_thrust(thrust, state.alpha, state.yaw_offset);

    let speed = state.speed.max(SPEED_GUARD);
    let (sin_gamma, cos_gamma) = state.gamma.sin_cos();
    let (sin_psi, cos_psi) = state.heading.sin_cos();
    let (sin_roll, cos_roll) = state.roll.sin_cos();

    let v_dot = (thrust.prograde - aero.drag) / mass - g * sin_gamma;

    // The centrifugal relief term keeps gamma finite in level flight at
    // orbital speed.
    let gamma_dot = (aero.lift * cos_roll + thrust.normal) / (mass * speed)
        - (g - speed * speed / radius) * cos_gamma / speed;

    // Spherical transport rate keeps great-circle tracking correct at high
    // latitude.
    let cos_gamma_safe = if cos_gamma.abs() < 1e-6 {
        1e-6_f64.copysign(cos_gamma)
    } else {
        cos_gamma
    };
    let turn = (aero.lift * sin_roll + thrust.lateral) / (mass * speed * cos_gamma_safe);
    // tan(latitude) is bounded to keep the near-pole singularity out of the
    // heading rate.
    let tan_lat = state.position.latitude.tan().clamp(-1e3, 1e3);
    let transport = speed * cos_gamma * sin_psi * tan_lat / radius;
    let psi_dot = turn + transport;

    state.speed = (state.speed + v_dot * dt).max(0.0);
    state.gamma += gamma_dot * dt;
    state.heading = wrap_pi(state.heading + psi_dot * dt);

    state.position.latitude += speed * cos_gamma * cos_psi / radius * dt;
    state.position.longitude += speed * cos_gamma * sin_psi
        / (radius * state.position.latitude.cos().abs().max(1e-6))
        * dt;
    state.position.altitude += speed * sin_gamma * dt;

    if env.blend >= 0.5 {
        // Structural regime: gamma bounded, alpha already clamped by the
        // control mapper.
        state.gamma = state.gamma.clamp(-MAX_AERO_GAMMA, MAX_AERO_GAMMA);
    } else {
        state.gamma = wrap_pi(state.gamma);
    }
    state.pitch = state.gamma + state.alpha;
}

/// Post-integration bookkeeping: touchdown evaluation, phase transitions, and
/// derived display fields.
fn finish_tick<A: AtmosphereModel>(
    state: &mut VehicleState,
    config: &VehicleConfig,
    atmosphere: &A,
) {
    let on_surface = state.phase.airborne() && state.position.altitude <= GROUND_ELEVATION;
    let sink_rate = -(state.speed * state.gamma.sin());
    if on_surface {
        state.position.altitude = GROUND_ELEVATION;
    }

    let env = AeroEnvironment::sample(atmosphere, state.position.altitude, state.speed);
    let aero = aero_forces(state, config, &env);
    let weight = state.weight(config);

    let ctx = PhaseContext {
        lift: aero.lift,
        weight,
        sink_rate,
        on_surface,
    };
    update_phase(state, config, &ctx);

    state.mach = env.mach;
    state.g_load = if weight > 0.0 { aero.lift / weight } else { 0.0 };
    state.warnings.stalling = env.blend >= 0.5
        && state.phase.airborne()
        && (state.speed < STALL_MARGIN * stall_speed(state, config, env.density)
            || state.alpha >= config.limits.max_alpha - 1e-9);
    state.warnings.overspeed = config
        .limits
        .max_mach
        .map_or(false, |max_mach| state.mach > max_mach);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::StandardAtmosphere;
    use crate::systems::orbital::osculating_elements;
    use crate::utils::constants::MU_EARTH;
    use crate::vehicles::state::Geodetic;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn orbital_state(config: &VehicleConfig, speed: f64) -> VehicleState {
        let position = Geodetic {
            latitude: 0.2,
            longitude: 0.4,
            altitude: 400_000.0,
        };
        let mut state = VehicleState::airborne(config, position, speed, FRAC_PI_2, 0.0);
        state.systems.engine_on = false;
        state.throttle = 0.0;
        state
    }

    #[test]
    fn test_noop_on_bad_dt_and_crash() {
        let config = VehicleConfig::fighter();
        let atmo = StandardAtmosphere::default();
        let position = Geodetic {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 3_000.0,
        };
        let mut state = VehicleState::airborne(&config, position, 200.0, 0.0, 0.0);
        let reference = state.clone();

        step(&mut state, &ControlInputs::default(), 0.0, &config, &atmo);
        assert_relative_eq!(state.speed, reference.speed);
        assert_relative_eq!(state.position.altitude, reference.position.altitude);

        step(&mut state, &ControlInputs::default(), -1.0, &config, &atmo);
        assert_relative_eq!(state.speed, reference.speed);

        state.phase = Phase::Crashed;
        let crashed = state.clone();
        step(&mut state, &ControlInputs::default(), 0.05, &config, &atmo);
        assert_relative_eq!(state.speed, crashed.speed);
        assert_eq!(state.phase, Phase::Crashed);
    }

    #[test]
    fn test_determinism() {
        let config = VehicleConfig::fighter();
        let atmo = StandardAtmosphere::default();
        let position = Geodetic {
            latitude: 0.1,
            longitude: 0.1,
            altitude: 4_000.0,
        };
        let controls = ControlInputs {
            pitch: 0.3,
            roll: -0.2,
            throttle_set: Some(0.9),
            ..Default::default()
        };

        let mut a = VehicleState::airborne(&config, position, 220.0, 1.0, 0.02);
        let mut b = a.clone();
        for _ in 0..500 {
            step(&mut a, &controls, 0.05, &config, &atmo);
            step(&mut b, &controls, 0.05, &config, &atmo);
        }
        assert_eq!(a.speed.to_bits(), b.speed.to_bits());
        assert_eq!(a.position.latitude.to_bits(), b.position.latitude.to_bits());
        assert_eq!(a.gamma.to_bits(), b.gamma.to_bits());
    }

    #[test]
    fn test_level_flight_is_sane() {
        let config = VehicleConfig::fighter();
        let atmo = StandardAtmosphere::default();
        let position = Geodetic {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 5_000.0,
        };
        let mut state = VehicleState::airborne(&config, position, 250.0, 0.0, 0.0);
        // Trim alpha for roughly level flight.
        let env = AeroEnvironment::sample(&atmo, 5_000.0, 250.0);
        state.alpha = state.weight(&config)
            / (env.dynamic_pressure * config.wing.area * config.aero.cl_alpha);
        let controls = ControlInputs {
            throttle_set: Some(0.8),
            ..Default::default()
        };

        for _ in 0..2_000 {
            step(&mut state, &controls, 0.05, &config, &atmo);
            assert!(state.speed.is_finite());
            assert!(state.position.altitude.is_finite());
        }
        assert!(state.phase == Phase::Flight);
        assert!(state.position.altitude > 2_000.0, "kept flying");
        assert!(state.speed > 100.0 && state.speed < 1_000.0);
        assert!(state.g_load > 0.2 && state.g_load < 3.0, "g_load {}", state.g_load);
    }

    #[test]
    fn test_vacuum_dispatch_uses_analytic_propagator() {
        let config = VehicleConfig::spaceplane();
        let atmo = StandardAtmosphere::default();
        let speed = (MU_EARTH / (R_EARTH + 400_000.0)).sqrt();
        let mut state = orbital_state(&config, speed);

        let before = osculating_elements(&state.position, state.speed, state.heading, state.gamma)
            .unwrap();
        // One large analytic step; the Euler path would be clamped to 0.05 s
        // and could not cover this arc.
        step(&mut state, &ControlInputs::default(), 30.0, &config, &atmo);
        let after = osculating_elements(&state.position, state.speed, state.heading, state.gamma)
            .unwrap();
        assert_relative_eq!(
            after.semi_major_axis,
            before.semi_major_axis,
            max_relative = 1e-9
        );
        // The vehicle actually moved ~230 km along track.
        assert!((state.position.longitude - 0.4).abs() > 0.01);
    }

    #[test]
    fn test_euler_drifts_where_kepler_does_not() {
        let config = VehicleConfig::spaceplane();
        let atmo = StandardAtmosphere::default();
        // Slightly elliptical so the Euler error has something to bite on.
        let speed = 1.02 * (MU_EARTH / (R_EARTH + 400_000.0)).sqrt();

        let mut kepler = orbital_state(&config, speed);
        let initial =
            osculating_elements(&kepler.position, kepler.speed, kepler.heading, kepler.gamma)
                .unwrap();
        for _ in 0..1_000 {
            step(&mut kepler, &ControlInputs::default(), 1.0, &config, &atmo);
        }
        let after_kepler =
            osculating_elements(&kepler.position, kepler.speed, kepler.heading, kepler.gamma)
                .unwrap();
        let kepler_drift = ((after_kepler.semi_major_axis - initial.semi_major_axis)
            / initial.semi_major_axis)
            .abs();
        assert!(kepler_drift < 1e-6, "kepler drift {kepler_drift}");

        // Same interval with naive fixed-step Euler at the same cadence.
        let mut euler = orbital_state(&config, speed);
        for _ in 0..1_000 {
            let env =
                AeroEnvironment::sample(&atmo, euler.position.altitude, euler.speed);
            integrate_flight(&mut euler, &config, &env, 0.0, 1.0);
        }
        let after_euler =
            osculating_elements(&euler.position, euler.speed, euler.heading, euler.gamma)
                .unwrap();
        let euler_drift = ((after_euler.semi_major_axis - initial.semi_major_axis)
            / initial.semi_major_axis)
            .abs();
        assert!(
            euler_drift > 100.0 * kepler_drift.max(1e-12),
            "euler drift {euler_drift} vs kepler {kepler_drift}"
        );
    }

    #[test]
    fn test_burn_on_coasting_tick_takes_effect_immediately() {
        let config = VehicleConfig::spaceplane();
        let atmo = StandardAtmosphere::default();
        let speed = (MU_EARTH / (R_EARTH + 400_000.0)).sqrt();
        let mut state = orbital_state(&config, speed);
        state.systems.engine_on = true;
        state.propulsion_mode = crate::vehicles::state::PropulsionMode::Rocket;

        let before = osculating_elements(&state.position, state.speed, state.heading, state.gamma)
            .unwrap();
        // The throttle command arrives while coasting; the very same tick must
        // dispatch to the thrust-applying path instead of the analytic coast.
        let burn = ControlInputs {
            throttle_set: Some(1.0),
            ..Default::default()
        };
        step(&mut state, &burn, 60.0, &config, &atmo);
        assert_relative_eq!(state.throttle, 1.0);

        let after = osculating_elements(&state.position, state.speed, state.heading, state.gamma)
            .unwrap();
        assert!(
            after.semi_major_axis > before.semi_major_axis + 500.0,
            "prograde burn tick left the orbit unchanged: a {} -> {}",
            before.semi_major_axis,
            after.semi_major_axis
        );
    }

    #[test]
    fn test_coast_tick_burns_no_fuel() {
        let config = VehicleConfig::spaceplane();
        let atmo = StandardAtmosphere::default();
        let speed = (MU_EARTH / (R_EARTH + 400_000.0)).sqrt();
        let mut state = orbital_state(&config, speed);
        state.systems.engine_on = true;
        state.throttle = 0.0;

        let fuel_before = state.fuel;
        step(&mut state, &ControlInputs::default(), 600.0, &config, &atmo);
        // The analytic path covered the whole ten minutes...
        assert!((state.position.longitude - 0.4).abs() > 0.1, "coast did not advance");
        // ...and an idle engine burned nothing over any of it.
        assert_relative_eq!(state.fuel, fuel_before);
    }

    #[test]
    fn test_declined_propagation_advances_one_euler_step() {
        let config = VehicleConfig::spaceplane();
        let atmo = StandardAtmosphere::default();
        // Radial climb: no angular momentum, so the analytic propagator
        // declines and the clamped Euler fallback carries the tick.
        let mut state = orbital_state(&config, 2_000.0);
        state.gamma = FRAC_PI_2;
        let altitude_before = state.position.altitude;

        step(&mut state, &ControlInputs::default(), 1.0, &config, &atmo);
        assert_relative_eq!(
            state.position.altitude - altitude_before,
            2_000.0 * MAX_EULER_DT,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_degenerate_orbit_falls_back_to_euler() {
        let config = VehicleConfig::spaceplane();
        let atmo = StandardAtmosphere::default();
        // Escape speed: the propagator must decline and Euler must carry the
        // tick without producing non-finite fields.
        let v_escape = (2.0 * MU_EARTH / (R_EARTH + 400_000.0)).sqrt();
        let mut state = orbital_state(&config, v_escape * 1.05);

        for _ in 0..200 {
            step(&mut state, &ControlInputs::default(), 1.0, &config, &atmo);
            assert!(state.speed.is_finite());
            assert!(state.position.latitude.is_finite());
            assert!(state.position.longitude.is_finite());
            assert!(state.position.altitude.is_finite());
            assert!(state.gamma.is_finite());
            assert!(state.heading.is_finite());
        }
    }

    #[test]
    fn test_ground_roll_accelerates_and_steers() {
        let config = VehicleConfig::fighter();
        let atmo = StandardAtmosphere::default();
        let mut state = VehicleState::on_runway(&config, 0.0, 0.0, 0.0);
        state.systems.engine_on = true;
        state.phase = Phase::Taxi;
        let controls = ControlInputs {
            throttle_set: Some(0.5),
            yaw: 0.5,
            ..Default::default()
        };

        for _ in 0..100 {
            step(&mut state, &controls, 0.05, &config, &atmo);
        }
        assert!(state.speed > 1.0, "speed {}", state.speed);
        assert!(state.heading > 0.0, "nosewheel steering turned the vehicle");
        assert_relative_eq!(state.position.altitude, GROUND_ELEVATION);
    }

    #[test]
    fn test_braking_stops_rollout() {
        let config = VehicleConfig::fighter();
        let atmo = StandardAtmosphere::default();
        let mut state = VehicleState::on_runway(&config, 0.0, 0.0, 0.0);
        state.phase = Phase::Landed;
        state.speed = 60.0;
        state.systems.engine_on = false;
        state.systems.brakes_on = true;

        let controls = ControlInputs::default();
        let mut steps = 0;
        while state.phase == Phase::Landed && steps < 20_000 {
            step(&mut state, &controls, 0.05, &config, &atmo);
            steps += 1;
        }
        assert_eq!(state.phase, Phase::Parked);
    }
}
