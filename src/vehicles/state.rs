use serde::{Deserialize, Serialize};

use crate::utils::constants::GROUND_ELEVATION;
use crate::vehicles::config::VehicleConfig;

/// Discrete flight phase. `Landing` and `Approach` integrate like `Flight`;
/// `Crashed` is absorbing and turns `step` into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Parked,
    Taxi,
    Takeoff,
    Flight,
    Approach,
    Landing,
    Landed,
    Crashed,
}

impl Phase {
    /// Phases integrated with the 1-D ground model.
    pub fn on_ground(self) -> bool {
        matches!(
            self,
            Phase::Parked | Phase::Taxi | Phase::Takeoff | Phase::Landed
        )
    }

    /// Phases integrated with the free-flight equations of motion.
    pub fn airborne(self) -> bool {
        matches!(self, Phase::Flight | Phase::Approach | Phase::Landing)
    }
}

/// Propulsion mode. Always an explicit per-vehicle selection, never inferred
/// from flight conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropulsionMode {
    /// Air-breathing turbofan with density lapse and afterburner
    Air,
    /// Scramjet-like flat thrust
    Hypersonic,
    /// Rocket flat thrust
    Rocket,
    /// Low flat thrust for ground maneuvering
    Taxi,
}

/// Geodetic position on a spherical Earth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Geodetic {
    /// Latitude [rad]
    pub latitude: f64,
    /// Longitude [rad]
    pub longitude: f64,
    /// Altitude above the surface [m]
    pub altitude: f64,
}

/// Vehicle system switches. Grouped so the per-tick record does not sprout
/// loose booleans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleSystems {
    pub engine_on: bool,
    pub gear_down: bool,
    pub flaps_down: bool,
    pub brakes_on: bool,
    pub speed_brake: bool,
    pub infinite_fuel: bool,
}

impl Default for VehicleSystems {
    fn default() -> Self {
        Self {
            engine_on: false,
            gear_down: true,
            flaps_down: false,
            brakes_on: false,
            speed_brake: false,
            infinite_fuel: false,
        }
    }
}

/// Envelope violations reported to the caller. The engine never halts on
/// these; they are display/limiting inputs only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnvelopeWarnings {
    pub stalling: bool,
    pub overspeed: bool,
}

/// Mutable per-tick kinematic/dynamic record. Owned exclusively by the
/// integrator during a tick; read-only to everything else between ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleState {
    /// Geodetic position
    pub position: Geodetic,
    /// Scalar speed [m/s]
    pub speed: f64,
    /// Heading, clockwise from north [rad]
    pub heading: f64,
    /// Flight-path angle above local horizontal [rad]
    pub gamma: f64,
    /// Body pitch attitude [rad]
    pub pitch: f64,
    /// Bank angle [rad]
    pub roll: f64,
    /// Sideslip angle [rad]
    pub beta: f64,
    /// Cosmetic nose offset from the velocity vector, used for vacuum
    /// nose-pointing [rad]
    pub yaw_offset: f64,
    /// Angle of attack [rad]
    pub alpha: f64,
    /// Throttle setting [0, 1]
    pub throttle: f64,
    /// Fuel remaining [kg]
    pub fuel: f64,
    /// External stores mass [kg]
    pub weapon_mass: f64,
    /// Current Mach number (derived each tick)
    pub mach: f64,
    /// Current load factor, lift/weight (derived each tick)
    pub g_load: f64,
    /// Current flight phase
    pub phase: Phase,
    /// Selected propulsion mode
    pub propulsion_mode: PropulsionMode,
    /// System switches
    pub systems: VehicleSystems,
    /// Envelope violation flags
    pub warnings: EnvelopeWarnings,
}

impl VehicleState {
    /// Spawn parked on the runway with full fuel.
    pub fn on_runway(config: &VehicleConfig, latitude: f64, longitude: f64, heading: f64) -> Self {
        Self {
            position: Geodetic {
                latitude,
                longitude,
                altitude: GROUND_ELEVATION,
            },
            speed: 0.0,
            heading,
            gamma: 0.0,
            pitch: 0.0,
            roll: 0.0,
            beta: 0.0,
            yaw_offset: 0.0,
            alpha: 0.0,
            throttle: 0.0,
            fuel: config.mass.fuel_capacity,
            weapon_mass: 0.0,
            mach: 0.0,
            g_load: 1.0,
            phase: Phase::Parked,
            propulsion_mode: PropulsionMode::Air,
            systems: VehicleSystems::default(),
            warnings: EnvelopeWarnings::default(),
        }
    }

    /// Spawn airborne in the flight phase, gear up, engine running.
    pub fn airborne(
        config: &VehicleConfig,
        position: Geodetic,
        speed: f64,
        heading: f64,
        gamma: f64,
    ) -> Self {
        let mut state = Self::on_runway(config, position.latitude, position.longitude, heading);
        state.position = position;
        state.speed = speed;
        state.gamma = gamma;
        state.pitch = gamma;
        state.phase = Phase::Flight;
        state.systems.engine_on = true;
        state.systems.gear_down = false;
        state
    }

    /// Total mass: empty + fuel + stores [kg].
    pub fn mass(&self, config: &VehicleConfig) -> f64 {
        config.mass.empty + self.fuel + self.weapon_mass
    }

    /// Current weight under inverse-square gravity [N].
    pub fn weight(&self, config: &VehicleConfig) -> f64 {
        self.mass(config) * crate::systems::forces::gravity(self.position.altitude)
    }
}
