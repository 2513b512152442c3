//! Phased flight dynamics for a single vehicle, from runway to orbit.
//!
//! The engine advances a point-mass vehicle through ground handling,
//! atmospheric flight, and vacuum coast with one [`step`] call per tick.
//! Atmospheric flight uses explicit Euler over the speed/gamma/heading
//! equations of motion; force-free vacuum flight is propagated analytically
//! on a Kepler orbit so long coasts conserve orbital elements.
//!
//! ```no_run
//! use apogee::{step, ControlInputs, StandardAtmosphere, VehicleConfig, VehicleState};
//!
//! let config = VehicleConfig::fighter();
//! let atmosphere = StandardAtmosphere::default();
//! let mut state = VehicleState::on_runway(&config, 0.0, 0.0, 0.0);
//! state.systems.engine_on = true;
//!
//! let controls = ControlInputs {
//!     throttle_set: Some(1.0),
//!     ..Default::default()
//! };
//! for _ in 0..1_200 {
//!     step(&mut state, &controls, 0.05, &config, &atmosphere);
//! }
//! ```

pub mod atmosphere;
pub mod systems;
pub mod utils;
pub mod vehicles;

pub use atmosphere::{AtmosphereModel, StandardAtmosphere};
pub use systems::{
    osculating_elements, propagate, step, ControlInputs, KeplerError, OrbitalElements, VacuumState,
};
pub use utils::errors::SimError;
pub use vehicles::{Geodetic, Phase, PropulsionMode, VehicleConfig, VehicleState};
