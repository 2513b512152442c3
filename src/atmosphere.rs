//! Atmosphere interface consumed by the force model.
//!
//! The engine never owns the atmosphere table; it only reads density, speed of
//! sound, and dynamic pressure through [`AtmosphereModel`]. A standard
//! atmosphere is provided for callers (and tests) that do not bring their own.

use serde::{Deserialize, Serialize};

use crate::utils::constants::{SEA_LEVEL_DENSITY, SEA_LEVEL_TEMPERATURE, STANDARD_GRAVITY};

/// Read-only atmosphere service.
pub trait AtmosphereModel {
    /// Air density at the given altitude [kg/m³].
    fn density(&self, altitude: f64) -> f64;

    /// Local speed of sound [m/s].
    fn speed_of_sound(&self, altitude: f64) -> f64;

    /// Dynamic pressure q = ½ρV² [Pa].
    fn dynamic_pressure(&self, altitude: f64, speed: f64) -> f64 {
        0.5 * self.density(altitude) * speed * speed
    }
}

/// ISA-style standard atmosphere: linear temperature lapse in the troposphere,
/// isothermal exponential falloff above, valid from the surface to orbit
/// (density underflows to zero well below typical orbital altitudes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardAtmosphere {
    pub sea_level_density: f64,
    pub sea_level_temperature: f64,
}

/// Tropopause altitude [m].
const TROPOPAUSE: f64 = 11_000.0;
/// Temperature lapse rate in the troposphere [K/m].
const LAPSE_RATE: f64 = 0.0065;
/// Specific gas constant for dry air [J/(kg·K)].
const GAS_CONSTANT: f64 = 287.05;
/// Ratio of specific heats for air.
const GAMMA_AIR: f64 = 1.4;

impl Default for StandardAtmosphere {
    fn default() -> Self {
        Self {
            sea_level_density: SEA_LEVEL_DENSITY,
            sea_level_temperature: SEA_LEVEL_TEMPERATURE,
        }
    }
}

impl StandardAtmosphere {
    fn temperature(&self, altitude: f64) -> f64 {
        let h = altitude.max(0.0);
        if h < TROPOPAUSE {
            self.sea_level_temperature - LAPSE_RATE * h
        } else {
            self.sea_level_temperature - LAPSE_RATE * TROPOPAUSE
        }
    }
}

impl AtmosphereModel for StandardAtmosphere {
    fn density(&self, altitude: f64) -> f64 {
        let h = altitude.max(0.0);
        let t0 = self.sea_level_temperature;
        let exponent = STANDARD_GRAVITY / (GAS_CONSTANT * LAPSE_RATE) - 1.0;
        if h < TROPOPAUSE {
            let ratio = 1.0 - LAPSE_RATE * h / t0;
            self.sea_level_density * ratio.max(0.0).powf(exponent)
        } else {
            let t_tp = t0 - LAPSE_RATE * TROPOPAUSE;
            let rho_tp = self.sea_level_density * (t_tp / t0).powf(exponent);
            let scale_height = GAS_CONSTANT * t_tp / STANDARD_GRAVITY;
            rho_tp * (-(h - TROPOPAUSE) / scale_height).exp()
        }
    }

    fn speed_of_sound(&self, altitude: f64) -> f64 {
        (GAMMA_AIR * GAS_CONSTANT * self.temperature(altitude)).sqrt()
    }
}
