//! Physical constants shared across the simulation systems.

/// Earth gravitational parameter GM [m³/s²].
pub const MU_EARTH: f64 = 3.986_004_418e14;

/// Mean Earth radius [m]. A spherical Earth is assumed everywhere.
pub const R_EARTH: f64 = 6.371e6;

/// ISA sea-level air density [kg/m³].
pub const SEA_LEVEL_DENSITY: f64 = 1.225;

/// ISA sea-level temperature [K].
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15;

/// Standard gravity at the surface [m/s²], used by the ISA lapse model.
pub const STANDARD_GRAVITY: f64 = 9.806_65;

/// Dynamic pressure above which aerodynamic forces apply at full strength [Pa].
pub const Q_FULL_AERO: f64 = 100.0;

/// Dynamic pressure below which the vehicle is treated as in vacuum [Pa].
pub const Q_VACUUM: f64 = 1.0;

/// Aero blend below this value (with negligible thrust) makes the vehicle
/// eligible for the analytic orbital propagator.
pub const VACUUM_BLEND_THRESHOLD: f64 = 0.01;

/// Minimum speed for a meaningful osculating orbit [m/s].
pub const MIN_ORBITAL_SPEED: f64 = 100.0;

/// Maximum timestep accepted by the explicit Euler paths [s]. Larger caller
/// steps are clamped; the analytic propagator takes the full step.
pub const MAX_EULER_DT: f64 = 0.05;

/// Runway/ground elevation [m]. Ground operations happen at sea level.
pub const GROUND_ELEVATION: f64 = 0.0;
