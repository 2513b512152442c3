use serde::{Deserialize, Serialize};

use crate::utils::errors::SimError;
use crate::utils::math::deg_to_rad;

/// Complete vehicle configuration. Immutable once constructed; every `step`
/// call site supplies a profile explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Vehicle class name
    pub name: String,
    /// Mass and fuel parameters
    pub mass: MassConfig,
    /// Wing geometry
    pub wing: WingConfig,
    /// Aerodynamic coefficients
    pub aero: AeroConfig,
    /// Propulsion parameters per mode
    pub propulsion: PropulsionConfig,
    /// Structural and envelope limits
    pub limits: LimitsConfig,
    /// Ground handling parameters
    pub ground: GroundConfig,
    /// Whether this class supports vacuum/hypersonic regimes
    pub vacuum_capable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassConfig {
    /// Empty mass [kg]
    pub empty: f64,
    /// Internal fuel capacity [kg]
    pub fuel_capacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingConfig {
    /// Reference wing area [m²]
    pub area: f64,
    /// Wing span [m]
    pub span: f64,
    /// Aspect ratio (span²/area)
    pub aspect_ratio: f64,
}

/// Aerodynamic coefficients. The gear/flap/speedbrake drag terms are additive
/// increments on the clean zero-lift value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AeroConfig {
    /// Zero-lift drag coefficient, clean configuration
    pub cd0_clean: f64,
    /// Drag increment with gear extended
    pub cd0_gear: f64,
    /// Drag increment with flaps deployed
    pub cd0_flaps: f64,
    /// Drag increment with the speed brake out
    pub cd0_speedbrake: f64,
    /// Oswald efficiency factor
    pub oswald: f64,
    /// Lift-curve slope [1/rad]
    pub cl_alpha: f64,
    /// Maximum lift coefficient, clean
    pub cl_max: f64,
    /// Maximum lift coefficient with flaps
    pub cl_max_flaps: f64,
    /// Hypersonic coefficients blended in above Mach 5 (vacuum-capable
    /// classes only)
    pub hypersonic: Option<HypersonicAero>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HypersonicAero {
    /// Hypersonic lift-curve slope [1/rad]
    pub cl_alpha: f64,
    /// Hypersonic zero-lift drag coefficient
    pub cd0: f64,
}

/// Per-mode thrust and fuel-consumption constants. Thrust in N, specific fuel
/// consumption in kg/(N·s). Hypersonic/rocket/taxi thrust are flat values
/// with no modeled fuel burn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropulsionConfig {
    /// Military (dry) thrust at sea level [N]
    pub thrust_military: f64,
    /// Afterburner thrust at sea level [N]
    pub thrust_afterburner: f64,
    /// Specific fuel consumption at military power [kg/(N·s)]
    pub sfc_military: f64,
    /// Specific fuel consumption in afterburner [kg/(N·s)]
    pub sfc_afterburner: f64,
    /// Flat scramjet-like thrust [N]
    pub thrust_hypersonic: Option<f64>,
    /// Flat rocket thrust [N]
    pub thrust_rocket: Option<f64>,
    /// Flat taxi thrust [N]
    pub thrust_taxi: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Structural load limit [g]
    pub max_g: f64,
    /// Maximum roll rate [rad/s]
    pub max_roll_rate: f64,
    /// Maximum pitch (alpha) rate [rad/s]
    pub max_pitch_rate: f64,
    /// Maximum angle of attack [rad]
    pub max_alpha: f64,
    /// Never-exceed Mach number, if any
    pub max_mach: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundConfig {
    /// Rotation speed [m/s]
    pub rotation_speed: f64,
    /// Approach speed [m/s]
    pub approach_speed: f64,
    /// Rolling friction coefficient
    pub rolling_friction: f64,
    /// Braking deceleration [m/s²]
    pub brake_decel: f64,
}

impl VehicleConfig {
    /// Load a vehicle configuration from a YAML file
    pub fn from_yaml(path: &str) -> Result<Self, SimError> {
        let file = std::fs::File::open(path)?;
        let config: VehicleConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the vehicle configuration
    pub fn validate(&self) -> Result<(), SimError> {
        if self.mass.empty <= 0.0 {
            return Err(SimError::InvalidConfig("Empty mass must be positive".into()));
        }
        if self.mass.fuel_capacity < 0.0 {
            return Err(SimError::InvalidConfig(
                "Fuel capacity must be non-negative".into(),
            ));
        }
        if self.wing.area <= 0.0 {
            return Err(SimError::InvalidConfig("Wing area must be positive".into()));
        }
        if self.wing.span <= 0.0 {
            return Err(SimError::InvalidConfig("Wing span must be positive".into()));
        }
        if self.wing.aspect_ratio <= 0.0 {
            return Err(SimError::InvalidConfig(
                "Aspect ratio must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.aero.oswald) || self.aero.oswald == 0.0 {
            return Err(SimError::InvalidConfig(
                "Oswald efficiency must be in (0, 1]".into(),
            ));
        }
        if self.aero.cl_alpha <= 0.0 {
            return Err(SimError::InvalidConfig(
                "Lift-curve slope must be positive".into(),
            ));
        }
        if self.aero.cl_max <= 0.0 || self.aero.cl_max_flaps < self.aero.cl_max {
            return Err(SimError::InvalidConfig(
                "Lift coefficient limits are inconsistent".into(),
            ));
        }
        if self.propulsion.thrust_military <= 0.0
            || self.propulsion.thrust_afterburner < self.propulsion.thrust_military
        {
            return Err(SimError::InvalidConfig(
                "Thrust constants are inconsistent".into(),
            ));
        }
        if self.propulsion.sfc_military < 0.0 || self.propulsion.sfc_afterburner < 0.0 {
            return Err(SimError::InvalidConfig(
                "Specific fuel consumption must be non-negative".into(),
            ));
        }
        if self.limits.max_g <= 0.0
            || self.limits.max_roll_rate <= 0.0
            || self.limits.max_pitch_rate <= 0.0
            || self.limits.max_alpha <= 0.0
        {
            return Err(SimError::InvalidConfig(
                "Envelope limits must be positive".into(),
            ));
        }
        if self.ground.rotation_speed <= 0.0 || self.ground.approach_speed <= 0.0 {
            return Err(SimError::InvalidConfig(
                "Ground speeds must be positive".into(),
            ));
        }
        if self.ground.rolling_friction < 0.0 || self.ground.brake_decel <= 0.0 {
            return Err(SimError::InvalidConfig(
                "Ground friction parameters are invalid".into(),
            ));
        }
        if self.vacuum_capable && self.aero.hypersonic.is_none() {
            return Err(SimError::InvalidConfig(
                "Vacuum-capable classes need hypersonic coefficients".into(),
            ));
        }
        Ok(())
    }

    /// Single-seat multirole fighter profile (F-16 class). Atmosphere only.
    pub fn fighter() -> Self {
        Self {
            name: "fighter".to_string(),
            mass: MassConfig {
                empty: 8_573.0,
                fuel_capacity: 3_200.0,
            },
            wing: WingConfig {
                area: 27.87,
                span: 9.96,
                aspect_ratio: 3.56,
            },
            aero: AeroConfig {
                cd0_clean: 0.017,
                cd0_gear: 0.020,
                cd0_flaps: 0.015,
                cd0_speedbrake: 0.030,
                oswald: 0.88,
                cl_alpha: 3.9,
                cl_max: 1.6,
                cl_max_flaps: 2.0,
                hypersonic: None,
            },
            propulsion: PropulsionConfig {
                thrust_military: 76_300.0,
                thrust_afterburner: 127_000.0,
                sfc_military: 2.2e-5,
                sfc_afterburner: 5.4e-5,
                thrust_hypersonic: None,
                thrust_rocket: None,
                thrust_taxi: Some(8_000.0),
            },
            limits: LimitsConfig {
                max_g: 9.0,
                max_roll_rate: deg_to_rad(240.0),
                max_pitch_rate: deg_to_rad(30.0),
                max_alpha: deg_to_rad(25.0),
                max_mach: Some(2.05),
            },
            ground: GroundConfig {
                rotation_speed: 80.0,
                approach_speed: 70.0,
                rolling_friction: 0.02,
                brake_decel: 3.0,
            },
            vacuum_capable: false,
        }
    }

    /// Single-stage-to-orbit spaceplane profile. Spans atmosphere to vacuum
    /// with hypersonic and rocket propulsion modes.
    pub fn spaceplane() -> Self {
        Self {
            name: "spaceplane".to_string(),
            mass: MassConfig {
                empty: 32_000.0,
                fuel_capacity: 12_000.0,
            },
            wing: WingConfig {
                area: 120.0,
                span: 21.0,
                aspect_ratio: 3.68,
            },
            aero: AeroConfig {
                cd0_clean: 0.020,
                cd0_gear: 0.018,
                cd0_flaps: 0.012,
                cd0_speedbrake: 0.035,
                oswald: 0.80,
                cl_alpha: 2.8,
                cl_max: 1.2,
                cl_max_flaps: 1.5,
                hypersonic: Some(HypersonicAero {
                    cl_alpha: 1.6,
                    cd0: 0.055,
                }),
            },
            propulsion: PropulsionConfig {
                thrust_military: 220_000.0,
                thrust_afterburner: 320_000.0,
                sfc_military: 2.5e-5,
                sfc_afterburner: 6.0e-5,
                thrust_hypersonic: Some(450_000.0),
                thrust_rocket: Some(700_000.0),
                thrust_taxi: Some(30_000.0),
            },
            limits: LimitsConfig {
                max_g: 4.0,
                max_roll_rate: deg_to_rad(120.0),
                max_pitch_rate: deg_to_rad(20.0),
                max_alpha: deg_to_rad(40.0),
                max_mach: None,
            },
            ground: GroundConfig {
                rotation_speed: 110.0,
                approach_speed: 95.0,
                rolling_friction: 0.025,
                brake_decel: 2.5,
            },
            vacuum_capable: true,
        }
    }
}
