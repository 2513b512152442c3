pub mod config;
pub mod state;

pub use config::VehicleConfig;
pub use state::{Geodetic, Phase, PropulsionMode, VehicleState};
