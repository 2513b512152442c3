pub mod controls;
pub mod forces;
pub mod integrator;
pub mod orbital;
pub mod phase;

pub use controls::ControlInputs;
pub use integrator::step;
pub use orbital::{osculating_elements, propagate, KeplerError, OrbitalElements, VacuumState};
