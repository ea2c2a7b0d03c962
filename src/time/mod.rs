//! Time integration methods.

mod integrator;
mod run;

pub use integrator::{StandardIntegrator, TimeStepper};
pub use run::{MarchOutcome, run_advection_2d};
