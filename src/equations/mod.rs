//! The advected field's transport law.
//!
//! Provides the wind field abstraction used by operator assembly and the
//! upwind flux, plus a few ready-made fields.

mod advection_2d;

pub use advection_2d::{CellularWind, UniformWind, WindField, max_wind_speed};
