//! Numerical fluxes.
//!
//! Provides the upwind flux for scalar advection and the face-level
//! evaluator that feeds the update kernel:
//! - Interior faces are evaluated once, from the owning (lower-index) cell
//! - Boundary faces use the ghost value of their tag's rule

mod face;
mod upwind;

pub use face::{FaceFluxEvaluator, FaceRole, FaceTable, FluxSlot};
pub use upwind::{upwind_flux, upwind_value};
