//! DG solver components.
//!
//! # Submodules
//!
//! - [`state`]: Double-buffered global solution
//! - [`kernel`]: Right-hand side evaluation and the explicit update
//! - [`diagnostics`]: Mass, bounds and progress reporting

pub mod diagnostics;
pub mod kernel;
pub mod state;

pub use diagnostics::{AdvectionDiagnostics, DiagnosticsTracker, ProgressReporter, total_mass};
pub use kernel::{UpdateKernel, compute_dt_advection_2d};
pub use state::GlobalSolution;
