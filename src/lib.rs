//! # dg-advect
//!
//! A matrix-free Discontinuous Galerkin solver for 2D linear advection,
//! ∂φ/∂t + ∇·(v φ) = 0, on uniform quadrilateral meshes.
//!
//! This crate provides:
//! - Polynomial toolkit (Legendre, Gauss and Gauss-Lobatto rules, Lagrange bases)
//! - Tensor-product nodal basis with cell and face quadrature
//! - Mesh topology, boundary tagging and dof numbering
//! - Per-cell stiffness and lifting operators built once from the wind field
//! - Upwind face fluxes with per-tag boundary rules
//! - Explicit update kernel (forward Euler, SSP-RK3), optionally parallel
//! - VTU output

pub mod basis;
pub mod boundary;
pub mod equations;
pub mod error;
pub mod flux;
pub mod io;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod problem;
pub mod solver;
pub mod time;

pub use boundary::{BoundaryRule, BoundaryTable, FixedValue, ZeroGradient};
pub use equations::{CellularWind, UniformWind, WindField};
pub use error::{AssemblyError, ConfigError, ProblemError, TopologyError};
pub use flux::{FaceTable, upwind_flux};
pub use mesh::{BoundaryTag, DofHandler, Mesh2D};
pub use operators::{FaceDofMap, LocalOperatorBuilder, OperatorStore};
pub use problem::{AdvectionProblem, ProblemConfig, RunSummary};
pub use solver::{GlobalSolution, UpdateKernel, compute_dt_advection_2d, total_mass};
pub use time::{MarchOutcome, StandardIntegrator, TimeStepper, run_advection_2d};
