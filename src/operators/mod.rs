//! Local DG operators.
//!
//! This module provides:
//! - The face-local to cell-local dof map (`FaceDofMap`)
//! - Per-cell stiffness and lifting operators and their arena (`OperatorStore`)

mod face_map;
mod local;

pub use face_map::FaceDofMap;
pub use local::{CellOperators, LocalOperatorBuilder, OperatorStore, invert_mass_matrix};
