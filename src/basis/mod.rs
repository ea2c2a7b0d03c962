//! Nodal basis functions and their quadrature tables.
//!
//! This module provides:
//! - The tensor-product Lagrange basis on GLL support points
//! - Cell and face values (shape values, gradients, JxW, mapped points)

mod lagrange_2d;
mod values;

pub use lagrange_2d::LagrangeBasis2D;
pub use values::{CellValues, FaceValues, face_reference_point};
