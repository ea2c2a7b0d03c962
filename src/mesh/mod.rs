//! Mesh representation.
//!
//! Provides the mesh data structures for the DG discretization:
//! - Uniform Cartesian quadrilateral mesh with face adjacency
//! - Boundary tags and the boundary-id assignment rule
//! - Per-cell dof numbering and dof support points

mod boundary_tags;
mod dofs;
mod mesh2d;

pub use boundary_tags::BoundaryTag;
pub use dofs::DofHandler;
pub use mesh2d::{CellGeometry, ElementFace, FACE_NORMALS, FACES_PER_CELL, FaceLink, Mesh2D};
