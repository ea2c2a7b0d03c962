//! Error types for setup, assembly and the problem driver.
//!
//! Everything here is fatal for a run: assembly and topology errors are
//! raised before the first time step, never during one.

use thiserror::Error;

use crate::io::VtkError;

/// Inconsistent face adjacency or boundary tagging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Face `face` of `cell` points at `neighbor`, but no face of the
    /// neighbor points back.
    #[error(
        "cell {cell} face {face} claims neighbor {neighbor} (face {neighbor_face}), which does not point back"
    )]
    MissingReciprocal {
        cell: usize,
        face: usize,
        neighbor: usize,
        neighbor_face: usize,
    },

    /// A boundary face carries no boundary tag.
    #[error("boundary face {face} of cell {cell} has no boundary tag")]
    UntaggedBoundary { cell: usize, face: usize },

    /// A neighbor reference outside the cell range, or a face id outside 0..4.
    #[error("cell {cell} face {face} references cell {neighbor} face {neighbor_face} (mesh has {n_cells} cells)")]
    NeighborOutOfRange {
        cell: usize,
        face: usize,
        neighbor: usize,
        neighbor_face: usize,
        n_cells: usize,
    },

    /// A cell lists itself as its own neighbor.
    #[error("cell {cell} face {face} references itself")]
    SelfNeighbor { cell: usize, face: usize },
}

/// Failure while building the per-cell operator store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    /// The elemental mass matrix of `cell` cannot be inverted reliably.
    #[error("cell {cell}: unusable mass matrix ({reason})")]
    Configuration { cell: usize, reason: String },

    /// Mesh adjacency is inconsistent.
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),
}

/// Invalid problem configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("polynomial order must be at least 1, got {0}")]
    InvalidOrder(usize),

    #[error("refinement level {0} exceeds the maximum of {max}", max = crate::problem::MAX_REFINEMENT)]
    RefinementTooDeep(u32),

    #[error("CFL number must be positive and finite, got {0}")]
    InvalidCfl(f64),

    #[error("final time must be non-negative and finite, got {0}")]
    InvalidFinalTime(f64),

    #[error("domain [{x0}, {x1}] x [{y0}, {y1}] is empty")]
    EmptyDomain { x0: f64, x1: f64, y0: f64, y1: f64 },

    #[error("output interval must be at least 1 step")]
    InvalidOutputInterval,
}

/// Umbrella error for the problem driver.
#[derive(Debug, Error)]
pub enum ProblemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Vtk(#[from] VtkError),

    /// An operation was called before the step it depends on.
    #[error("{0} called before {1}")]
    OutOfOrder(&'static str, &'static str),
}
