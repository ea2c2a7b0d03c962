//! Boundary tags for mesh faces.
//!
//! Each boundary face carries one of three tags. The tag selects the ghost
//! value rule applied at that face (see [`crate::boundary::BoundaryTable`]).

use std::fmt;

/// Tag identifying the boundary rule of a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryTag {
    /// Tag 0: the x = 0 edge.
    Inflow,

    /// Tag 1: the y = 0 edge.
    Bottom,

    /// Tag 2: every remaining boundary face.
    Outflow,
}

impl BoundaryTag {
    /// All tags, ordered by id.
    pub const ALL: [BoundaryTag; 3] = [BoundaryTag::Inflow, BoundaryTag::Bottom, BoundaryTag::Outflow];

    /// Numeric boundary id (0, 1 or 2).
    #[inline]
    pub const fn id(self) -> usize {
        match self {
            BoundaryTag::Inflow => 0,
            BoundaryTag::Bottom => 1,
            BoundaryTag::Outflow => 2,
        }
    }

    /// Tag for a numeric boundary id.
    pub const fn from_id(id: usize) -> Option<Self> {
        match id {
            0 => Some(BoundaryTag::Inflow),
            1 => Some(BoundaryTag::Bottom),
            2 => Some(BoundaryTag::Outflow),
            _ => None,
        }
    }

    /// Classify a boundary face by its center.
    ///
    /// The checks form a disjoint chain: a face at the (0, 0) corner region
    /// that satisfies both coordinate tests gets tag 0.
    pub fn classify(center: (f64, f64)) -> Self {
        const TOL: f64 = 1e-6;
        let (x, y) = center;
        if x.abs() < TOL {
            BoundaryTag::Inflow
        } else if y.abs() < TOL {
            BoundaryTag::Bottom
        } else {
            BoundaryTag::Outflow
        }
    }
}

impl fmt::Display for BoundaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.id())
    }
}
