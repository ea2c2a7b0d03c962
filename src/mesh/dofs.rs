//! Degree-of-freedom numbering for a DG discretization.
//!
//! DG dofs are never shared between cells, so cell k owns the contiguous
//! block k * n_dofs_per_cell .. (k + 1) * n_dofs_per_cell. Within a cell the
//! local order is the tensor-product node order of [`crate::basis`].

use super::Mesh2D;
use crate::polynomial::{gauss_lobatto_nodes, node_index_2d_to_1d};

/// Per-cell global dof indices and dof support points.
#[derive(Clone, Debug)]
pub struct DofHandler {
    /// Polynomial order
    pub order: usize,
    /// (order + 1)²
    pub n_dofs_per_cell: usize,
    /// Total number of dofs
    pub n_dofs: usize,
    /// indices[k * n_dofs_per_cell + i] = global index of local dof i of cell k
    indices: Vec<usize>,
    /// Physical location of every global dof
    support_points: Vec<(f64, f64)>,
}

impl DofHandler {
    /// Distribute dofs of order `order` over every cell of `mesh`.
    pub fn new(mesh: &Mesh2D, order: usize) -> Self {
        let n_1d = order + 1;
        let n_dofs_per_cell = n_1d * n_1d;
        let n_dofs = mesh.n_elements * n_dofs_per_cell;
        let nodes = gauss_lobatto_nodes(order);

        let indices: Vec<usize> = (0..n_dofs).collect();

        let mut support_points = Vec::with_capacity(n_dofs);
        for k in 0..mesh.n_elements {
            let geom = mesh.cell_geometry(k);
            for local in 0..n_dofs_per_cell {
                let (i, j) = node_index_2d_to_1d(local, n_1d);
                support_points.push(geom.map(nodes[i], nodes[j]));
            }
        }

        Self {
            order,
            n_dofs_per_cell,
            n_dofs,
            indices,
            support_points,
        }
    }

    /// Number of cells covered.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_dofs / self.n_dofs_per_cell
    }

    /// Ordered global dof indices of cell k.
    #[inline]
    pub fn cell_dof_indices(&self, k: usize) -> &[usize] {
        let start = k * self.n_dofs_per_cell;
        &self.indices[start..start + self.n_dofs_per_cell]
    }

    /// Physical coordinates of every dof, indexed by global dof.
    #[inline]
    pub fn support_points(&self) -> &[(f64, f64)] {
        &self.support_points
    }

    /// Sample `f` at every dof location.
    pub fn interpolate<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.support_points.iter().map(|&(x, y)| f(x, y)).collect()
    }
}
