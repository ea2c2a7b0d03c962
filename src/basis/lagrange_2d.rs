//! Tensor-product Lagrange basis on the reference square [-1, 1]².
//!
//! φ_k(r, s) = ℓ_i(r) ℓ_j(s) with k = i + (p+1) j, where ℓ are the 1D
//! Lagrange polynomials through the GLL points. Node k therefore sits at
//! (r_i, s_j), and the nodes on each edge of the square are exactly the p+1
//! nodes with i = 0, i = p, j = 0 or j = p.

use crate::polynomial::{
    LagrangeBasis1D, gauss_lobatto_nodes, node_index_1d_to_2d, node_index_2d_to_1d,
};

/// Nodal Q_p basis for quadrilaterals.
#[derive(Clone, Debug)]
pub struct LagrangeBasis2D {
    /// Polynomial order
    pub order: usize,
    /// order + 1
    pub n_1d: usize,
    /// (order + 1)²
    pub n_dofs: usize,
    basis_1d: LagrangeBasis1D,
}

impl LagrangeBasis2D {
    pub fn new(order: usize) -> Self {
        let n_1d = order + 1;
        Self {
            order,
            n_1d,
            n_dofs: n_1d * n_1d,
            basis_1d: LagrangeBasis1D::new(&gauss_lobatto_nodes(order)),
        }
    }

    /// 1D support points.
    #[inline]
    pub fn nodes_1d(&self) -> &[f64] {
        self.basis_1d.points()
    }

    /// Reference support point of dof k.
    pub fn support_point(&self, k: usize) -> (f64, f64) {
        let (i, j) = node_index_2d_to_1d(k, self.n_1d);
        let nodes = self.basis_1d.points();
        (nodes[i], nodes[j])
    }

    /// Dof sitting at 1D node indices (i, j).
    #[inline]
    pub fn dof_at(&self, i: usize, j: usize) -> usize {
        node_index_1d_to_2d(i, j, self.n_1d)
    }

    /// φ_k(r, s)
    pub fn value(&self, k: usize, r: f64, s: f64) -> f64 {
        let (i, j) = node_index_2d_to_1d(k, self.n_1d);
        self.basis_1d.value(i, r) * self.basis_1d.value(j, s)
    }

    /// (∂φ_k/∂r, ∂φ_k/∂s)
    pub fn gradient(&self, k: usize, r: f64, s: f64) -> (f64, f64) {
        let (i, j) = node_index_2d_to_1d(k, self.n_1d);
        let (li, lj) = (self.basis_1d.value(i, r), self.basis_1d.value(j, s));
        (
            self.basis_1d.derivative(i, r) * lj,
            li * self.basis_1d.derivative(j, s),
        )
    }
}
