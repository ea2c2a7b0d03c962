//! Polynomial evaluation, nodes and quadrature rules.
//!
//! This module provides:
//! - Legendre polynomials and the Gauss-Legendre rule (cell and face quadrature)
//! - Gauss-Lobatto-Legendre (GLL) points (Lagrange support points)
//! - 1D Lagrange basis polynomials

mod lagrange;
mod legendre;
mod nodes;

pub use lagrange::LagrangeBasis1D;
pub use legendre::{gauss_legendre, legendre, legendre_and_derivative};
pub use nodes::{gauss_lobatto_nodes, gauss_lobatto_weights};

/// Tensor-product node index: k = j * n_1d + i (i along x fastest).
#[inline]
pub fn node_index_1d_to_2d(i: usize, j: usize, n_1d: usize) -> usize {
    j * n_1d + i
}

/// Inverse of [`node_index_1d_to_2d`]: k -> (i, j).
#[inline]
pub fn node_index_2d_to_1d(k: usize, n_1d: usize) -> (usize, usize) {
    (k % n_1d, k / n_1d)
}
