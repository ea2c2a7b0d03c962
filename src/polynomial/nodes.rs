//! Gauss-Lobatto-Legendre (GLL) points.
//!
//! The N+1 GLL points are the roots of (1-x²)P'_N(x), so they contain both
//! endpoints. Using them as Lagrange support points puts exactly N+1 nodes on
//! every edge of a tensor-product quadrilateral, which is what the face dof
//! mapping relies on.

use super::legendre::{legendre, legendre_and_derivative};
use std::f64::consts::PI;

/// Compute the GLL points for polynomial order N (N+1 points, ascending).
pub fn gauss_lobatto_nodes(order: usize) -> Vec<f64> {
    let n = order;
    match n {
        0 => return vec![0.0],
        1 => return vec![-1.0, 1.0],
        _ => {}
    }

    // Chebyshev-Lobatto start values
    let mut nodes: Vec<f64> = (0..=n).map(|j| -(PI * j as f64 / n as f64).cos()).collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    // Newton on L(x) = (1-x²)P'_N(x); with the Legendre ODE L'(x) = -N(N+1)P_N(x).
    let nn1 = (n * (n + 1)) as f64;
    for x in nodes.iter_mut().take(n).skip(1) {
        for _ in 0..100 {
            let (p_n, dp_n) = legendre_and_derivative(n, *x);
            let update = (1.0 - *x * *x) * dp_n / (nn1 * p_n);
            *x += update;
            if update.abs() < 1e-15 {
                break;
            }
        }
    }

    nodes
}

/// GLL weights w_j = 2 / (N(N+1) P_N(x_j)²).
pub fn gauss_lobatto_weights(order: usize, nodes: &[f64]) -> Vec<f64> {
    if order == 0 {
        return vec![2.0];
    }
    let denom = (order * (order + 1)) as f64;
    nodes
        .iter()
        .map(|&x| {
            let p_n = legendre(order, x);
            2.0 / (denom * p_n * p_n)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_include_endpoints() {
        for order in 1..=6 {
            let nodes = gauss_lobatto_nodes(order);
            assert_eq!(nodes.len(), order + 1);
            assert!((nodes[0] + 1.0).abs() < 1e-14);
            assert!((nodes[order] - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_nodes_symmetric_and_sorted() {
        for order in 1..=6 {
            let nodes = gauss_lobatto_nodes(order);
            let n = nodes.len();
            for i in 0..n / 2 {
                assert!((nodes[i] + nodes[n - 1 - i]).abs() < 1e-14);
            }
            for pair in nodes.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn test_interior_nodes_are_roots_of_derivative() {
        for order in 2..=6 {
            let nodes = gauss_lobatto_nodes(order);
            for &x in &nodes[1..order] {
                let (_, dp) = legendre_and_derivative(order, x);
                assert!(dp.abs() < 1e-12, "P'_{}({}) = {}", order, x, dp);
            }
        }
    }

    #[test]
    fn test_known_order_two() {
        let nodes = gauss_lobatto_nodes(2);
        let weights = gauss_lobatto_weights(2, &nodes);
        assert!(nodes[1].abs() < 1e-14);
        assert!((weights[0] - 1.0 / 3.0).abs() < 1e-14);
        assert!((weights[1] - 4.0 / 3.0).abs() < 1e-14);
        assert!((weights[2] - 1.0 / 3.0).abs() < 1e-14);
    }

    #[test]
    fn test_weights_sum_to_interval_length() {
        for order in 0..=6 {
            let nodes = gauss_lobatto_nodes(order);
            let sum: f64 = gauss_lobatto_weights(order, &nodes).iter().sum();
            assert!((sum - 2.0).abs() < 1e-13);
        }
    }
}
