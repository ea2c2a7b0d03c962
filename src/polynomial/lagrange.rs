//! 1D Lagrange interpolation polynomials on a fixed set of support points.

/// Lagrange basis ℓ_0..ℓ_N through distinct support points x_0..x_N.
///
/// ℓ_i(x_j) = δ_ij, so nodal values are the expansion coefficients.
#[derive(Clone, Debug)]
pub struct LagrangeBasis1D {
    points: Vec<f64>,
    /// 1 / Π_{k≠i} (x_i - x_k)
    denominators: Vec<f64>,
}

impl LagrangeBasis1D {
    /// Build the basis for the given support points.
    ///
    /// # Panics
    /// Panics if two support points coincide.
    pub fn new(points: &[f64]) -> Self {
        let denominators = points
            .iter()
            .enumerate()
            .map(|(i, &xi)| {
                let prod: f64 = points
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != i)
                    .map(|(_, &xk)| xi - xk)
                    .product();
                assert!(prod != 0.0, "Lagrange support points must be distinct");
                1.0 / prod
            })
            .collect();

        Self {
            points: points.to_vec(),
            denominators,
        }
    }

    /// Number of basis functions.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Support points.
    #[inline]
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// ℓ_i(x)
    pub fn value(&self, i: usize, x: f64) -> f64 {
        let prod: f64 = self
            .points
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != i)
            .map(|(_, &xk)| x - xk)
            .product();
        prod * self.denominators[i]
    }

    /// ℓ'_i(x), by the product rule over the factors of the numerator.
    pub fn derivative(&self, i: usize, x: f64) -> f64 {
        let n = self.points.len();
        let mut sum = 0.0;
        for m in 0..n {
            if m == i {
                continue;
            }
            let mut prod = 1.0;
            for k in 0..n {
                if k != i && k != m {
                    prod *= x - self.points[k];
                }
            }
            sum += prod;
        }
        sum * self.denominators[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::gauss_lobatto_nodes;

    #[test]
    fn test_kronecker_property() {
        let nodes = gauss_lobatto_nodes(4);
        let basis = LagrangeBasis1D::new(&nodes);
        for i in 0..basis.len() {
            for (j, &xj) in nodes.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((basis.value(i, xj) - expected).abs() < 1e-13);
            }
        }
    }

    #[test]
    fn test_partition_of_unity() {
        let basis = LagrangeBasis1D::new(&gauss_lobatto_nodes(3));
        for &x in &[-0.9, -0.2, 0.4, 0.75] {
            let sum: f64 = (0..basis.len()).map(|i| basis.value(i, x)).sum();
            let dsum: f64 = (0..basis.len()).map(|i| basis.derivative(i, x)).sum();
            assert!((sum - 1.0).abs() < 1e-13);
            assert!(dsum.abs() < 1e-12);
        }
    }

    #[test]
    fn test_reproduces_polynomial_derivative() {
        // Interpolating x^3 with 4 points is exact, so is its derivative
        let nodes = gauss_lobatto_nodes(3);
        let basis = LagrangeBasis1D::new(&nodes);
        let x = 0.37;
        let d: f64 = nodes
            .iter()
            .enumerate()
            .map(|(i, &xi)| xi.powi(3) * basis.derivative(i, x))
            .sum();
        assert!((d - 3.0 * x * x).abs() < 1e-12);
    }

    #[test]
    fn test_linear_basis() {
        let basis = LagrangeBasis1D::new(&[-1.0, 1.0]);
        assert!((basis.value(0, 0.0) - 0.5).abs() < 1e-15);
        assert!((basis.derivative(0, 0.3) + 0.5).abs() < 1e-15);
        assert!((basis.derivative(1, -0.7) - 0.5).abs() < 1e-15);
    }
}
