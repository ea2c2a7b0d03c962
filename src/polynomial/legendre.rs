//! Legendre polynomials and the Gauss-Legendre quadrature rule.
//!
//! P_n is evaluated with the three-term recurrence
//! (n+1) P_{n+1}(x) = (2n+1) x P_n(x) - n P_{n-1}(x),
//! which also yields P_{n-1} for the derivative identity
//! P'_n(x) = n (x P_n(x) - P_{n-1}(x)) / (x² - 1).

use std::f64::consts::PI;

/// Evaluate the Legendre polynomial P_n(x).
pub fn legendre(n: usize, x: f64) -> f64 {
    legendre_and_derivative(n, x).0
}

/// Evaluate P_n(x) and P'_n(x) with a single recurrence sweep.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    match n {
        0 => return (1.0, 0.0),
        1 => return (x, 1.0),
        _ => {}
    }

    let mut p_prev = 1.0;
    let mut p_curr = x;
    for k in 1..n {
        let p_next = ((2 * k + 1) as f64 * x * p_curr - k as f64 * p_prev) / (k + 1) as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }

    let nf = n as f64;
    let dp = if (x - 1.0).abs() < 1e-14 {
        nf * (nf + 1.0) / 2.0
    } else if (x + 1.0).abs() < 1e-14 {
        let sign = if n % 2 == 0 { -1.0 } else { 1.0 };
        sign * nf * (nf + 1.0) / 2.0
    } else {
        nf * (x * p_curr - p_prev) / (x * x - 1.0)
    };

    (p_curr, dp)
}

/// Gauss-Legendre quadrature with `n_points` points on [-1, 1].
///
/// Exact for polynomials of degree `2 * n_points - 1`. Nodes are returned in
/// ascending order together with their weights w_j = 2 / ((1 - x_j²) P'_n(x_j)²).
pub fn gauss_legendre(n_points: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(n_points > 0, "Gauss-Legendre rule needs at least one point");

    let n = n_points;
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];

    // Roots are symmetric; solve for the upper half and mirror.
    for i in 0..n.div_ceil(2) {
        // Tricomi initial guess, descending from the largest root
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();

        for _ in 0..100 {
            let (p, dp) = legendre_and_derivative(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }

        let (_, dp) = legendre_and_derivative(n, x);
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        nodes[n - 1 - i] = x;
        weights[n - 1 - i] = w;
        nodes[i] = -x;
        weights[i] = w;
    }

    if n % 2 == 1 {
        nodes[n / 2] = 0.0;
    }

    (nodes, weights)
}
