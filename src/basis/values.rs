//! Shape functions evaluated at cell and face quadrature points.
//!
//! Reference values are tabulated once per basis; `reinit` only rescales
//! gradients and weights for the axis-aligned cell at hand.
//!
//! Both rules are Gauss-Legendre with p + 1 points per direction, which
//! integrates the mass and face matrices (degree 2p per direction) exactly.

use super::LagrangeBasis2D;
use crate::mesh::{CellGeometry, FACE_NORMALS};
use crate::polynomial::gauss_legendre;

/// Reference coordinates of a point on face `face` at face parameter t.
///
/// Faces are parametrized along the positive axis, matching the face dof order.
#[inline]
pub fn face_reference_point(face: usize, t: f64) -> (f64, f64) {
    match face {
        0 => (-1.0, t),
        1 => (1.0, t),
        2 => (t, -1.0),
        _ => (t, 1.0),
    }
}

/// Basis values, physical gradients and JxW at cell quadrature points.
#[derive(Clone, Debug)]
pub struct CellValues {
    n_dofs: usize,
    n_q: usize,
    ref_points: Vec<(f64, f64)>,
    ref_weights: Vec<f64>,
    /// values[q * n_dofs + i] = φ_i(q)
    values: Vec<f64>,
    /// Reference gradients, same layout as `values`
    ref_gradients: Vec<(f64, f64)>,
    gradients: Vec<(f64, f64)>,
    jxw: Vec<f64>,
    points: Vec<(f64, f64)>,
}

impl CellValues {
    pub fn new(basis: &LagrangeBasis2D) -> Self {
        let (x, w) = gauss_legendre(basis.n_1d);
        let n_1d = x.len();
        let n_q = n_1d * n_1d;
        let n_dofs = basis.n_dofs;

        let mut ref_points = Vec::with_capacity(n_q);
        let mut ref_weights = Vec::with_capacity(n_q);
        for j in 0..n_1d {
            for i in 0..n_1d {
                ref_points.push((x[i], x[j]));
                ref_weights.push(w[i] * w[j]);
            }
        }

        let mut values = Vec::with_capacity(n_q * n_dofs);
        let mut ref_gradients = Vec::with_capacity(n_q * n_dofs);
        for &(r, s) in &ref_points {
            for k in 0..n_dofs {
                values.push(basis.value(k, r, s));
                ref_gradients.push(basis.gradient(k, r, s));
            }
        }

        Self {
            n_dofs,
            n_q,
            ref_points,
            ref_weights,
            values,
            gradients: ref_gradients.clone(),
            ref_gradients,
            jxw: vec![0.0; n_q],
            points: vec![(0.0, 0.0); n_q],
        }
    }

    /// Map the tabulated data onto `geom`.
    pub fn reinit(&mut self, geom: &CellGeometry) {
        let det_j = geom.jacobian_det();
        let (rx, sy) = geom.inverse_jacobian();

        for q in 0..self.n_q {
            let (r, s) = self.ref_points[q];
            self.points[q] = geom.map(r, s);
            self.jxw[q] = self.ref_weights[q] * det_j;
        }
        for (g, &(dr, ds)) in self.gradients.iter_mut().zip(&self.ref_gradients) {
            *g = (dr * rx, ds * sy);
        }
    }

    #[inline]
    pub fn n_quadrature_points(&self) -> usize {
        self.n_q
    }

    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    #[inline]
    pub fn shape_value(&self, i: usize, q: usize) -> f64 {
        self.values[q * self.n_dofs + i]
    }

    /// Physical gradient (∂φ_i/∂x, ∂φ_i/∂y) at point q.
    #[inline]
    pub fn shape_grad(&self, i: usize, q: usize) -> (f64, f64) {
        self.gradients[q * self.n_dofs + i]
    }

    #[inline]
    pub fn jxw(&self, q: usize) -> f64 {
        self.jxw[q]
    }

    #[inline]
    pub fn quadrature_point(&self, q: usize) -> (f64, f64) {
        self.points[q]
    }
}

/// Basis values and JxW at the quadrature points of one face.
#[derive(Clone, Debug)]
pub struct FaceValues {
    n_dofs: usize,
    n_q: usize,
    ref_params: Vec<f64>,
    ref_weights: Vec<f64>,
    /// values[face][q * n_dofs + i]
    values: [Vec<f64>; 4],
    face: usize,
    jxw: Vec<f64>,
    points: Vec<(f64, f64)>,
}

impl FaceValues {
    pub fn new(basis: &LagrangeBasis2D) -> Self {
        let (ref_params, ref_weights) = gauss_legendre(basis.n_1d);
        let n_q = ref_params.len();
        let n_dofs = basis.n_dofs;

        let values = std::array::from_fn(|face| {
            let mut v = Vec::with_capacity(n_q * n_dofs);
            for &t in &ref_params {
                let (r, s) = face_reference_point(face, t);
                for k in 0..n_dofs {
                    v.push(basis.value(k, r, s));
                }
            }
            v
        });

        Self {
            n_dofs,
            n_q,
            ref_params,
            ref_weights,
            values,
            face: 0,
            jxw: vec![0.0; n_q],
            points: vec![(0.0, 0.0); n_q],
        }
    }

    /// Select face `face` of `geom`.
    pub fn reinit(&mut self, geom: &CellGeometry, face: usize) {
        self.face = face;
        let half_length = 0.5 * geom.face_length(face);
        for q in 0..self.n_q {
            let (r, s) = face_reference_point(face, self.ref_params[q]);
            self.points[q] = geom.map(r, s);
            self.jxw[q] = self.ref_weights[q] * half_length;
        }
    }

    #[inline]
    pub fn n_quadrature_points(&self) -> usize {
        self.n_q
    }

    #[inline]
    pub fn face(&self) -> usize {
        self.face
    }

    #[inline]
    pub fn shape_value(&self, i: usize, q: usize) -> f64 {
        self.values[self.face][q * self.n_dofs + i]
    }

    #[inline]
    pub fn jxw(&self, q: usize) -> f64 {
        self.jxw[q]
    }

    #[inline]
    pub fn quadrature_point(&self, q: usize) -> (f64, f64) {
        self.points[q]
    }

    /// Outward unit normal of the current face.
    #[inline]
    pub fn normal(&self) -> (f64, f64) {
        FACE_NORMALS[self.face]
    }
}
