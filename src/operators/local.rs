//! Per-cell stiffness and lifting operators.
//!
//! For each cell the builder integrates
//!
//! - mass:            M[i][j] = ∫ φ_i φ_j
//! - differentiation: D[i][j] = ∫ (∇φ_i · v) φ_j
//! - face flux:       F_f[i][j] = ∮_f φ_i φ_j, i and j both on face f
//!
//! and stores S = M⁻¹D and L_f = M⁻¹F_f. The wind is static, so v · n at
//! every face dof is evaluated here once and kept next to the operators.

use std::fmt::Write as _;
use std::time::Instant;

use faer::{Mat, linalg::solvers::Solve};
use tracing::{debug, info};

use super::FaceDofMap;
use crate::basis::{CellValues, FaceValues, LagrangeBasis2D, face_reference_point};
use crate::equations::WindField;
use crate::error::AssemblyError;
use crate::mesh::{CellGeometry, FACE_NORMALS, FACES_PER_CELL, Mesh2D};

/// Largest tolerated entry of |M M⁻¹ - I|.
const INVERSE_RESIDUAL_TOL: f64 = 1e-8;

/// Operators of one cell.
#[derive(Clone, Debug)]
pub struct CellOperators {
    /// S = M⁻¹D, shape (n_dofs, n_dofs)
    pub stiffness: Mat<f64>,
    /// L_f = M⁻¹F_f for faces 0..4, shape (n_dofs, n_dofs)
    pub lifting: [Mat<f64>; 4],
    /// v · n_f at the face dofs, in face-local order
    pub normal_velocity: [Vec<f64>; 4],
    /// ∫ φ_i over the cell (row sums of M)
    pub basis_integrals: Vec<f64>,
}

/// Write-once arena of cell operators, indexed by cell id.
#[derive(Clone, Debug)]
pub struct OperatorStore {
    face_map: FaceDofMap,
    cells: Vec<CellOperators>,
}

impl OperatorStore {
    #[inline]
    pub fn cell(&self, k: usize) -> &CellOperators {
        &self.cells[k]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn face_map(&self) -> &FaceDofMap {
        &self.face_map
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.face_map.order()
    }

    #[inline]
    pub fn n_dofs_per_cell(&self) -> usize {
        self.face_map.dofs_per_cell()
    }

    /// Stiffness and lifting matrices of cell k as text.
    pub fn describe_cell(&self, k: usize) -> String {
        let ops = &self.cells[k];
        let mut out = String::new();
        let _ = writeln!(out, "Stiffness matrix (cell {k}):");
        write_matrix(&mut out, &ops.stiffness);
        for (face, lift) in ops.lifting.iter().enumerate() {
            let _ = writeln!(out, "Lifting matrix (cell {k}, face {face}):");
            write_matrix(&mut out, lift);
        }
        out
    }

    /// Log the stiffness and lifting matrices of cell k.
    pub fn print_matrices(&self, k: usize) {
        for line in self.describe_cell(k).lines() {
            info!("{line}");
        }
    }
}

fn write_matrix(out: &mut String, m: &Mat<f64>) {
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            let _ = write!(out, "{:>13.5e}", m[(i, j)]);
        }
        out.push('\n');
    }
}

/// Builds [`CellOperators`] for every cell of a mesh.
#[derive(Clone, Debug)]
pub struct LocalOperatorBuilder {
    basis: LagrangeBasis2D,
    face_map: FaceDofMap,
}

impl LocalOperatorBuilder {
    pub fn new(order: usize) -> Self {
        Self {
            basis: LagrangeBasis2D::new(order),
            face_map: FaceDofMap::new(order),
        }
    }

    #[inline]
    pub fn basis(&self) -> &LagrangeBasis2D {
        &self.basis
    }

    #[inline]
    pub fn face_map(&self) -> &FaceDofMap {
        &self.face_map
    }

    /// Elemental mass matrix on the cell `cv` was last reinitialized for.
    pub fn mass_matrix(&self, cv: &CellValues) -> Mat<f64> {
        let n = self.basis.n_dofs;
        let mut m = Mat::zeros(n, n);
        for q in 0..cv.n_quadrature_points() {
            let jxw = cv.jxw(q);
            for i in 0..n {
                let phi_i = cv.shape_value(i, q) * jxw;
                for j in 0..n {
                    m[(i, j)] += phi_i * cv.shape_value(j, q);
                }
            }
        }
        m
    }

    /// Elemental differentiation matrix D[i][j] = ∫ (∇φ_i · v) φ_j.
    pub fn differentiation_matrix<W: WindField + ?Sized>(
        &self,
        cv: &CellValues,
        wind: &W,
    ) -> Mat<f64> {
        let n = self.basis.n_dofs;
        let mut d = Mat::zeros(n, n);
        for q in 0..cv.n_quadrature_points() {
            let (x, y) = cv.quadrature_point(q);
            let (vx, vy) = wind.velocity(x, y);
            let jxw = cv.jxw(q);
            for i in 0..n {
                let (gx, gy) = cv.shape_grad(i, q);
                let grad_dot_v = (gx * vx + gy * vy) * jxw;
                for j in 0..n {
                    d[(i, j)] += grad_dot_v * cv.shape_value(j, q);
                }
            }
        }
        d
    }

    /// Face flux matrix of the face `fv` was last reinitialized for.
    ///
    /// Only the face-dof block is populated.
    pub fn face_flux_matrix(&self, fv: &FaceValues) -> Mat<f64> {
        let n = self.basis.n_dofs;
        let face = fv.face();
        let mut f = Mat::zeros(n, n);
        for q in 0..fv.n_quadrature_points() {
            let jxw = fv.jxw(q);
            for a in 0..self.face_map.dofs_per_face() {
                let i = self.face_map.cell_dof(face, a);
                let phi_i = fv.shape_value(i, q) * jxw;
                for b in 0..self.face_map.dofs_per_face() {
                    let j = self.face_map.cell_dof(face, b);
                    f[(i, j)] += phi_i * fv.shape_value(j, q);
                }
            }
        }
        f
    }

    /// Build the operators of one cell.
    ///
    /// `cv` and `fv` are scratch tables for this builder's basis.
    pub fn build_cell<W: WindField + ?Sized>(
        &self,
        cell: usize,
        geom: &CellGeometry,
        wind: &W,
        cv: &mut CellValues,
        fv: &mut FaceValues,
    ) -> Result<CellOperators, AssemblyError> {
        cv.reinit(geom);
        let mass = self.mass_matrix(cv);
        let diff = self.differentiation_matrix(cv, wind);
        let mass_inv = invert_mass_matrix(cell, &mass)?;

        let stiffness = mat_mul(&mass_inv, &diff);

        let lifting = std::array::from_fn(|face| {
            fv.reinit(geom, face);
            mat_mul(&mass_inv, &self.face_flux_matrix(fv))
        });

        // Sampled on the face itself: at p = 0 the only support point is the
        // cell center, not a face point
        let nodes = self.basis.nodes_1d();
        let normal_velocity = std::array::from_fn(|face| {
            (0..self.face_map.dofs_per_face())
                .map(|k| {
                    let (r, s) = face_reference_point(face, nodes[k]);
                    let (x, y) = geom.map(r, s);
                    wind.normal_velocity(x, y, FACE_NORMALS[face])
                })
                .collect()
        });

        let basis_integrals = (0..mass.nrows())
            .map(|i| (0..mass.ncols()).map(|j| mass[(i, j)]).sum())
            .collect();

        Ok(CellOperators {
            stiffness,
            lifting,
            normal_velocity,
            basis_integrals,
        })
    }

    /// Assemble the operator store for every cell of `mesh`.
    ///
    /// Topology is validated first; on any error no store is returned.
    pub fn assemble<W: WindField + ?Sized>(
        &self,
        mesh: &Mesh2D,
        wind: &W,
    ) -> Result<OperatorStore, AssemblyError> {
        mesh.validate_topology()?;
        let start = Instant::now();

        let mut cv = CellValues::new(&self.basis);
        let mut fv = FaceValues::new(&self.basis);
        let cells = (0..mesh.n_elements)
            .map(|k| self.build_cell(k, &mesh.cell_geometry(k), wind, &mut cv, &mut fv))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            n_cells = cells.len(),
            order = self.basis.order,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "assembled local operators"
        );

        Ok(OperatorStore {
            face_map: self.face_map,
            cells,
        })
    }

    /// Parallel version of [`LocalOperatorBuilder::assemble`].
    ///
    /// Cells are independent, so this yields the same store.
    #[cfg(feature = "parallel")]
    pub fn assemble_parallel<W: WindField + ?Sized>(
        &self,
        mesh: &Mesh2D,
        wind: &W,
    ) -> Result<OperatorStore, AssemblyError> {
        use rayon::prelude::*;

        mesh.validate_topology()?;
        let start = Instant::now();

        let cells = (0..mesh.n_elements)
            .into_par_iter()
            .map_init(
                || (CellValues::new(&self.basis), FaceValues::new(&self.basis)),
                |(cv, fv), k| self.build_cell(k, &mesh.cell_geometry(k), wind, cv, fv),
            )
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            n_cells = cells.len(),
            order = self.basis.order,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "assembled local operators (parallel)"
        );

        Ok(OperatorStore {
            face_map: self.face_map,
            cells,
        })
    }
}

/// Invert an elemental mass matrix, rejecting matrices that are not
/// symmetric positive-definite in practice.
pub fn invert_mass_matrix(cell: usize, mass: &Mat<f64>) -> Result<Mat<f64>, AssemblyError> {
    let n = mass.nrows();
    let fail = |reason: String| AssemblyError::Configuration { cell, reason };

    let mut scale: f64 = 0.0;
    for i in 0..n {
        for j in 0..n {
            let v = mass[(i, j)];
            if !v.is_finite() {
                return Err(fail(format!("non-finite entry at ({i}, {j})")));
            }
            scale = scale.max(v.abs());
        }
    }
    for i in 0..n {
        let d = mass[(i, i)];
        if d <= 0.0 {
            return Err(fail(format!("non-positive diagonal entry {d:e} at row {i}")));
        }
        for j in (i + 1)..n {
            if (mass[(i, j)] - mass[(j, i)]).abs() > 1e-12 * scale {
                return Err(fail(format!("asymmetric at ({i}, {j})")));
            }
        }
    }

    let lu = mass.as_ref().full_piv_lu();
    let mut inv = Mat::zeros(n, n);

    // Solve M * M_inv = I column by column
    for col in 0..n {
        let mut rhs = Mat::zeros(n, 1);
        rhs[(col, 0)] = 1.0;
        let solution = lu.solve(&rhs);
        for row in 0..n {
            inv[(row, col)] = solution[(row, 0)];
        }
    }

    let product = mat_mul(mass, &inv);
    let mut residual: f64 = 0.0;
    for i in 0..n {
        for j in 0..n {
            let target = if i == j { 1.0 } else { 0.0 };
            residual = residual.max((product[(i, j)] - target).abs());
        }
    }
    if residual.is_nan() || residual >= INVERSE_RESIDUAL_TOL {
        return Err(fail(format!("numerically singular (|MM⁻¹ - I| = {residual:e})")));
    }
    debug!(cell, residual, "inverted mass matrix");

    Ok(inv)
}

/// Dense product a * b.
fn mat_mul(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let mut c = Mat::zeros(a.nrows(), b.ncols());
    for i in 0..a.nrows() {
        for k in 0..a.ncols() {
            let a_ik = a[(i, k)];
            if a_ik == 0.0 {
                continue;
            }
            for j in 0..b.ncols() {
                c[(i, j)] += a_ik * b[(k, j)];
            }
        }
    }
    c
}
