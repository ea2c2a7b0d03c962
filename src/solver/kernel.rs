//! Explicit update kernel for 2D DG advection.
//!
//! Per cell c the semi-discrete right-hand side is
//!
//!   R_c = S_c u_c - Σ_f L_{c,f} F*_{c,f}
//!
//! where F*_{c,f} is the upwind flux vector of face f along c's outward
//! normal. An interior face's flux is computed once by its owner and enters
//! the neighbor with the opposite sign. A forward Euler step is
//! u_new = u_old + dt R(u_old).

use faer::Mat;

use crate::boundary::BoundaryTable;
use crate::error::TopologyError;
use crate::flux::{FaceFluxEvaluator, FaceRole, FaceTable};
use crate::mesh::{DofHandler, FACES_PER_CELL, Mesh2D};
use crate::operators::{FaceDofMap, OperatorStore};
use crate::solver::GlobalSolution;

/// Update kernel over a validated mesh and an assembled operator store.
pub struct UpdateKernel<'a> {
    store: &'a OperatorStore,
    dofs: &'a DofHandler,
    boundary: &'a BoundaryTable,
    faces: FaceTable,
}

impl<'a> UpdateKernel<'a> {
    /// Resolve face roles and bind the kernel to its operators.
    ///
    /// `store` and `dofs` must come from the same mesh and order.
    pub fn new(
        mesh: &Mesh2D,
        dofs: &'a DofHandler,
        store: &'a OperatorStore,
        boundary: &'a BoundaryTable,
    ) -> Result<Self, TopologyError> {
        debug_assert_eq!(store.len(), mesh.n_elements);
        debug_assert_eq!(dofs.n_cells(), mesh.n_elements);
        debug_assert_eq!(store.n_dofs_per_cell(), dofs.n_dofs_per_cell);

        Ok(Self {
            store,
            dofs,
            boundary,
            faces: FaceTable::new(mesh)?,
        })
    }

    #[inline]
    pub fn face_table(&self) -> &FaceTable {
        &self.faces
    }

    #[inline]
    pub fn evaluator(&self) -> FaceFluxEvaluator<'a> {
        FaceFluxEvaluator::new(self.store, self.dofs, self.boundary)
    }

    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.dofs.n_dofs
    }

    /// Write R(old) into `rhs`.
    pub fn evaluate_rhs(&self, old: &[f64], rhs: &mut [f64]) {
        debug_assert_eq!(old.len(), rhs.len());

        let map = self.store.face_map();
        let eval = self.evaluator();
        let n_dofs = map.dofs_per_cell();
        let mut u_local = vec![0.0; n_dofs];
        let mut flux = vec![0.0; map.dofs_per_face()];

        rhs.fill(0.0);

        for cell in 0..self.faces.n_cells() {
            let idx = self.dofs.cell_dof_indices(cell);
            let ops = self.store.cell(cell);

            for (u, &g) in u_local.iter_mut().zip(idx) {
                *u = old[g];
            }
            for i in 0..n_dofs {
                rhs[idx[i]] += apply_row(&ops.stiffness, i, &u_local);
            }

            for face in 0..FACES_PER_CELL {
                match self.faces.role(cell, face) {
                    FaceRole::Owner { neighbor, .. } => {
                        eval.interior_flux(old, cell, face, neighbor, &mut flux);
                        for i in 0..n_dofs {
                            rhs[idx[i]] -= lift_row(&ops.lifting[face], map, face, i, &flux);
                        }
                        // Same flux, opposite normal
                        let n_idx = self.dofs.cell_dof_indices(neighbor.element);
                        let n_lift = &self.store.cell(neighbor.element).lifting[neighbor.face];
                        for i in 0..n_dofs {
                            rhs[n_idx[i]] += lift_row(n_lift, map, neighbor.face, i, &flux);
                        }
                    }
                    FaceRole::Boundary { tag, .. } => {
                        eval.boundary_flux(old, cell, face, tag, &mut flux);
                        for i in 0..n_dofs {
                            rhs[idx[i]] -= lift_row(&ops.lifting[face], map, face, i, &flux);
                        }
                    }
                    // Handled by the owner
                    FaceRole::Neighbor { .. } => {}
                }
            }
        }
    }

    /// One forward Euler step of size `dt`; the solution's buffers are swapped.
    ///
    /// No stability check is made on `dt`.
    pub fn step(&self, solution: &mut GlobalSolution, dt: f64) {
        let (old, new) = solution.buffers_mut();
        self.evaluate_rhs(old, new);
        for (n, &o) in new.iter_mut().zip(old) {
            *n = o + dt * *n;
        }
        solution.swap();
    }

    /// Parallel version of [`UpdateKernel::evaluate_rhs`].
    ///
    /// Phase 1 computes every slot's flux; phase 2 gathers per cell, so no
    /// two threads write the same cell.
    #[cfg(feature = "parallel")]
    pub fn evaluate_rhs_parallel(&self, old: &[f64], rhs: &mut [f64]) {
        use rayon::prelude::*;

        debug_assert_eq!(old.len(), rhs.len());

        let map = self.store.face_map();
        let eval = self.evaluator();
        let n_dofs = map.dofs_per_cell();
        let n_face = map.dofs_per_face();

        let mut fluxes = vec![0.0; self.faces.n_slots() * n_face];
        fluxes
            .par_chunks_mut(n_face)
            .enumerate()
            .for_each(|(slot, out)| eval.slot_flux(old, &self.faces, slot, out));

        // Cells own contiguous dof blocks, so chunk k is cell k
        rhs.par_chunks_mut(n_dofs)
            .enumerate()
            .for_each(|(cell, rhs_c)| {
                let idx = self.dofs.cell_dof_indices(cell);
                let ops = self.store.cell(cell);
                let u_local: Vec<f64> = idx.iter().map(|&g| old[g]).collect();

                for (i, r) in rhs_c.iter_mut().enumerate() {
                    *r = apply_row(&ops.stiffness, i, &u_local);
                }
                for face in 0..FACES_PER_CELL {
                    let role = self.faces.role(cell, face);
                    let start = role.slot() * n_face;
                    let flux = &fluxes[start..start + n_face];
                    let sign = role.sign();
                    for (i, r) in rhs_c.iter_mut().enumerate() {
                        *r -= sign * lift_row(&ops.lifting[face], map, face, i, flux);
                    }
                }
            });
    }

    /// Parallel version of [`UpdateKernel::step`].
    #[cfg(feature = "parallel")]
    pub fn step_parallel(&self, solution: &mut GlobalSolution, dt: f64) {
        use rayon::prelude::*;

        let (old, new) = solution.buffers_mut();
        self.evaluate_rhs_parallel(old, new);
        new.par_iter_mut()
            .zip(old.par_iter())
            .for_each(|(n, &o)| *n = o + dt * *n);
        solution.swap();
    }
}

/// (S u)_i
#[inline]
fn apply_row(s: &Mat<f64>, i: usize, u: &[f64]) -> f64 {
    u.iter().enumerate().map(|(j, &uj)| s[(i, j)] * uj).sum()
}

/// (L_f F*)_i; only the face columns of L_f are non-zero.
#[inline]
fn lift_row(lift: &Mat<f64>, map: &FaceDofMap, face: usize, i: usize, flux: &[f64]) -> f64 {
    flux.iter()
        .enumerate()
        .map(|(k, &fk)| lift[(i, map.cell_dof(face, k))] * fk)
        .sum()
}

/// Stable time step estimate for forward Euler / SSP-RK3.
///
/// Uses dt = CFL * h_min / (|v|_max * (2p + 1)).
pub fn compute_dt_advection_2d(mesh: &Mesh2D, max_speed: f64, order: usize, cfl: f64) -> f64 {
    if max_speed < 1e-14 {
        return f64::INFINITY;
    }
    let dg_factor = 2.0 * order as f64 + 1.0;
    cfl * mesh.h_min() / (max_speed * dg_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{CellularWind, UniformWind, WindField};
    use crate::operators::LocalOperatorBuilder;
    use crate::solver::total_mass;

    struct Setup {
        mesh: Mesh2D,
        dofs: DofHandler,
        store: OperatorStore,
        boundary: BoundaryTable,
    }

    fn setup<W: WindField>(n: usize, order: usize, wind: &W) -> Setup {
        let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n);
        mesh.set_boundary_ids();
        let dofs = DofHandler::new(&mesh, order);
        let store = LocalOperatorBuilder::new(order)
            .assemble(&mesh, wind)
            .expect("assembly should succeed");
        Setup {
            mesh,
            dofs,
            store,
            boundary: BoundaryTable::default(),
        }
    }

    #[test]
    fn test_order_zero_rhs_is_divergence_of_wind() {
        // Piecewise constants: R_c = -(1/|c|) ∮ v·n φ, with v·n taken on the faces
        let wind = |x: f64, _y: f64| (1.0 + x, 0.0);
        let s = setup(4, 0, &wind);
        let kernel = UpdateKernel::new(&s.mesh, &s.dofs, &s.store, &s.boundary).unwrap();

        let old = vec![1.0; s.dofs.n_dofs];
        let mut rhs = vec![0.0; s.dofs.n_dofs];
        kernel.evaluate_rhs(&old, &mut rhs);
        assert_eq!(rhs.len(), 16);
        for (c, r) in rhs.iter().enumerate() {
            assert!((r + 1.0).abs() < 1e-12, "cell {c}: {r}");
        }
    }

    #[test]
    fn test_constant_state_with_matching_inflow_is_steady() {
        // φ = 1 with ghost 1 on inflow: no face jumps, constant wind
        let s = setup(4, 2, &UniformWind::new(1.0, 0.0));
        let kernel = UpdateKernel::new(&s.mesh, &s.dofs, &s.store, &s.boundary).expect("valid");
        let old = vec![1.0; s.dofs.n_dofs];
        let mut rhs = vec![f64::NAN; s.dofs.n_dofs];
        kernel.evaluate_rhs(&old, &mut rhs);
        for (i, r) in rhs.iter().enumerate() {
            assert!(r.abs() < 1e-10, "rhs[{}] = {:e}", i, r);
        }
    }

    #[test]
    fn test_zero_state_feels_inflow() {
        let s = setup(4, 1, &UniformWind::new(1.0, 0.0));
        let kernel = UpdateKernel::new(&s.mesh, &s.dofs, &s.store, &s.boundary).expect("valid");
        let mut sol = GlobalSolution::new(s.dofs.n_dofs, s.dofs.n_dofs_per_cell);
        kernel.step(&mut sol, 1e-3);

        // Only cells touching x = 0 change
        for cell in 0..s.mesh.n_elements {
            let touched = sol.element(cell).iter().any(|v| v.abs() > 0.0);
            assert_eq!(touched, cell % 4 == 0, "cell {}", cell);
        }
        // Inflow node raised; the downstream node undershoots at p = 1
        assert!(sol.element(0)[0] > 0.0);
    }

    #[test]
    fn test_step_reads_only_old_level() {
        // Two steps of dt equal one evaluation at each level
        let wind = UniformWind::diagonal();
        let s = setup(3, 1, &wind);
        let kernel = UpdateKernel::new(&s.mesh, &s.dofs, &s.store, &s.boundary).expect("valid");
        let u0 = s.dofs.interpolate(|x, y| (3.0 * x).sin() + y * y);

        let mut sol = GlobalSolution::from_values(u0.clone(), s.dofs.n_dofs_per_cell);
        let dt = 2e-3;
        kernel.step(&mut sol, dt);

        let mut rhs = vec![0.0; u0.len()];
        kernel.evaluate_rhs(&u0, &mut rhs);
        for ((&v, &o), &r) in sol.values().iter().zip(&u0).zip(&rhs) {
            assert!((v - (o + dt * r)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_mass_conserved_for_tangential_wind() {
        let wind = CellularWind::new(1.0);
        let s = setup(8, 2, &wind);
        let kernel = UpdateKernel::new(&s.mesh, &s.dofs, &s.store, &s.boundary).expect("valid");
        let u0 = s.dofs.interpolate(|x, y| 1.0 + (-20.0 * ((x - 0.4).powi(2) + (y - 0.6).powi(2))).exp());
        let mut sol = GlobalSolution::from_values(u0, s.dofs.n_dofs_per_cell);

        let m0 = total_mass(&s.store, &s.dofs, sol.values());
        for _ in 0..20 {
            kernel.step(&mut sol, 2e-3);
        }
        let m1 = total_mass(&s.store, &s.dofs, sol.values());
        assert!(
            ((m1 - m0) / m0).abs() < 1e-12,
            "mass drifted from {} to {}",
            m0,
            m1
        );
    }

    #[test]
    fn test_dt_computation() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4);
        let dt = compute_dt_advection_2d(&mesh, 1.0, 1, 0.3);
        assert!((dt - 0.3 * 0.25 / 3.0).abs() < 1e-15);
        assert!(compute_dt_advection_2d(&mesh, 1.0, 3, 0.3) < dt);
        assert_eq!(compute_dt_advection_2d(&mesh, 0.0, 1, 0.3), f64::INFINITY);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let wind = |x: f64, y: f64| (0.5 + y, 0.25 - x);
        let s = setup(6, 2, &wind);
        let kernel = UpdateKernel::new(&s.mesh, &s.dofs, &s.store, &s.boundary).expect("valid");
        let u0 = s.dofs.interpolate(|x, y| (x * 5.0).cos() * y);

        let mut serial = vec![0.0; u0.len()];
        let mut parallel = vec![0.0; u0.len()];
        kernel.evaluate_rhs(&u0, &mut serial);
        kernel.evaluate_rhs_parallel(&u0, &mut parallel);
        for (a, b) in serial.iter().zip(&parallel) {
            assert!((a - b).abs() < 1e-11 * (1.0 + a.abs()));
        }
    }
}
