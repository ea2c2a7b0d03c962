//! End-to-end driver for the 2D advection problem.
//!
//! The usual sequence is
//!
//! ```text
//! setup_system -> set_boundary_ids -> assemble_system -> set_initial_condition -> run -> output
//! ```
//!
//! Assembly validates the mesh, so boundary ids must be set first. Calling a
//! step before its prerequisite returns [`ProblemError::OutOfOrder`].

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::boundary::BoundaryTable;
use crate::equations::{WindField, max_wind_speed};
use crate::error::{ConfigError, ProblemError};
use crate::io::{write_vtk_scalar, write_vtk_series};
use crate::mesh::{DofHandler, Mesh2D};
use crate::operators::{LocalOperatorBuilder, OperatorStore};
use crate::solver::{
    AdvectionDiagnostics, DiagnosticsTracker, GlobalSolution, ProgressReporter, UpdateKernel,
    compute_dt_advection_2d,
};
use crate::time::{MarchOutcome, StandardIntegrator, TimeStepper, run_advection_2d};

/// Deepest uniform refinement accepted (2^10 cells per direction).
pub const MAX_REFINEMENT: u32 = 10;

/// Configuration for an advection run.
#[derive(Clone, Debug)]
pub struct ProblemConfig {
    /// Polynomial order p (≥ 1)
    pub order: usize,
    /// 2^refinement cells in each direction
    pub refinement: u32,
    /// Domain [x0, x1] × [y0, y1]
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    /// CFL number for the time step estimate
    pub cfl: f64,
    /// Absolute end time of the simulation, counted from the initial condition
    pub t_final: f64,
    pub integrator: StandardIntegrator,
    /// Write a frame every N steps
    pub output_interval: Option<usize>,
    /// Base path of the frame series, `<dir>/<stem>`
    pub output_base: PathBuf,
    /// Use the rayon assembly and kernel (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            order: 1,
            refinement: 5,
            x0: 0.0,
            x1: 1.0,
            y0: 0.0,
            y1: 1.0,
            cfl: 0.3,
            t_final: 2.0,
            integrator: StandardIntegrator::ForwardEuler,
            output_interval: None,
            output_base: PathBuf::from("solution"),
            parallel: false,
        }
    }
}

impl ProblemConfig {
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn with_refinement(mut self, refinement: u32) -> Self {
        self.refinement = refinement;
        self
    }

    pub fn with_domain(mut self, x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        self.x0 = x0;
        self.x1 = x1;
        self.y0 = y0;
        self.y1 = y1;
        self
    }

    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    pub fn with_final_time(mut self, t_final: f64) -> Self {
        self.t_final = t_final;
        self
    }

    pub fn with_integrator(mut self, integrator: StandardIntegrator) -> Self {
        self.integrator = integrator;
        self
    }

    /// Write `<base>_NNNN.vtu` every `interval` steps.
    pub fn with_output(mut self, interval: usize, base: impl Into<PathBuf>) -> Self {
        self.output_interval = Some(interval);
        self.output_base = base.into();
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Cells per direction.
    pub fn cells_per_direction(&self) -> usize {
        1usize << self.refinement
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.order < 1 {
            return Err(ConfigError::InvalidOrder(self.order));
        }
        if self.refinement > MAX_REFINEMENT {
            return Err(ConfigError::RefinementTooDeep(self.refinement));
        }
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(ConfigError::InvalidCfl(self.cfl));
        }
        if !(self.t_final.is_finite() && self.t_final >= 0.0) {
            return Err(ConfigError::InvalidFinalTime(self.t_final));
        }
        let finite = [self.x0, self.x1, self.y0, self.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.x1 <= self.x0 || self.y1 <= self.y0 {
            return Err(ConfigError::EmptyDomain {
                x0: self.x0,
                x1: self.x1,
                y0: self.y0,
                y1: self.y1,
            });
        }
        if self.output_interval == Some(0) {
            return Err(ConfigError::InvalidOutputInterval);
        }
        Ok(())
    }
}

/// Outcome of [`AdvectionProblem::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub n_steps: usize,
    /// Nominal step size
    pub dt: f64,
    pub final_time: f64,
    /// Relative change of ∫φ over the run
    pub mass_error: f64,
    /// (min, max) of the nodal values over the run
    pub extrema: (f64, f64),
    /// Frame files written during the run
    pub frames: Vec<PathBuf>,
}

/// DG advection problem: mesh, operators, boundary rules and solution.
pub struct AdvectionProblem<W: WindField> {
    config: ProblemConfig,
    wind: W,
    boundary: BoundaryTable,
    mesh: Option<Mesh2D>,
    dofs: Option<DofHandler>,
    store: Option<OperatorStore>,
    solution: Option<GlobalSolution>,
    time: f64,
    steps_taken: usize,
}

impl<W: WindField> AdvectionProblem<W> {
    /// New problem with the default boundary table.
    pub fn new(config: ProblemConfig, wind: W) -> Result<Self, ProblemError> {
        config.validate()?;
        Ok(Self {
            config,
            wind,
            boundary: BoundaryTable::default(),
            mesh: None,
            dofs: None,
            store: None,
            solution: None,
            time: 0.0,
            steps_taken: 0,
        })
    }

    pub fn with_boundary(mut self, boundary: BoundaryTable) -> Self {
        self.boundary = boundary;
        self
    }

    /// Build the mesh and dof handler and allocate a zero solution.
    ///
    /// Discards any previously assembled operators.
    pub fn setup_system(&mut self) -> Result<(), ProblemError> {
        let c = &self.config;
        let n = c.cells_per_direction();
        info!(
            order = c.order,
            cells = n * n,
            "setting up the system"
        );

        let mesh = Mesh2D::uniform_rectangle(c.x0, c.x1, c.y0, c.y1, n, n);
        let dofs = DofHandler::new(&mesh, c.order);
        self.solution = Some(GlobalSolution::new(dofs.n_dofs, dofs.n_dofs_per_cell));
        self.mesh = Some(mesh);
        self.dofs = Some(dofs);
        self.store = None;
        self.time = 0.0;
        self.steps_taken = 0;
        Ok(())
    }

    /// Tag boundary faces: x = 0 → b0, else y = 0 → b1, else b2.
    pub fn set_boundary_ids(&mut self) -> Result<(), ProblemError> {
        let mesh = self
            .mesh
            .as_mut()
            .ok_or(ProblemError::OutOfOrder("set_boundary_ids", "setup_system"))?;
        mesh.set_boundary_ids();
        Ok(())
    }

    /// Build S and L_f for every cell.
    pub fn assemble_system(&mut self) -> Result<(), ProblemError> {
        let mesh = self
            .mesh
            .as_ref()
            .ok_or(ProblemError::OutOfOrder("assemble_system", "setup_system"))?;
        let builder = LocalOperatorBuilder::new(self.config.order);

        #[cfg(feature = "parallel")]
        let store = if self.config.parallel {
            builder.assemble_parallel(mesh, &self.wind)?
        } else {
            builder.assemble(mesh, &self.wind)?
        };
        #[cfg(not(feature = "parallel"))]
        let store = builder.assemble(mesh, &self.wind)?;

        self.store = Some(store);
        Ok(())
    }

    /// Zero initial condition.
    pub fn set_initial_condition(&mut self) -> Result<(), ProblemError> {
        self.set_initial_condition_with(|_, _| 0.0)
    }

    /// Interpolate `f` at every dof location.
    pub fn set_initial_condition_with<F>(&mut self, f: F) -> Result<(), ProblemError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let dofs = self.dofs.as_ref().ok_or(ProblemError::OutOfOrder(
            "set_initial_condition",
            "setup_system",
        ))?;
        let values = dofs.interpolate(f);
        self.solution = Some(GlobalSolution::from_values(values, dofs.n_dofs_per_cell));
        self.time = 0.0;
        self.steps_taken = 0;
        Ok(())
    }

    /// Log S and the four L_f of `cell`.
    pub fn print_matrices(&self, cell: usize) -> Result<(), ProblemError> {
        let store = self
            .store
            .as_ref()
            .ok_or(ProblemError::OutOfOrder("print_matrices", "assemble_system"))?;
        store.print_matrices(cell);
        Ok(())
    }

    /// March from the current time to `t_final` with the configured
    /// integrator.
    ///
    /// Once `t_final` is reached further calls take no steps. If a frame
    /// cannot be written, marching stops at that step, the problem time is
    /// left at the time of the solution and the write error is returned.
    pub fn run(&mut self) -> Result<RunSummary, ProblemError> {
        let (Some(mesh), Some(dofs), Some(solution)) =
            (self.mesh.as_ref(), self.dofs.as_ref(), self.solution.as_mut())
        else {
            return Err(ProblemError::OutOfOrder("run", "setup_system"));
        };
        let store = self
            .store
            .as_ref()
            .ok_or(ProblemError::OutOfOrder("run", "assemble_system"))?;
        let config = &self.config;
        let t_start = self.time;
        let steps_before = self.steps_taken;

        let kernel = UpdateKernel::new(mesh, dofs, store, &self.boundary)?;
        let max_speed = max_wind_speed(&self.wind, dofs.support_points());
        let dt = compute_dt_advection_2d(mesh, max_speed, config.order, config.cfl);
        info!(
            dt,
            max_speed,
            t_start,
            t_final = config.t_final,
            integrator = config.integrator.name(),
            "starting time marching"
        );

        let mut stepper = TimeStepper::new(config.integrator).with_parallel(config.parallel);
        let mut tracker =
            DiagnosticsTracker::new(AdvectionDiagnostics::compute(store, dofs, solution.values()));
        let mut progress = ProgressReporter::new((config.t_final - t_start).max(0.0), 10);
        let mut frames = Vec::new();
        let mut write_error = None;

        if config.output_interval.is_some() && steps_before == 0 {
            let path = write_vtk_series(&config.output_base, 0, dofs, solution.values(), t_start)?;
            frames.push(path);
        }

        let outcome = if dt.is_finite() {
            run_advection_2d(
                &kernel,
                &mut stepper,
                solution,
                t_start,
                config.t_final,
                dt,
                |step, t, sol| {
                    progress.step();
                    let diag = AdvectionDiagnostics::compute(store, dofs, sol.values());
                    if !diag.is_finite() && tracker.current().is_finite() {
                        warn!(step, t, "solution is no longer finite");
                    }
                    tracker.update(t, diag);
                    progress.maybe_report(t - t_start, Some(&diag));

                    let global_step = steps_before + step;
                    match config.output_interval {
                        Some(interval) if global_step % interval == 0 => {
                            let frame = global_step / interval;
                            match write_vtk_series(&config.output_base, frame, dofs, sol.values(), t)
                            {
                                Ok(path) => {
                                    frames.push(path);
                                    ControlFlow::Continue(())
                                }
                                Err(e) => {
                                    write_error = Some(e);
                                    ControlFlow::Break(())
                                }
                            }
                        }
                        _ => ControlFlow::Continue(()),
                    }
                },
            )
        } else {
            // No wind: the solution is already steady
            info!("wind vanishes everywhere, skipping time marching");
            MarchOutcome {
                n_steps: 0,
                time: t_start,
                interrupted: false,
            }
        };

        // The clock follows the solution on every exit path
        self.time = outcome.time;
        self.steps_taken += outcome.n_steps;

        if let Some(e) = write_error {
            warn!(
                n_steps = outcome.n_steps,
                t = outcome.time,
                "frame output failed, time marching stopped"
            );
            return Err(e.into());
        }

        tracker.log_summary();
        Ok(RunSummary {
            n_steps: outcome.n_steps,
            dt,
            final_time: outcome.time,
            mass_error: tracker.mass_error(),
            extrema: tracker.extrema(),
            frames,
        })
    }

    /// Write the current solution as a VTU file with field `phi`.
    pub fn output(&self, path: impl AsRef<Path>) -> Result<(), ProblemError> {
        let (Some(dofs), Some(solution)) = (self.dofs.as_ref(), self.solution.as_ref()) else {
            return Err(ProblemError::OutOfOrder("output", "setup_system"));
        };
        write_vtk_scalar(path, dofs, solution.values(), self.time)?;
        Ok(())
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn mesh(&self) -> Option<&Mesh2D> {
        self.mesh.as_ref()
    }

    pub fn dofs(&self) -> Option<&DofHandler> {
        self.dofs.as_ref()
    }

    pub fn operators(&self) -> Option<&OperatorStore> {
        self.store.as_ref()
    }

    pub fn solution(&self) -> Option<&GlobalSolution> {
        self.solution.as_ref()
    }

    pub fn boundary(&self) -> &BoundaryTable {
        &self.boundary
    }

    /// Simulated time reached so far.
    pub fn time(&self) -> f64 {
        self.time
    }
}
