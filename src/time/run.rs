//! Time marching loop.

use std::ops::ControlFlow;

use tracing::{debug, info};

use super::TimeStepper;
use crate::solver::{GlobalSolution, UpdateKernel};

/// Where a marching loop stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchOutcome {
    /// Number of time steps taken
    pub n_steps: usize,
    /// Time of the solution on exit
    pub time: f64,
    /// True if the observer asked to stop before `t_final`
    pub interrupted: bool,
}

/// Run from `t_start` to `t_final` with step `dt`, shortening the last step
/// to land on `t_final`.
///
/// `observer` is called after every step with (step, time, solution) and
/// may return `ControlFlow::Break` to stop marching; the returned outcome
/// then carries the time of the last completed step.
pub fn run_advection_2d<F>(
    kernel: &UpdateKernel<'_>,
    stepper: &mut TimeStepper,
    solution: &mut GlobalSolution,
    t_start: f64,
    t_final: f64,
    dt: f64,
    mut observer: F,
) -> MarchOutcome
where
    F: FnMut(usize, f64, &GlobalSolution) -> ControlFlow<()>,
{
    let mut outcome = MarchOutcome {
        n_steps: 0,
        time: t_start,
        interrupted: false,
    };
    if dt <= 0.0 || !dt.is_finite() {
        debug!(dt, "non-positive or non-finite step, nothing to do");
        return outcome;
    }

    let tol = 1e-12 * t_final.abs().max(1.0);
    let mut t = t_start;

    while t_final - t > tol {
        let dt_actual = dt.min(t_final - t);
        stepper.step(kernel, solution, dt_actual);
        t += dt_actual;
        // Absorb a sliver left by round-off
        if t_final - t <= tol {
            t = t_final;
        }
        outcome.n_steps += 1;
        outcome.time = t;

        if observer(outcome.n_steps, t, solution).is_break() {
            outcome.interrupted = true;
            debug!(n_steps = outcome.n_steps, t, "time marching stopped by observer");
            break;
        }
    }

    info!(
        integrator = stepper.integrator().name(),
        n_steps = outcome.n_steps,
        t = outcome.time,
        t_final,
        "time marching finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryTable;
    use crate::equations::UniformWind;
    use crate::mesh::{DofHandler, Mesh2D};
    use crate::operators::LocalOperatorBuilder;
    use crate::time::StandardIntegrator;

    #[test]
    fn test_step_count_and_final_time() {
        let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
        mesh.set_boundary_ids();
        let dofs = DofHandler::new(&mesh, 1);
        let store = LocalOperatorBuilder::new(1)
            .assemble(&mesh, &UniformWind::new(1.0, 0.0))
            .expect("assembly should succeed");
        let boundary = BoundaryTable::default();
        let kernel = UpdateKernel::new(&mesh, &dofs, &store, &boundary).expect("valid");

        let mut sol = GlobalSolution::new(dofs.n_dofs, dofs.n_dofs_per_cell);
        let mut stepper = TimeStepper::new(StandardIntegrator::ForwardEuler);
        let mut last_t = 0.0;
        let out = run_advection_2d(&kernel, &mut stepper, &mut sol, 0.0, 0.25, 0.1, |_, t, _| {
            last_t = t;
            ControlFlow::Continue(())
        });
        assert_eq!(out.n_steps, 3);
        assert!(!out.interrupted);
        assert_eq!(out.time, 0.25);
        assert_eq!(last_t, 0.25);
    }

    #[test]
    fn test_observer_break_stops_marching() {
        let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
        mesh.set_boundary_ids();
        let dofs = DofHandler::new(&mesh, 1);
        let store = LocalOperatorBuilder::new(1)
            .assemble(&mesh, &UniformWind::new(1.0, 0.0))
            .expect("assembly should succeed");
        let boundary = BoundaryTable::default();
        let kernel = UpdateKernel::new(&mesh, &dofs, &store, &boundary).expect("valid");

        let mut sol = GlobalSolution::new(dofs.n_dofs, dofs.n_dofs_per_cell);
        let mut stepper = TimeStepper::new(StandardIntegrator::ForwardEuler);
        let out = run_advection_2d(&kernel, &mut stepper, &mut sol, 0.0, 1.0, 0.1, |step, _, _| {
            if step == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(out.n_steps, 2);
        assert!(out.interrupted);
        assert!((out.time - 0.2).abs() < 1e-14);
    }

    #[test]
    fn test_start_at_or_past_final_time_takes_no_steps() {
        let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
        mesh.set_boundary_ids();
        let dofs = DofHandler::new(&mesh, 1);
        let store = LocalOperatorBuilder::new(1)
            .assemble(&mesh, &UniformWind::new(1.0, 0.0))
            .expect("assembly should succeed");
        let boundary = BoundaryTable::default();
        let kernel = UpdateKernel::new(&mesh, &dofs, &store, &boundary).expect("valid");

        let mut sol = GlobalSolution::new(dofs.n_dofs, dofs.n_dofs_per_cell);
        let mut stepper = TimeStepper::new(StandardIntegrator::ForwardEuler);
        let out = run_advection_2d(&kernel, &mut stepper, &mut sol, 0.5, 0.5, 0.1, |_, _, _| {
            ControlFlow::Continue(())
        });
        assert_eq!(out.n_steps, 0);
        assert_eq!(out.time, 0.5);
        assert_eq!(sol.max_abs(), 0.0);
    }
}
