//! Explicit integrators driven by the update kernel.
//!
//! Every stage evaluates R(u) with [`UpdateKernel::evaluate_rhs`] on a frozen
//! stage vector; the solution's old buffer is never written during a step.

use crate::solver::{GlobalSolution, UpdateKernel};

/// Built-in integrators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StandardIntegrator {
    /// u_new = u + dt R(u)
    #[default]
    ForwardEuler,
    /// Shu-Osher SSP-RK3
    SspRk3,
}

impl StandardIntegrator {
    pub fn name(&self) -> &'static str {
        match self {
            StandardIntegrator::ForwardEuler => "forward-euler",
            StandardIntegrator::SspRk3 => "ssp-rk3",
        }
    }

    /// Order of accuracy.
    pub fn order(&self) -> usize {
        match self {
            StandardIntegrator::ForwardEuler => 1,
            StandardIntegrator::SspRk3 => 3,
        }
    }

    pub fn n_stages(&self) -> usize {
        self.order()
    }
}

/// Advances a [`GlobalSolution`] with reusable stage storage.
#[derive(Clone, Debug)]
pub struct TimeStepper {
    integrator: StandardIntegrator,
    parallel: bool,
    rhs: Vec<f64>,
    u1: Vec<f64>,
    u2: Vec<f64>,
}

impl TimeStepper {
    pub fn new(integrator: StandardIntegrator) -> Self {
        Self {
            integrator,
            parallel: false,
            rhs: Vec::new(),
            u1: Vec::new(),
            u2: Vec::new(),
        }
    }

    /// Use the two-phase parallel kernel. Ignored without the `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    pub fn integrator(&self) -> StandardIntegrator {
        self.integrator
    }

    /// Advance `solution` by `dt`.
    pub fn step(&mut self, kernel: &UpdateKernel<'_>, solution: &mut GlobalSolution, dt: f64) {
        match self.integrator {
            StandardIntegrator::ForwardEuler => self.forward_euler(kernel, solution, dt),
            StandardIntegrator::SspRk3 => self.ssp_rk3(kernel, solution, dt),
        }
    }

    fn forward_euler(&mut self, kernel: &UpdateKernel<'_>, solution: &mut GlobalSolution, dt: f64) {
        #[cfg(feature = "parallel")]
        if self.parallel {
            kernel.step_parallel(solution, dt);
            return;
        }
        kernel.step(solution, dt);
    }

    /// Shu-Osher form:
    /// ```text
    /// u1 = u + dt R(u)
    /// u2 = 3/4 u + 1/4 (u1 + dt R(u1))
    /// u_new = 1/3 u + 2/3 (u2 + dt R(u2))
    /// ```
    fn ssp_rk3(&mut self, kernel: &UpdateKernel<'_>, solution: &mut GlobalSolution, dt: f64) {
        let n = solution.n_dofs();
        self.rhs.resize(n, 0.0);
        self.u1.resize(n, 0.0);
        self.u2.resize(n, 0.0);
        let parallel = self.parallel;

        let (u, out) = solution.buffers_mut();

        // Stage 1
        evaluate(kernel, parallel, u, &mut self.rhs);
        for ((u1, &u), &r) in self.u1.iter_mut().zip(u).zip(&self.rhs) {
            *u1 = u + dt * r;
        }

        // Stage 2
        evaluate(kernel, parallel, &self.u1, &mut self.rhs);
        for (((u2, &u), &u1), &r) in self.u2.iter_mut().zip(u).zip(&self.u1).zip(&self.rhs) {
            *u2 = 0.75 * u + 0.25 * (u1 + dt * r);
        }

        // Stage 3
        evaluate(kernel, parallel, &self.u2, &mut self.rhs);
        for (((o, &u), &u2), &r) in out.iter_mut().zip(u).zip(&self.u2).zip(&self.rhs) {
            *o = u / 3.0 + 2.0 / 3.0 * (u2 + dt * r);
        }

        solution.swap();
    }
}

#[inline]
fn evaluate(kernel: &UpdateKernel<'_>, parallel: bool, u: &[f64], rhs: &mut [f64]) {
    #[cfg(feature = "parallel")]
    if parallel {
        kernel.evaluate_rhs_parallel(u, rhs);
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    kernel.evaluate_rhs(u, rhs);
}
