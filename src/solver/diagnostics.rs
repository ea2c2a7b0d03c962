//! Runtime diagnostics for 2D advection runs.
//!
//! - Total mass ∫φ dx from the per-cell basis integrals
//! - Solution bounds
//! - Progress reporting through `tracing`

use std::time::Instant;

use crate::mesh::DofHandler;
use crate::operators::OperatorStore;

/// ∫ φ dx over the domain.
///
/// For each cell, Σ_i φ_i ∫ ψ_i dx, so the value is exact for the discrete
/// solution.
pub fn total_mass(store: &OperatorStore, dofs: &DofHandler, values: &[f64]) -> f64 {
    (0..dofs.n_cells())
        .map(|cell| {
            let w = &store.cell(cell).basis_integrals;
            dofs.cell_dof_indices(cell)
                .iter()
                .zip(w)
                .map(|(&g, &wi)| values[g] * wi)
                .sum::<f64>()
        })
        .sum()
}

/// Snapshot of scalar diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvectionDiagnostics {
    /// ∫ φ dx
    pub total_mass: f64,
    /// Minimum nodal value
    pub min_value: f64,
    /// Maximum nodal value
    pub max_value: f64,
}

impl AdvectionDiagnostics {
    pub fn compute(store: &OperatorStore, dofs: &DofHandler, values: &[f64]) -> Self {
        let (min_value, max_value) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            total_mass: total_mass(store, dofs, values),
            min_value,
            max_value,
        }
    }

    /// Single-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "M={:.6e} φ=[{:.4}, {:.4}]",
            self.total_mass, self.min_value, self.max_value
        )
    }

    /// False once a NaN or infinity appears.
    pub fn is_finite(&self) -> bool {
        self.total_mass.is_finite() && self.min_value.is_finite() && self.max_value.is_finite()
    }
}

/// Tracks diagnostics over a run.
#[derive(Clone, Debug)]
pub struct DiagnosticsTracker {
    initial: AdvectionDiagnostics,
    current: AdvectionDiagnostics,
    current_time: f64,
    n_updates: usize,
    /// Smallest value seen
    min_seen: f64,
    /// Largest value seen
    max_seen: f64,
}

impl DiagnosticsTracker {
    pub fn new(initial: AdvectionDiagnostics) -> Self {
        Self {
            current: initial,
            initial,
            current_time: 0.0,
            n_updates: 0,
            min_seen: initial.min_value,
            max_seen: initial.max_value,
        }
    }

    pub fn update(&mut self, time: f64, diag: AdvectionDiagnostics) {
        self.current_time = time;
        self.n_updates += 1;
        self.min_seen = self.min_seen.min(diag.min_value);
        self.max_seen = self.max_seen.max(diag.max_value);
        self.current = diag;
    }

    /// Relative mass change since the start; absolute if the initial mass is zero.
    pub fn mass_error(&self) -> f64 {
        let diff = (self.current.total_mass - self.initial.total_mass).abs();
        if self.initial.total_mass.abs() > 1e-14 {
            diff / self.initial.total_mass.abs()
        } else {
            diff
        }
    }

    /// (min, max) over every update.
    pub fn extrema(&self) -> (f64, f64) {
        (self.min_seen, self.max_seen)
    }

    pub fn current(&self) -> &AdvectionDiagnostics {
        &self.current
    }

    pub fn initial(&self) -> &AdvectionDiagnostics {
        &self.initial
    }

    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    pub fn log_summary(&self) {
        tracing::info!(
            time = self.current_time,
            updates = self.n_updates,
            mass_error = self.mass_error(),
            min = self.min_seen,
            max = self.max_seen,
            "diagnostics summary"
        );
    }
}

/// Logs progress every `report_interval_pct` percent of simulated time.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    start_instant: Instant,
    total_sim_time: f64,
    last_reported_pct: u32,
    report_interval_pct: u32,
    n_steps: usize,
}

impl ProgressReporter {
    pub fn new(total_sim_time: f64, report_interval_pct: u32) -> Self {
        Self {
            start_instant: Instant::now(),
            total_sim_time,
            last_reported_pct: 0,
            report_interval_pct: report_interval_pct.max(1),
            n_steps: 0,
        }
    }

    /// Record a time step.
    pub fn step(&mut self) {
        self.n_steps += 1;
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Report if the next threshold was crossed. Returns true if it reported.
    pub fn maybe_report(&mut self, current_time: f64, diag: Option<&AdvectionDiagnostics>) -> bool {
        if self.total_sim_time <= 0.0 {
            return false;
        }
        let pct = ((current_time / self.total_sim_time) * 100.0) as u32;
        if pct >= self.last_reported_pct + self.report_interval_pct {
            self.report(current_time, diag);
            self.last_reported_pct = (pct / self.report_interval_pct) * self.report_interval_pct;
            true
        } else {
            false
        }
    }

    pub fn report(&self, current_time: f64, diag: Option<&AdvectionDiagnostics>) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let pct = if self.total_sim_time > 0.0 {
            100.0 * current_time / self.total_sim_time
        } else {
            100.0
        };
        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };
        match diag {
            Some(d) => tracing::info!(
                pct = %format!("{:.1}", pct),
                t = current_time,
                steps = self.n_steps,
                steps_per_sec = %format!("{:.0}", steps_per_sec),
                "{}",
                d.summary_line()
            ),
            None => tracing::info!(
                pct = %format!("{:.1}", pct),
                t = current_time,
                steps = self.n_steps,
                steps_per_sec = %format!("{:.0}", steps_per_sec),
                "progress"
            ),
        }
    }
}
