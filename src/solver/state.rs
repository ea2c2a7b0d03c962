//! Global nodal solution with old/new buffers.
//!
//! Layout is element-major: data[k * n_dofs_per_cell + i] for cell k, dof i.
//! The old buffer holds the current time level; a step writes only the new
//! buffer and then swaps the two.

/// Double-buffered global solution vector.
#[derive(Clone, Debug)]
pub struct GlobalSolution {
    old: Vec<f64>,
    new: Vec<f64>,
    /// Number of dofs per cell
    pub n_dofs_per_cell: usize,
}

impl GlobalSolution {
    /// Zero solution with `n_dofs` entries.
    pub fn new(n_dofs: usize, n_dofs_per_cell: usize) -> Self {
        Self {
            old: vec![0.0; n_dofs],
            new: vec![0.0; n_dofs],
            n_dofs_per_cell,
        }
    }

    /// Solution holding `values` at the current time level.
    pub fn from_values(values: Vec<f64>, n_dofs_per_cell: usize) -> Self {
        debug_assert_eq!(values.len() % n_dofs_per_cell, 0);
        let new = vec![0.0; values.len()];
        Self {
            old: values,
            new,
            n_dofs_per_cell,
        }
    }

    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.old.len()
    }

    /// Values at the current time level.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.old
    }

    /// Mutable values at the current time level (e.g. to set an initial condition).
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.old
    }

    /// Current values of cell k.
    #[inline]
    pub fn element(&self, k: usize) -> &[f64] {
        let start = k * self.n_dofs_per_cell;
        &self.old[start..start + self.n_dofs_per_cell]
    }

    /// Frozen old buffer and writable new buffer for one step.
    #[inline]
    pub fn buffers_mut(&mut self) -> (&[f64], &mut [f64]) {
        (&self.old, &mut self.new)
    }

    /// Make the new buffer the current time level.
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.old, &mut self.new);
    }

    /// Set all current values to a constant.
    pub fn fill(&mut self, value: f64) {
        self.old.fill(value);
    }

    /// Maximum absolute current value.
    pub fn max_abs(&self) -> f64 {
        self.old.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    /// (min, max) of the current values.
    pub fn range(&self) -> (f64, f64) {
        self.old
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Consume into the current values.
    pub fn into_values(self) -> Vec<f64> {
        self.old
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_exchanges_levels() {
        let mut sol = GlobalSolution::from_values(vec![1.0, 2.0, 3.0, 4.0], 4);
        {
            let (old, new) = sol.buffers_mut();
            for (n, o) in new.iter_mut().zip(old) {
                *n = 10.0 * o;
            }
        }
        assert_eq!(sol.values(), &[1.0, 2.0, 3.0, 4.0]);
        sol.swap();
        assert_eq!(sol.values(), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_element_view() {
        let sol = GlobalSolution::from_values((0..8).map(f64::from).collect(), 4);
        assert_eq!(sol.element(1), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_range_and_max_abs() {
        let mut sol = GlobalSolution::new(4, 4);
        sol.values_mut().copy_from_slice(&[-3.0, 0.5, 2.0, 1.0]);
        assert_eq!(sol.range(), (-3.0, 2.0));
        assert_eq!(sol.max_abs(), 3.0);
        sol.fill(0.25);
        assert_eq!(sol.range(), (0.25, 0.25));
    }
}
