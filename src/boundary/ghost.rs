//! Ghost-value rules for boundary faces.
//!
//! At a boundary face the exterior state is a ghost value computed from the
//! owner-side value. The upwind flux then picks owner or ghost exactly as it
//! would pick owner or neighbor at an interior face.

use std::fmt;

use crate::mesh::BoundaryTag;

/// Maps the owner-side value at a boundary face dof to a ghost value.
pub trait BoundaryRule: Send + Sync {
    fn ghost_value(&self, owner: f64) -> f64;
}

/// Prescribed (Dirichlet) ghost value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedValue(pub f64);

impl BoundaryRule for FixedValue {
    #[inline]
    fn ghost_value(&self, _owner: f64) -> f64 {
        self.0
    }
}

/// Zero-gradient extrapolation: the ghost equals the owner value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ZeroGradient;

impl BoundaryRule for ZeroGradient {
    #[inline]
    fn ghost_value(&self, owner: f64) -> f64 {
        owner
    }
}

/// One rule per boundary tag.
pub struct BoundaryTable {
    rules: [Box<dyn BoundaryRule>; 3],
}

impl BoundaryTable {
    /// Table with explicit rules for tags 0, 1 and 2.
    pub fn new(
        inflow: impl BoundaryRule + 'static,
        bottom: impl BoundaryRule + 'static,
        outflow: impl BoundaryRule + 'static,
    ) -> Self {
        Self {
            rules: [Box::new(inflow), Box::new(bottom), Box::new(outflow)],
        }
    }

    /// Replace the rule for one tag.
    pub fn with_rule(mut self, tag: BoundaryTag, rule: impl BoundaryRule + 'static) -> Self {
        self.rules[tag.id()] = Box::new(rule);
        self
    }

    #[inline]
    pub fn rule(&self, tag: BoundaryTag) -> &dyn BoundaryRule {
        self.rules[tag.id()].as_ref()
    }

    #[inline]
    pub fn ghost_value(&self, tag: BoundaryTag, owner: f64) -> f64 {
        self.rules[tag.id()].ghost_value(owner)
    }
}

impl Default for BoundaryTable {
    /// b0 → 1.0, b1 → 0.0, b2 → zero gradient.
    fn default() -> Self {
        Self::new(FixedValue(1.0), FixedValue(0.0), ZeroGradient)
    }
}

impl fmt::Debug for BoundaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rules are opaque; show what each returns for a NaN input
        let ghosts: Vec<_> = BoundaryTag::ALL
            .iter()
            .map(|&tag| (tag.to_string(), self.ghost_value(tag, f64::NAN)))
            .collect();
        f.debug_struct("BoundaryTable").field("ghost(NaN)", &ghosts).finish()
    }
}
