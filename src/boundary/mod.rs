//! Boundary conditions for scalar advection.
//!
//! Boundary conditions specify the "ghost" value outside the domain used for
//! flux evaluation at boundary faces.
//!
//! | Rule | Ghost value |
//! |------|-------------|
//! | `FixedValue(c)` | c |
//! | `ZeroGradient` | owner value |

mod ghost;

pub use ghost::{BoundaryRule, BoundaryTable, FixedValue, ZeroGradient};
