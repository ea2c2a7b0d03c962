//! Upwind numerical flux for scalar advection.
//!
//! At a face with outward normal n (seen from the owner) and a_n = v · n:
//! F^* = a_n u_owner    if a_n ≥ 0  (outflow)
//! F^* = a_n u_exterior if a_n < 0  (inflow)
//!
//! At a_n = 0 both choices give a zero flux; the owner value is used.

/// The upwind state for normal velocity `a_n`.
#[inline]
pub fn upwind_value(owner: f64, exterior: f64, a_n: f64) -> f64 {
    if a_n >= 0.0 { owner } else { exterior }
}

/// Upwind normal flux F^* · n.
///
/// # Arguments
/// * `owner` - Value on the side the normal points out of
/// * `exterior` - Neighbor or ghost value
/// * `a_n` - Wind dotted with the owner's outward normal
#[inline]
pub fn upwind_flux(owner: f64, exterior: f64, a_n: f64) -> f64 {
    a_n * upwind_value(owner, exterior, a_n)
}
