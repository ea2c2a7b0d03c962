//! 2D scalar advection by a steady wind field.
//!
//! ∂φ/∂t + ∇ · (v φ) = 0
//!
//! where v(x, y) is a prescribed velocity field. The field is sampled at
//! quadrature points during assembly and at face dofs for the upwind test;
//! it never changes during a run.

use std::f64::consts::PI;

/// A steady velocity field v: ℝ² → ℝ².
///
/// Any `Fn(f64, f64) -> (f64, f64) + Send + Sync` closure is a wind field.
pub trait WindField: Send + Sync {
    /// Velocity (v_x, v_y) at (x, y).
    fn velocity(&self, x: f64, y: f64) -> (f64, f64);

    /// Normal velocity v · n at (x, y).
    #[inline]
    fn normal_velocity(&self, x: f64, y: f64, normal: (f64, f64)) -> f64 {
        let (vx, vy) = self.velocity(x, y);
        vx * normal.0 + vy * normal.1
    }
}

impl<F> WindField for F
where
    F: Fn(f64, f64) -> (f64, f64) + Send + Sync,
{
    #[inline]
    fn velocity(&self, x: f64, y: f64) -> (f64, f64) {
        self(x, y)
    }
}

/// Constant wind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformWind {
    /// Advection velocity in x-direction
    pub velocity_x: f64,
    /// Advection velocity in y-direction
    pub velocity_y: f64,
}

impl UniformWind {
    pub fn new(velocity_x: f64, velocity_y: f64) -> Self {
        Self {
            velocity_x,
            velocity_y,
        }
    }

    /// Wind with given speed and angle (radians, counter-clockwise from +x).
    pub fn from_polar(speed: f64, angle: f64) -> Self {
        Self {
            velocity_x: speed * angle.cos(),
            velocity_y: speed * angle.sin(),
        }
    }

    /// Unit wind along the diagonal, (1/√2, 1/√2).
    pub fn diagonal() -> Self {
        Self::from_polar(1.0, PI / 4.0)
    }

    /// Magnitude of the velocity.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity_x.hypot(self.velocity_y)
    }
}

impl WindField for UniformWind {
    #[inline]
    fn velocity(&self, _x: f64, _y: f64) -> (f64, f64) {
        (self.velocity_x, self.velocity_y)
    }
}

/// Divergence-free cellular flow on the unit square.
///
/// v = A (sin πx cos πy, -cos πx sin πy)
///
/// The normal component vanishes on every edge of [0, 1]², so no mass
/// enters or leaves the square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellularWind {
    pub amplitude: f64,
}

impl CellularWind {
    pub fn new(amplitude: f64) -> Self {
        Self { amplitude }
    }
}

impl WindField for CellularWind {
    #[inline]
    fn velocity(&self, x: f64, y: f64) -> (f64, f64) {
        let (sx, cx) = (PI * x).sin_cos();
        let (sy, cy) = (PI * y).sin_cos();
        (self.amplitude * sx * cy, -self.amplitude * cx * sy)
    }
}

/// Largest wind speed over a set of sample points.
pub fn max_wind_speed<W: WindField + ?Sized>(wind: &W, points: &[(f64, f64)]) -> f64 {
    points
        .iter()
        .map(|&(x, y)| {
            let (vx, vy) = wind.velocity(x, y);
            vx.hypot(vy)
        })
        .fold(0.0, f64::max)
}
