//! Bloch-sphere coordinates and purity of single-qubit density matrices.

use std::fmt;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::hilbert::trace;

/// Cartesian point `(x, y, z)` in the closed unit ball.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl fmt::Display for BlochVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+.4}, {:+.4}, {:+.4})", self.x, self.y, self.z)
    }
}

impl From<[f64; 3]> for BlochVector {
    fn from(r: [f64; 3]) -> Self { Self { x: r[0], y: r[1], z: r[2] } }
}

impl From<BlochVector> for [f64; 3] {
    fn from(r: BlochVector) -> Self { [r.x, r.y, r.z] }
}

impl BlochVector {
    /// Create a new `BlochVector`.
    pub fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    /// Extract the Bloch vector of a qubit density matrix:
    /// ```text
    /// x =  2 Re(ρ01)
    /// y = -2 Im(ρ01)
    /// z =  2 Re(ρ00) - 1
    /// ```
    ///
    /// Only `ρ00` and `ρ01` are read; the remaining elements are assumed to
    /// follow from Hermiticity and unit trace. Nothing is validated, so an
    /// invalid matrix gives a meaningless result.
    pub fn from_density<S>(rho: &nd::ArrayBase<S, nd::Ix2>) -> Self
    where S: nd::Data<Elem = C64>
    {
        let r01 = rho[[0, 1]];
        Self {
            x: 2.0 * r01.re,
            y: -2.0 * r01.im,
            z: 2.0 * rho[[0, 0]].re - 1.0,
        }
    }

    /// Squared length `x² + y² + z²`.
    pub fn norm_sqr(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2) + self.z.powi(2)
    }

    /// Purity of the corresponding state, `(|r|² + 1) / 2`.
    pub fn purity(&self) -> f64 { (self.norm_sqr() + 1.0) / 2.0 }

    /// Shift by the given amounts along each axis.
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Purity `Tr(ρ²)` of a density matrix.
pub fn purity<S>(rho: &nd::ArrayBase<S, nd::Ix2>) -> f64
where S: nd::Data<Elem = C64>
{
    trace(&rho.dot(rho)).re
}

/// Bloch vectors for a series of density matrices stacked along the last axis.
pub fn bloch_series(rho: &nd::Array3<C64>) -> Vec<BlochVector> {
    rho.axis_iter(nd::Axis(2))
        .map(|rho_t| BlochVector::from_density(&rho_t))
        .collect()
}

/// Purities for a series of density matrices stacked along the last axis.
pub fn purity_series(rho: &nd::Array3<C64>) -> nd::Array1<f64> {
    rho.axis_iter(nd::Axis(2))
        .map(|rho_t| purity(&rho_t))
        .collect()
}
