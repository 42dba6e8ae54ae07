//! Hamiltonians of the form `H(t) = H0 + Σ_k c_k(t) H_k`.

use ndarray as nd;
use num_complex::Complex64 as C64;

/// Linear interpolation from `start` at `t = 0` to `end` at `t = duration`.
///
/// Defined for all real `t`; values outside `[0, duration]` are
/// extrapolated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearRamp {
    /// Value at `t = 0`.
    pub start: f64,
    /// Value at `t = duration`.
    pub end: f64,
    /// Total duration of the ramp.
    pub duration: f64,
}

impl LinearRamp {
    /// Create a new `LinearRamp`.
    pub fn new(start: f64, end: f64, duration: f64) -> Self {
        Self { start, end, duration }
    }

    /// Evaluate the ramp at time `t`.
    pub fn at(&self, t: f64) -> f64 {
        (self.end - self.start) * t / self.duration + self.start
    }
}

/// Time dependence of a single Hamiltonian term.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Coefficient {
    /// Fixed value.
    Constant(f64),
    /// Linear interpolation between two values.
    Ramp(LinearRamp),
}

impl From<f64> for Coefficient {
    fn from(c: f64) -> Self { Self::Constant(c) }
}

impl From<LinearRamp> for Coefficient {
    fn from(r: LinearRamp) -> Self { Self::Ramp(r) }
}

impl Coefficient {
    /// Evaluate at time `t`.
    pub fn at(&self, t: f64) -> f64 {
        match self {
            Self::Constant(c) => *c,
            Self::Ramp(r) => r.at(t),
        }
    }

    /// Return `true` if the coefficient has no time dependence.
    pub fn is_constant(&self) -> bool { matches!(self, Self::Constant(_)) }
}

/// A single time-dependent term `c(t) * op`.
#[derive(Clone, Debug)]
pub struct HTerm {
    pub op: nd::Array2<C64>,
    pub coeff: Coefficient,
}

/// Basic requirements for any Hamiltonian builder.
pub trait HBuild {
    /// Build a time-independent Hamiltonian matrix, if possible.
    fn build_static(&self) -> Option<nd::Array2<C64>>;

    /// Build the Hamiltonian matrix at a given time.
    fn build_at(&self, t: f64) -> nd::Array2<C64>;

    /// Dimension of the Hilbert space.
    fn dim(&self) -> usize;
}

/// Hamiltonian builder for a constant operator plus any number of terms with
/// their own time dependence.
#[derive(Clone, Debug)]
pub struct HBuilder {
    h0: nd::Array2<C64>,
    terms: Vec<HTerm>,
}

impl HBuilder {
    /// Create a new `HBuilder` from the constant part of the Hamiltonian.
    ///
    /// *Panics* if `h0` is not square.
    pub fn new(h0: nd::Array2<C64>) -> Self {
        if !h0.is_square() {
            panic!("HBuilder::new: constant term must be square");
        }
        Self { h0, terms: Vec::new() }
    }

    /// Add a term `coeff(t) * op`.
    ///
    /// *Panics* if `op` does not have the same shape as the constant term.
    pub fn with_term<C>(mut self, op: nd::Array2<C64>, coeff: C) -> Self
    where C: Into<Coefficient>
    {
        if op.shape() != self.h0.shape() {
            panic!("HBuilder::with_term: operator shape mismatch");
        }
        self.terms.push(HTerm { op, coeff: coeff.into() });
        self
    }
}

impl HBuild for HBuilder {
    fn build_static(&self) -> Option<nd::Array2<C64>> {
        self.terms.iter()
            .all(|term| term.coeff.is_constant())
            .then(|| self.build_at(0.0))
    }

    fn build_at(&self, t: f64) -> nd::Array2<C64> {
        self.terms.iter()
            .fold(self.h0.clone(), |acc, HTerm { op, coeff }| {
                acc + op * coeff.at(t)
            })
    }

    fn dim(&self) -> usize { self.h0.nrows() }
}
