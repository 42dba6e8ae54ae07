//! Single-qubit states and the fixed 2x2 operators the model is built from.
//!
//! Throughout, `|0⟩` is the first basis state and sits at the north pole of
//! the Bloch sphere.

use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use crate::{
    c,
    error::{ Error, Result },
};

/* States *********************************************************************/

/// Computational basis states of a single qubit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Qubit {
    /// `|0⟩`
    Q0,
    /// `|1⟩`
    Q1,
}

impl Qubit {
    /// Both basis states, in matrix order.
    pub const BASIS: [Self; 2] = [Self::Q0, Self::Q1];

    /// State vector of the basis state.
    pub fn ket(&self) -> nd::Array1<C64> {
        Self::BASIS.iter()
            .map(|s| if s == self { C64::one() } else { C64::zero() })
            .collect()
    }

    /// Density matrix `|s⟩⟨s|` of the basis state.
    pub fn projector(&self) -> nd::Array2<C64> {
        let ket = self.ket();
        outer_prod(&ket, &ket)
    }
}

/// Compute the outer product `|a⟩⟨b|` of two state vectors.
pub fn outer_prod(a: &nd::Array1<C64>, b: &nd::Array1<C64>)
    -> nd::Array2<C64>
{
    nd::Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j].conj())
}

/// Classical mixture `p0 |0⟩⟨0| + (1 - p0) |1⟩⟨1|`.
pub fn mixture(p0: f64) -> nd::Array2<C64> {
    Qubit::BASIS.iter()
        .zip([p0, 1.0 - p0])
        .map(|(s, w)| s.projector() * w)
        .fold(nd::Array2::zeros((2, 2)), |acc, term| acc + term)
}

/* Operators ******************************************************************/

/// 2x2 identity.
pub fn eye() -> nd::Array2<C64> { nd::Array2::eye(2) }

/// Pauli X.
pub fn sigma_x() -> nd::Array2<C64> {
    nd::array![[c!(0.0), c!(1.0)], [c!(1.0), c!(0.0)]]
}

/// Pauli Y.
#[cfg(test)]
pub(crate) fn sigma_y() -> nd::Array2<C64> {
    nd::array![[c!(0.0), c!(i -1.0)], [c!(i 1.0), c!(0.0)]]
}

/// Pauli Z, with `|0⟩` as the `+1` eigenstate.
pub fn sigma_z() -> nd::Array2<C64> {
    nd::array![[c!(1.0), c!(0.0)], [c!(0.0), c!(-1.0)]]
}

/// `|0⟩⟨1|`, taking `|1⟩` to `|0⟩`.
#[cfg(test)]
pub(crate) fn sigma_plus() -> nd::Array2<C64> {
    nd::array![[c!(0.0), c!(1.0)], [c!(0.0), c!(0.0)]]
}

/// Conjugate transpose.
pub fn dagger<S>(A: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array2<C64>
where S: nd::Data<Elem = C64>
{
    A.t().mapv(|a| a.conj())
}

/// Sum of the main diagonal.
pub fn trace<S>(A: &nd::ArrayBase<S, nd::Ix2>) -> C64
where S: nd::Data<Elem = C64>
{
    A.diag().iter().sum()
}

/// Largest element-wise deviation `max |A_ij - B_ij|`.
pub fn max_deviation<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> f64
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.iter().zip(B.iter())
        .map(|(a, b)| (*a - *b).norm())
        .fold(0.0, f64::max)
}

/// Check that `rho` is a valid qubit density matrix to within `tol`: 2x2,
/// Hermitian, unit trace, and positive-semidefinite.
pub fn check_density<S>(rho: &nd::ArrayBase<S, nd::Ix2>, tol: f64) -> Result<()>
where S: nd::Data<Elem = C64>
{
    if rho.shape() != [2, 2] {
        return Err(Error::InvalidState(
            format!("expected a 2x2 matrix, got shape {:?}", rho.shape())));
    }
    if !rho.iter().all(|a| a.re.is_finite() && a.im.is_finite()) {
        return Err(Error::InvalidState("non-finite entries".to_string()));
    }
    let herm_err = max_deviation(rho, &dagger(rho));
    if herm_err > tol {
        return Err(Error::InvalidState(
            format!("not Hermitian (max deviation {:.3e})", herm_err)));
    }
    let tr = trace(rho);
    if (tr - C64::one()).norm() > tol {
        return Err(Error::InvalidState(
            format!("trace is {:.6} instead of 1", tr)));
    }
    // for a Hermitian 2x2 matrix with positive trace, PSD <=> det >= 0
    let det = rho[[0, 0]] * rho[[1, 1]] - rho[[0, 1]] * rho[[1, 0]];
    if rho[[0, 0]].re < -tol || rho[[1, 1]].re < -tol || det.re < -tol {
        return Err(Error::InvalidState(
            format!("not positive-semidefinite (det = {:.3e})", det.re)));
    }
    Ok(())
}
