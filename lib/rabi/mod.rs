//! Functions for numerical integration of the Lindblad master equation.
//!
//! Where unspecified, the last index of a 3D array corresponds to time, all
//! Hamiltonians and decay rates should be in units of angular frequency, and
//! integration is via fourth-order Runge-Kutta.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    dynamics::{ HBuild, LOp },
    error::{ Error, Result },
};

pub mod lindblad;

/// Compute a "norm" of an object, treating it as a representation of a quantum
/// state.
pub trait StateNorm {
    fn norm(&self) -> C64;
}

/// The norm of an `ndarray::Array2<num_complex::Complex64>` is the sum of its
/// main diagonal.
impl StateNorm for nd::Array2<C64> {
    fn norm(&self) -> C64 { self.diag().iter().sum() }
}

/// Compute the commutator `[A, B] = A B - B A`.
pub fn commutator<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.dot(B) - B.dot(A)
}

/// Compute the anti-commutator `{A, B} = A B + B A`.
pub fn anti_commutator<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.dot(B) + B.dot(A)
}

fn array_diff<A>(arr: &nd::Array1<A>) -> nd::Array1<A>
where A: Copy + std::ops::Sub<A, Output = A>
{
    arr.iter().zip(arr.iter().skip(1))
        .map(|(ak, akp1)| *akp1 - *ak)
        .collect()
}

// number of equal internal steps needed to cover `dt` with steps no longer than
// `max_step`
fn substeps(dt: f64, max_step: f64) -> usize {
    ((dt.abs() / max_step).ceil() as usize).max(1)
}

/// Check that a time grid is usable for integration: non-empty, finite, and
/// strictly increasing.
pub fn check_time_grid(t: &nd::Array1<f64>) -> Result<()> {
    if t.is_empty() {
        return Err(Error::param("time", "time grid is empty"));
    }
    if !t.iter().all(|tk| tk.is_finite()) {
        return Err(Error::param("time", "time grid contains non-finite values"));
    }
    if !array_diff(t).iter().all(|dtk| *dtk > 0.0) {
        return Err(Error::param("time", "time grid must be strictly increasing"));
    }
    Ok(())
}

// fourth-order Runge-Kutta for a time-dependent Hamiltonian given by a
// function; each interval of `t` is covered by equal internal steps no longer
// than `max_step`, and only the states on `t` are kept
pub(crate) fn do_evolve_fn<H, F>(
    z0: &nd::Array2<C64>,
    h: H,
    rhs: F,
    t: &nd::Array1<f64>,
    max_step: f64,
) -> nd::Array3<C64>
where
    H: Fn(f64) -> nd::Array2<C64>,
    F: Fn(&nd::Array2<C64>, &nd::Array2<C64>) -> nd::Array2<C64>,
{
    let n = t.len();
    let dt = array_diff(t);
    let (a, b) = z0.dim();
    let mut z: nd::Array3<C64> = nd::Array3::zeros((a, b, n));
    let mut z_old: nd::Array2<C64> = z0.clone();
    let mut hk: nd::Array2<C64>;
    let mut hkp1h: nd::Array2<C64>;
    let mut hkp1: nd::Array2<C64>;
    let mut k1: nd::Array2<C64>;
    let mut k2: nd::Array2<C64>;
    let mut k3: nd::Array2<C64>;
    let mut k4: nd::Array2<C64>;
    let mut z_new: nd::Array2<C64>;
    let mut norm: C64;
    let mut tj: f64;
    z.slice_mut(nd::s![.., .., 0]).assign(z0);
    let iter = dt.iter().zip(t).enumerate();
    for (k, (&dtk, &tk)) in iter {
        let m = substeps(dtk, max_step);
        let dtj = dtk / m as f64;
        for j in 0..m {
            tj = tk + j as f64 * dtj;
            hk = h(tj);
            hkp1h = h(tj + dtj / 2.0);
            hkp1 = h(tj + dtj);
            k1 = rhs(&hk, &z_old);
            k2 = rhs(&hkp1h, &(&z_old + &k1 * (dtj / 2.0)));
            k3 = rhs(&hkp1h, &(&z_old + &k2 * (dtj / 2.0)));
            k4 = rhs(&hkp1, &(&z_old + &k3 * dtj));
            z_new = &z_old + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dtj / 6.0);
            norm = z_new.norm();
            z_old = z_new / norm;
        }
        z.slice_mut(nd::s![.., .., k + 1]).assign(&z_old);
    }
    z
}
