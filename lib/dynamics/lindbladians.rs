//! Dissipative part of the Lindblad master equation.
//!
//! For unit-rate collapse operators `L_k`, the dissipator is
//! ```text
//! D[ρ] = Σ_k ( L_k ρ L_k† - ½ { L_k† L_k, ρ } )
//! ```

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ Error, Result },
    hilbert::{ dagger, eye, max_deviation },
    rabi::anti_commutator,
};

/// Basic requirements for any implementation of a Lindbladian operator.
pub trait LOp {
    /// Operate on a density matrix.
    fn op(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64>;
}

/// Lindbladian operator built from a fixed set of unit-rate collapse
/// operators.
#[derive(Clone, Debug)]
pub struct LOperator {
    ops: Vec<nd::Array2<C64>>,
    ops_dag: Vec<nd::Array2<C64>>,
    ops_dag_ops: Vec<nd::Array2<C64>>,
}

impl LOperator {
    /// Create a new `LOperator`.
    ///
    /// *Panics* if the operators are not all square with equal dimension.
    pub fn new<I>(ops: I) -> Self
    where I: IntoIterator<Item = nd::Array2<C64>>
    {
        let ops: Vec<nd::Array2<C64>> = ops.into_iter().collect();
        if let Some(first) = ops.first() {
            if !ops.iter().all(|L| L.is_square() && L.shape() == first.shape()) {
                panic!("LOperator::new: operators must be square and of equal size");
            }
        }
        let ops_dag: Vec<nd::Array2<C64>> = ops.iter().map(dagger).collect();
        let ops_dag_ops: Vec<nd::Array2<C64>>
            = ops.iter().zip(&ops_dag)
            .map(|(L, Ld)| Ld.dot(L))
            .collect();
        Self { ops, ops_dag, ops_dag_ops }
    }

    /// Get a reference to the collapse operators.
    pub fn ops(&self) -> &[nd::Array2<C64>] { &self.ops }

    /// Perform the operator action on a density matrix.
    pub fn op(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> {
        let mut D: nd::Array2<C64> = nd::Array2::zeros(rho.raw_dim());
        let iter
            = self.ops.iter()
            .zip(&self.ops_dag)
            .zip(&self.ops_dag_ops);
        for ((L, Ld), LdL) in iter {
            D += &L.dot(rho).dot(Ld);
            D -= &(anti_commutator(LdL, rho) * 0.5);
        }
        D
    }
}

impl LOp for LOperator {
    fn op(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> { self.op(rho) }
}

/// Compute `Σ_k K_k† K_k` for a set of operators.
///
/// *Panics* if `ops` is empty.
pub fn completeness(ops: &[nd::Array2<C64>]) -> nd::Array2<C64> {
    let n = ops.first()
        .map(|K| K.nrows())
        .expect("completeness: empty operator set");
    ops.iter()
        .fold(nd::Array2::zeros((n, n)), |acc, K| acc + dagger(K).dot(K))
}

/// Check that a set of operators satisfies `Σ_k K_k† K_k = 1` to within
/// `tol`, i.e. that it describes a trace-preserving channel.
pub fn check_completeness(ops: &[nd::Array2<C64>], tol: f64) -> Result<()> {
    if ops.is_empty() {
        return Err(Error::NotTracePreserving(1.0));
    }
    let sum = completeness(ops);
    let dev = max_deviation(&sum, &nd::Array2::<C64>::eye(sum.nrows()));
    if dev > tol { Err(Error::NotTracePreserving(dev)) } else { Ok(()) }
}

/// Amplitude-damping operators for damping probability `p`:
/// ```text
/// K0 = [[1, 0], [0, √(1 - p)]]
/// K1 = [[0, √p], [0, 0]]
/// ```
/// `K1` takes `|1⟩` to `|0⟩`.
///
/// Fails if `p` is not a finite number in `[0, 1]`.
pub fn amplitude_damping(p: f64) -> Result<[nd::Array2<C64>; 2]> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(Error::param(
            "damping", format!("must lie in [0, 1], got {}", p)));
    }
    let mut K0: nd::Array2<C64> = eye();
    K0[[1, 1]] = (1.0 - p).sqrt().into();
    let mut K1: nd::Array2<C64> = nd::Array2::zeros((2, 2));
    K1[[0, 1]] = p.sqrt().into();
    Ok([K0, K1])
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::{
        c,
        hilbert::{ mixture, sigma_plus, trace },
    };

    #[test]
    fn damping_is_complete() {
        for k in 0..=20 {
            let p = k as f64 / 20.0;
            let ops = amplitude_damping(p).unwrap();
            let dev = max_deviation(&completeness(&ops), &eye());
            assert!(dev < 1e-10, "p = {}: deviation {:e}", p, dev);
            assert!(check_completeness(&ops, 1e-10).is_ok());
        }
    }

    #[test]
    fn damping_rejects_out_of_range() {
        for p in [-0.1, 1.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                amplitude_damping(p),
                Err(Error::InvalidParam { name: "damping", .. }),
            ));
        }
    }

    #[test]
    fn incomplete_set_detected() {
        let [K0, _] = amplitude_damping(0.3).unwrap();
        match check_completeness(&[K0], 1e-10) {
            Err(Error::NotTracePreserving(dev)) => {
                assert_abs_diff_eq!(dev, 0.3, epsilon = 1e-12);
            },
            other => panic!("unexpected result {:?}", other),
        }
        assert!(check_completeness(&[], 1e-10).is_err());
    }

    #[test]
    fn dissipator_is_traceless() {
        let lop = LOperator::new(amplitude_damping(0.4).unwrap());
        let mut rho = mixture(0.3);
        rho[[0, 1]] = c!(0.2, -0.1);
        rho[[1, 0]] = c!(0.2, 0.1);
        let D = lop.op(&rho);
        assert_abs_diff_eq!(trace(&D).norm(), 0.0, epsilon = 1e-14);
        assert_eq!(D, LOp::op(&lop, &rho));
    }

    #[test]
    fn pure_decay_rates() {
        // D[σ+] on |1⟩⟨1| moves population from |1⟩ to |0⟩ at unit rate
        let lop = LOperator::new([sigma_plus()]);
        let D = lop.op(&mixture(0.0));
        assert_abs_diff_eq!(D[[0, 0]].re, 1.0);
        assert_abs_diff_eq!(D[[1, 1]].re, -1.0);

        // identity collapse operator does nothing
        let lop = LOperator::new([eye()]);
        let rho = mixture(0.7);
        assert_abs_diff_eq!(lop.op(&rho).mapv(|d| d.norm()).sum(), 0.0);
    }
}
