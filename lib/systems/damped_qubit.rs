//! A single qubit under a linearly ramped `σz` drive, losing population from
//! `|1⟩` to `|0⟩` through amplitude damping.
//!
//! ```text
//! H(t) = J σx + Δ(t) σz,   Δ(t) = -hz/2 + (3 hz / 2) t / τ
//! K0 = [[1, 0], [0, √(1 - p)]]
//! K1 = [[0, √p], [0, 0]]
//! ρ(0) = diag(p0, 1 - p0)
//! ```

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    config::Params,
    dynamics::{
        HBuilder,
        LOperator,
        amplitude_damping,
        check_completeness,
    },
    error::Result,
    hilbert::{ mixture, sigma_x, sigma_z },
};

/// Maximum allowed deviation of `Σ_k K_k† K_k` from the identity.
pub const COMPLETENESS_TOL: f64 = 1e-10;

/// Everything needed to integrate the model: Hamiltonian, dissipator, and
/// initial state.
#[derive(Clone, Debug)]
pub struct DampedQubit {
    hbuilder: HBuilder,
    loperator: LOperator,
    rho0: nd::Array2<C64>,
}

impl DampedQubit {
    /// Assemble the model from validated parameters.
    ///
    /// Fails if the damping probability is out of range or the resulting
    /// collapse operators are not trace-preserving.
    pub fn new(params: &Params) -> Result<Self> {
        let hbuilder
            = HBuilder::new(sigma_x() * params.coupling)
            .with_term(sigma_z(), params.detuning());
        let ops = amplitude_damping(params.damping)?;
        check_completeness(&ops, COMPLETENESS_TOL)?;
        debug!(damping = params.damping, "collapse operators are complete");
        let loperator = LOperator::new(ops);
        let rho0 = mixture(params.initial_population);
        Ok(Self { hbuilder, loperator, rho0 })
    }

    /// Get a reference to the Hamiltonian builder.
    pub fn hbuilder(&self) -> &HBuilder { &self.hbuilder }

    /// Get a reference to the Lindbladian operator.
    pub fn loperator(&self) -> &LOperator { &self.loperator }

    /// Get a reference to the initial density matrix.
    pub fn rho0(&self) -> &nd::Array2<C64> { &self.rho0 }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::{
        dynamics::HBuild,
        error::Error,
        hilbert::max_deviation,
    };

    #[test]
    fn default_model() {
        let model = DampedQubit::new(&Params::default()).unwrap();
        // H(0) = 0.5 σx + 0.5 σz, H(τ) = 0.5 σx - σz
        let h0 = model.hbuilder().build_at(0.0);
        assert_abs_diff_eq!(
            max_deviation(&h0, &((sigma_x() + sigma_z()) * 0.5)), 0.0,
            epsilon = 1e-15,
        );
        let h1 = model.hbuilder().build_at(10.0);
        assert_abs_diff_eq!(
            max_deviation(&h1, &(sigma_x() * 0.5 - sigma_z())), 0.0,
            epsilon = 1e-15,
        );
        assert!(model.hbuilder().build_static().is_none());
        assert_eq!(model.loperator().ops().len(), 2);
        assert_abs_diff_eq!(model.loperator().ops()[1][[0, 1]].re, 0.1_f64.sqrt());
        assert_eq!(model.rho0(), &mixture(0.9));
    }

    #[test]
    fn bad_damping_rejected() {
        let params = Params { damping: 1.01, ..Params::default() };
        assert!(matches!(
            DampedQubit::new(&params),
            Err(Error::InvalidParam { name: "damping", .. }),
        ));
    }
}
