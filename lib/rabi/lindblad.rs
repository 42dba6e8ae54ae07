//! Evolution functions for the Lindblad equation.

use super::*;
use crate::hilbert::check_density;

/// Tolerance used to validate the initial density matrix.
pub const DENSITY_TOL: f64 = 1e-10;

/// Tolerance used to validate every integrated density matrix.
pub const OUTPUT_TOL: f64 = 1e-6;

/// Largest number of internal steps a single integration may take.
pub const MAX_SUBSTEPS: f64 = 1e8;

fn rhs<L>(
    h: &nd::Array2<C64>,
    l: &L,
    rho: &nd::Array2<C64>,
) -> nd::Array2<C64>
where L: LOp
{
    -C64::i() * commutator(h, rho) + l.op(rho)
}

/// Numerically integrate the Lindblad equation for a time-dependent
/// Hamiltonian given by a function.
///
/// Returns one density matrix per element of `t`, stacked along the last axis;
/// the first is `rho0` itself. No input validation is performed.
pub fn evolve_fn<H, L>(
    rho0: &nd::Array2<C64>,
    H: H,
    L: &L,
    t: &nd::Array1<f64>,
    max_step: f64,
) -> nd::Array3<C64>
where
    H: Fn(f64) -> nd::Array2<C64>,
    L: LOp,
{
    do_evolve_fn(rho0, H, |h, rho| rhs(h, L, rho), t, max_step)
}

/// Numerically integrate the Lindblad equation for a Hamiltonian with the
/// functional interface of [`HBuild`].
///
/// Time-independent Hamiltonians are built only once. Fails if `rho0` is not a
/// valid density matrix of the right size, if the time grid is empty or not
/// strictly increasing, if `max_step` is not positive or would need more than
/// [`MAX_SUBSTEPS`] internal steps, or if any integrated state is no longer a
/// valid density matrix to within [`OUTPUT_TOL`].
pub fn evolve_with<HB, L>(
    rho0: &nd::Array2<C64>,
    hbuilder: &HB,
    loperator: &L,
    t: &nd::Array1<f64>,
    max_step: f64,
) -> Result<nd::Array3<C64>>
where
    HB: HBuild,
    L: LOp,
{
    check_density(rho0, DENSITY_TOL)?;
    if rho0.nrows() != hbuilder.dim() {
        return Err(Error::InvalidState(
            format!(
                "initial state has dimension {} but the Hamiltonian has {}",
                rho0.nrows(),
                hbuilder.dim(),
            )
        ));
    }
    check_time_grid(t)?;
    if !(max_step.is_finite() && max_step > 0.0) {
        return Err(Error::param(
            "max_step", format!("must be positive, got {}", max_step)));
    }
    let total: f64
        = array_diff(t).iter()
        .map(|dtk| (dtk / max_step).ceil().max(1.0))
        .sum();
    if total > MAX_SUBSTEPS {
        return Err(Error::param(
            "max_step",
            format!("{} needs {:.3e} internal steps", max_step, total),
        ));
    }
    let res
        = if let Some(H) = hbuilder.build_static() {
            evolve_fn(rho0, |_| H.clone(), loperator, t, max_step)
        } else {
            evolve_fn(rho0, |t| hbuilder.build_at(t), loperator, t, max_step)
        };
    for (rho_k, tk) in res.axis_iter(nd::Axis(2)).zip(t) {
        if let Err(Error::InvalidState(reason)) = check_density(&rho_k, OUTPUT_TOL) {
            return Err(Error::InvalidState(
                format!(
                    "integration became unstable at t = {}: {}; \
                    reduce max_step",
                    tk, reason,
                )
            ));
        }
    }
    Ok(res)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::{
        bloch::{ bloch_series, purity_series },
        dynamics::{ HBuilder, LOperator, LinearRamp, amplitude_damping },
        hilbert::{
            Qubit,
            dagger,
            max_deviation,
            mixture,
            sigma_plus,
            sigma_x,
            sigma_z,
            trace,
        },
    };

    #[test]
    fn rabi_oscillation() {
        // H = Ω/2 σx from |0⟩: P0(t) = cos²(Ω t / 2)
        let omega: f64 = 2.0;
        let hb = HBuilder::new(sigma_x() * (omega / 2.0));
        let lop = LOperator::new([]);
        let t = nd::Array1::linspace(0.0, 3.0, 31);
        let rho = evolve_with(&mixture(1.0), &hb, &lop, &t, 0.01).unwrap();
        for (k, tk) in t.iter().enumerate() {
            let p0 = (omega * tk / 2.0).cos().powi(2);
            assert_abs_diff_eq!(rho[[0, 0, k]].re, p0, epsilon = 1e-8);
        }
    }

    #[test]
    fn spontaneous_decay() {
        // D[√γ σ+] from |1⟩: P1(t) = exp(-γ t)
        let gamma: f64 = 0.5;
        let hb = HBuilder::new(nd::Array2::zeros((2, 2)));
        let lop = LOperator::new([sigma_plus() * gamma.sqrt()]);
        let t = nd::Array1::linspace(0.0, 4.0, 41);
        let rho = evolve_with(&Qubit::Q1.projector(), &hb, &lop, &t, 0.01).unwrap();
        for (k, tk) in t.iter().enumerate() {
            assert_abs_diff_eq!(rho[[1, 1, k]].re, (-gamma * tk).exp(), epsilon = 1e-9);
        }
    }

    #[test]
    fn states_stay_physical() {
        let hb = HBuilder::new(sigma_x() * 0.5)
            .with_term(sigma_z(), LinearRamp::new(0.5, -1.0, 10.0));
        let lop = LOperator::new(amplitude_damping(0.1).unwrap());
        let t = nd::Array1::linspace(0.0, 10.0, 101);
        let rho = evolve_with(&mixture(0.9), &hb, &lop, &t, 0.01).unwrap();
        assert_eq!(rho.shape(), &[2, 2, 101]);
        for rho_t in rho.axis_iter(nd::Axis(2)) {
            assert_abs_diff_eq!(trace(&rho_t).re, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(max_deviation(&rho_t, &dagger(&rho_t)), 0.0, epsilon = 1e-10);
        }
        for (r, p) in bloch_series(&rho).iter().zip(&purity_series(&rho)) {
            assert!(r.norm_sqr() <= 1.0 + 1e-9);
            assert_abs_diff_eq!(r.purity(), *p, epsilon = 1e-10);
        }
    }

    #[test]
    fn single_point_grid() {
        let hb = HBuilder::new(sigma_x());
        let lop = LOperator::new(amplitude_damping(0.1).unwrap());
        let rho = evolve_with(&mixture(0.9), &hb, &lop, &nd::array![0.0], 0.01)
            .unwrap();
        assert_eq!(rho.shape(), &[2, 2, 1]);
        assert_eq!(rho.slice(nd::s![.., .., 0]), mixture(0.9));
    }

    #[test]
    fn rejects_bad_inputs() {
        let hb = HBuilder::new(sigma_x());
        let lop = LOperator::new([]);
        let t = nd::Array1::linspace(0.0, 1.0, 11);
        assert!(matches!(
            evolve_with(&(mixture(0.5) * 2.0), &hb, &lop, &t, 0.01),
            Err(Error::InvalidState(_)),
        ));
        assert!(matches!(
            evolve_with(&nd::Array2::eye(3), &hb, &lop, &t, 0.01),
            Err(Error::InvalidState(_)),
        ));
        assert!(matches!(
            evolve_with(&mixture(0.5), &hb, &lop, &t, 0.0),
            Err(Error::InvalidParam { name: "max_step", .. }),
        ));
        assert!(matches!(
            evolve_with(&mixture(0.5), &hb, &lop, &t.slice(nd::s![..;-1]).to_owned(), 0.01),
            Err(Error::InvalidParam { name: "time", .. }),
        ));
        assert!(matches!(
            evolve_with(&mixture(0.5), &hb, &lop, &nd::array![0.0, 1e9], 1e-3),
            Err(Error::InvalidParam { name: "max_step", .. }),
        ));
    }

    #[test]
    fn coarse_steps_detected() {
        // a single RK4 step across the whole ramp leaves the Bloch ball
        let hb = HBuilder::new(sigma_x() * 0.5)
            .with_term(sigma_z(), LinearRamp::new(0.5, -1.0, 10.0));
        let lop = LOperator::new(amplitude_damping(0.1).unwrap());
        let t = nd::array![0.0, 10.0];
        assert!(matches!(
            evolve_with(&mixture(0.9), &hb, &lop, &t, 100.0),
            Err(Error::InvalidState(_)),
        ));
        assert!(evolve_with(&mixture(0.9), &hb, &lop, &t, 0.01).is_ok());
    }
}
