//! The straight-line run: parameters in, trajectory out.

use std::path::Path;
use itertools::{ Itertools, MinMaxResult };
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::{ debug, info };
use crate::{
    write_npz,
    bloch::{ BlochVector, bloch_series, purity_series },
    config::Params,
    error::Result,
    rabi::lindblad,
    systems::damped_qubit::DampedQubit,
};

/// Solver output and everything derived from it.
#[derive(Clone, Debug)]
pub struct Trajectory {
    /// Time grid.
    pub time: nd::Array1<f64>,
    /// Density matrices, with the last axis corresponding to time.
    pub rho: nd::Array3<C64>,
    /// Bloch vector at each time.
    pub bloch: Vec<BlochVector>,
    /// Purity `Tr(ρ²)` at each time.
    pub purity: nd::Array1<f64>,
}

impl Trajectory {
    /// Post-process a series of density matrices.
    ///
    /// *Panics* if `time` and the last axis of `rho` differ in length.
    pub fn from_states(time: nd::Array1<f64>, rho: nd::Array3<C64>) -> Self {
        if time.len() != rho.shape()[2] {
            panic!("Trajectory::from_states: time and state lengths differ");
        }
        let bloch = bloch_series(&rho);
        let purity = purity_series(&rho);
        Self { time, rho, bloch, purity }
    }

    /// Number of time points.
    pub fn len(&self) -> usize { self.time.len() }

    /// Return `true` if there are no time points.
    pub fn is_empty(&self) -> bool { self.time.is_empty() }

    /// Bloch vectors as an `N x 3` array.
    pub fn bloch_array(&self) -> nd::Array2<f64> {
        nd::Array2::from_shape_fn(
            (self.bloch.len(), 3),
            |(k, j)| <[f64; 3]>::from(self.bloch[k])[j],
        )
    }

    /// Smallest and largest purity along the trajectory.
    pub fn purity_range(&self) -> Option<(f64, f64)> {
        purity_range(self.purity.iter().copied())
    }

    /// Write the time grid, Bloch vectors, purities, and density matrices to
    /// a `.npz` archive.
    pub fn write_npz<P>(&self, path: P) -> Result<()>
    where P: AsRef<Path>
    {
        write_npz!(
            path.as_ref(),
            arrays: {
                "time" => &self.time,
                "bloch" => &self.bloch_array(),
                "purity" => &self.purity,
                "rho" => &self.rho,
            }
        )
    }
}

/// Smallest and largest value of a sequence, ignoring NaNs.
///
/// Returns `None` if no values remain.
pub fn purity_range<I>(vals: I) -> Option<(f64, f64)>
where I: IntoIterator<Item = f64>
{
    let minmax
        = vals.into_iter()
        .filter(|p| !p.is_nan())
        .minmax_by(|l, r| l.total_cmp(r));
    match minmax {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(p) => Some((p, p)),
        MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
    }
}

/// Validate parameters, assemble the model, integrate, and post-process.
pub fn simulate(params: &Params) -> Result<Trajectory> {
    params.validate()?;
    debug!(?params, "parameters");
    let model = DampedQubit::new(params)?;
    let time = params.time_grid();
    info!(steps = params.steps, duration = params.duration, "integrating");
    let rho
        = lindblad::evolve_with(
            model.rho0(),
            model.hbuilder(),
            model.loperator(),
            &time,
            params.max_step,
        )?;
    let traj = Trajectory::from_states(time, rho);
    if let (Some(first), Some(last)) = (traj.bloch.first(), traj.bloch.last()) {
        debug!(%first, %last, "bloch vector endpoints");
    }
    if let Some((lo, hi)) = traj.purity_range() {
        debug!(min = lo, max = hi, "purity range");
    }
    Ok(traj)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::error::Error;

    #[test]
    fn reference_run_starts_at_initial_state() {
        let traj = simulate(&Params::default()).unwrap();
        assert_eq!(traj.len(), 101);
        assert_eq!(traj.rho.shape(), &[2, 2, 101]);
        let r0 = traj.bloch[0];
        assert_abs_diff_eq!(r0.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r0.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r0.z, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(traj.purity[0], 0.82, epsilon = 1e-12);
        for (r, p) in traj.bloch.iter().zip(&traj.purity) {
            assert!(r.norm_sqr() <= 1.0 + 1e-9);
            assert_abs_diff_eq!(r.purity(), *p, epsilon = 1e-10);
        }
        let (lo, hi) = traj.purity_range().unwrap();
        assert!(lo >= 0.5 - 1e-9 && hi <= 1.0 + 1e-9);
        assert!(hi - lo > 1e-3);
    }

    #[test]
    fn no_damping_conserves_purity() {
        let params = Params { damping: 0.0, ..Params::default() };
        let traj = simulate(&params).unwrap();
        for p in traj.purity.iter() {
            assert_abs_diff_eq!(*p, 0.82, epsilon = 1e-7);
        }
        // but the drive still moves the state
        assert!(traj.bloch.iter().any(|r| (r.z - 0.8).abs() > 1e-2));
    }

    #[test]
    fn runs_are_deterministic() {
        let a = simulate(&Params::default()).unwrap();
        let b = simulate(&Params::default()).unwrap();
        assert_eq!(a.rho, b.rho);
        assert_eq!(a.purity, b.purity);
        assert_eq!(a.bloch, b.bloch);
    }

    #[test]
    fn single_step_run() {
        let params = Params { steps: 1, ..Params::default() };
        let traj = simulate(&params).unwrap();
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.purity_range(), Some((traj.purity[0], traj.purity[0])));
    }

    #[test]
    fn invalid_params_rejected() {
        let params = Params { damping: -0.5, ..Params::default() };
        assert!(matches!(
            simulate(&params),
            Err(Error::InvalidParam { name: "damping", .. }),
        ));
        let params = Params { steps: 0, ..Params::default() };
        assert!(matches!(
            simulate(&params),
            Err(Error::InvalidParam { name: "steps", .. }),
        ));
        let params = Params { steps: 2, max_step: 100.0, ..Params::default() };
        assert!(matches!(
            simulate(&params),
            Err(Error::InvalidParam { name: "max_step", .. }),
        ));
    }

    #[test]
    fn range_ignores_nan() {
        assert_eq!(purity_range([0.7, f64::NAN, 0.9, 0.6]), Some((0.6, 0.9)));
        assert_eq!(purity_range(Vec::<f64>::new()), None);
        assert_eq!(purity_range([f64::NAN]), None);
    }

    #[test]
    fn npz_archive() {
        let params = Params { steps: 11, ..Params::default() };
        let traj = simulate(&params).unwrap();
        let bloch = traj.bloch_array();
        assert_eq!(bloch.shape(), &[11, 3]);
        assert_abs_diff_eq!(bloch[[0, 2]], 0.8, epsilon = 1e-12);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("traj.npz");
        traj.write_npz(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
