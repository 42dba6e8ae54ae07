//! Run parameters: physical constants of the model and where to put the
//! results.
//!
//! Every value has a compiled-in default reproducing the reference run. A TOML
//! file can override any subset of them:
//! ```toml
//! [params]
//! damping = 0.2
//! steps = 201
//!
//! [output]
//! image = "out/damping.png"
//! data = ""   # don't write the npz archive
//! ```

use std::path::{ Path, PathBuf };
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use tracing::debug;
use crate::{
    dynamics::LinearRamp,
    error::{ Error, Result },
};

/// File name looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "qubit_amplitude_damping.toml";

/// Smallest accepted internal integration step.
pub const MIN_STEP: f64 = 1e-6;

/// Largest accepted internal integration step; coarser RK4 steps lose
/// stability for drives of order unity.
pub const MAX_STEP: f64 = 0.1;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub params: Params,
    pub output: Output,
}

impl Config {
    /// Parse a configuration from a TOML string, filling in defaults for
    /// anything missing.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a configuration file.
    ///
    /// With `None`, or a path that doesn't exist, the defaults are returned.
    /// The result is validated either way.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config
            = match config_path {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "reading config");
                    Self::from_toml_str(&std::fs::read_to_string(path)?)?
                },
                _ => Self::default(),
            };
        config.validate()?;
        Ok(config)
    }

    /// Check every value for consistency.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Physical parameters of the driven, damped qubit and of the time grid.
///
/// The Hamiltonian is `H(t) = J σx + Δ(t) σz`, with `Δ` ramping linearly from
/// `-hz / 2` at `t = 0` to `hz` at `t = τ`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// Coupling `J` of the `σx` term.
    pub coupling: f64,
    /// Field strength `hz` setting the endpoints of the `σz` ramp.
    pub field: f64,
    /// Total evolution time `τ`.
    pub duration: f64,
    /// Amplitude-damping probability `p`; must lie in `[0, 1]`.
    pub damping: f64,
    /// Number of points `nts` in the time grid, endpoints included.
    pub steps: usize,
    /// Initial population `p0` of `|0⟩`; the initial state is
    /// `diag(p0, 1 - p0)`.
    pub initial_population: f64,
    /// Largest internal integration step.
    pub max_step: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            coupling: 0.5,
            field: -1.0,
            duration: 10.0,
            damping: 0.1,
            steps: 101,
            initial_population: 0.9,
            max_step: 0.01,
        }
    }
}

fn finite(name: &'static str, x: f64) -> Result<f64> {
    x.is_finite().then_some(x)
        .ok_or_else(|| Error::param(name, format!("must be finite, got {}", x)))
}

impl Params {
    /// Check all parameters, rejecting (not clamping) out-of-range values.
    pub fn validate(&self) -> Result<()> {
        finite("coupling", self.coupling)?;
        finite("field", self.field)?;
        if finite("duration", self.duration)? <= 0.0 {
            return Err(Error::param(
                "duration", format!("must be positive, got {}", self.duration)));
        }
        if !(0.0..=1.0).contains(&finite("damping", self.damping)?) {
            return Err(Error::param(
                "damping", format!("must lie in [0, 1], got {}", self.damping)));
        }
        if self.steps < 1 {
            return Err(Error::param("steps", "must be at least 1"));
        }
        let p0 = finite("initial_population", self.initial_population)?;
        if !(0.0..=1.0).contains(&p0) {
            return Err(Error::param(
                "initial_population",
                format!("must lie in [0, 1], got {}", p0),
            ));
        }
        if !(MIN_STEP..=MAX_STEP).contains(&finite("max_step", self.max_step)?) {
            return Err(Error::param(
                "max_step",
                format!(
                    "must lie in [{:e}, {}], got {}",
                    MIN_STEP, MAX_STEP, self.max_step,
                ),
            ));
        }
        Ok(())
    }

    /// Linear ramp of the `σz` coefficient, from `-hz / 2` to `hz` over `τ`.
    pub fn detuning(&self) -> LinearRamp {
        LinearRamp::new(-0.5 * self.field, self.field, self.duration)
    }

    /// Evenly spaced time grid `[0, τ]` with `steps` points.
    pub fn time_grid(&self) -> nd::Array1<f64> {
        nd::Array1::linspace(0.0, self.duration, self.steps)
    }
}

/// Output locations and figure size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Output {
    /// Path of the rendered PNG.
    pub image: PathBuf,
    /// Path of the `.npz` data archive; empty to skip it.
    pub data: PathBuf,
    /// Figure width in pixels.
    pub width: u32,
    /// Figure height in pixels.
    pub height: u32,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            image: PathBuf::from("qubit_amplitude_damping.png"),
            data: PathBuf::from("qubit_amplitude_damping.npz"),
            width: 800,
            height: 800,
        }
    }
}

impl Output {
    pub fn validate(&self) -> Result<()> {
        if self.image.as_os_str().is_empty() {
            return Err(Error::param("image", "output image path is empty"));
        }
        if self.width < 100 || self.height < 100 {
            return Err(Error::param(
                "width/height",
                format!(
                    "figure must be at least 100x100, got {}x{}",
                    self.width, self.height,
                ),
            ));
        }
        Ok(())
    }

    /// Path of the data archive, if one should be written.
    pub fn data_path(&self) -> Option<&Path> {
        (!self.data.as_os_str().is_empty()).then_some(self.data.as_path())
    }
}
