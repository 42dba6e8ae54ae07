//! Error type for the whole crate.

use thiserror::Error;

/// Result alias with [`enum@Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between reading the parameters and writing the
/// final image.
#[derive(Debug, Error)]
pub enum Error {
    /// A simulation or output parameter lies outside of its allowed range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    /// The collapse operators don't satisfy the completeness relation
    /// `Σ_k K_k† K_k = 1`.
    #[error(
        "collapse operators are not trace-preserving: \
        max |Σ K†K - 1| = {0:.3e}"
    )]
    NotTracePreserving(f64),

    /// A matrix handed to the solver is not a valid qubit density matrix.
    #[error("invalid density matrix: {0}")]
    InvalidState(String),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write npz archive: {0}")]
    Npz(#[from] ndarray_npy::WriteNpzError),

    #[error("failed to render figure: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn param<S>(name: &'static str, reason: S) -> Self
    where S: Into<String>
    {
        Self::InvalidParam { name, reason: reason.into() }
    }
}
