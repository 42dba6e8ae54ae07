//! Constructs to calculate the quantities that drive the qubit's evolution:
//! the time-dependent Hamiltonian and the dissipative part of the master
//! equation.

pub mod hamiltonians;
pub use hamiltonians::{
    Coefficient,
    HBuild,
    HBuilder,
    HTerm,
    LinearRamp,
};

pub mod lindbladians;
pub use lindbladians::{
    LOp,
    LOperator,
    amplitude_damping,
    check_completeness,
    completeness,
};
