//! Collection of pre-defined systems.

pub mod damped_qubit;
