#![allow(non_snake_case)]

//! Lindblad dynamics of a single driven qubit under amplitude damping, with
//! the resulting trajectory drawn on the Bloch sphere.

pub mod utils;
pub mod error;
pub mod hilbert;
pub mod bloch;
pub mod dynamics;
pub mod rabi;
pub mod config;
pub mod systems;
pub mod pipeline;
pub mod render;

pub use error::{ Error, Result };
