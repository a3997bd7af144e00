//! # Core Module
//!
//! Fundamental building blocks shared by the generator and the inspection tools.
//!
//! ## Architecture
//!
//! - **Polymer Representation** ([`models`]) - Atoms, bonds, sequential identifiers and the
//!   assembled `PolymerSystem`
//! - **File I/O** ([`io`]) - Reading and writing the LAMMPS data-file subset used here
//! - **Utilities** ([`utils`]) - Bead-walk and ring geometry, graph connectivity and mass presets

pub mod io;
pub mod models;
pub mod utils;
