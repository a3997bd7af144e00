//! Reductions over radius of gyration time series written by LAMMPS runs of generated
//! structures.
//!
//! - [`gyration`] loads `<timestep> <Rg>` series and computes equilibrated statistics.
//! - [`gfactor`] compares a branched polymer with an ideal linear chain of equal size.
//! - [`reference`] compares a series against a previously saved reference summary.
//! - [`contraction`] compares two simulated series step by step.

pub mod contraction;
pub mod error;
pub mod gfactor;
pub mod gyration;
pub mod reference;

pub use error::AnalysisError;
