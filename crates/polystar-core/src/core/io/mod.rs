//! Provides input/output functionality for polymer topology files.
//!
//! Formats implement the [`traits::TopologyFile`] trait. Writing to a path always renders
//! the complete file in memory first and then publishes it with a single rename, so a
//! failed run never leaves a truncated data file behind.

pub mod lammps;
pub mod traits;
