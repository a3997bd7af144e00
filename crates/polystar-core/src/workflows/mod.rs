//! # Workflows Module
//!
//! High-level entry points that tie the builder and the data-file layer together.
//!
//! - **Generation** ([`generate`]): validate a descriptor, build the topology, render it
//!   and publish the data file in one atomic step.
//! - **Inspection** ([`inspect`]): read an existing data file back and report its counts
//!   and connectivity.

pub mod generate;
pub mod inspect;
