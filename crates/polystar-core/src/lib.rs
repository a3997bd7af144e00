//! # polystar Core Library
//!
//! A library for generating coarse-grained branched polymer topologies (stars, trees and
//! stars with detached terminal loops) as LAMMPS data files, and for reducing the radius
//! of gyration series produced by simulating them.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that the data model, the construction logic
//! and the user-facing procedures stay separate and individually testable.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PolymerSystem`, `Atom`, `Bond`),
//!   pure geometry helpers and LAMMPS data-file I/O.
//!
//! - **[`engine`]: The Logic Core.** The validated `StructureDescriptor` and the
//!   `TopologyBuilder` that walks arms bead by bead, fans out branches and closes rings.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures such as "generate a data file
//!   from a descriptor" or "inspect an existing data file".
//!
//! - **[`analysis`]: Post-processing.** Radius of gyration statistics and g-factor
//!   (contraction ratio) calculations over simulation output. Nothing in the generator
//!   depends on it.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod workflows;
