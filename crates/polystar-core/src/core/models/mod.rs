//! # Core Models Module
//!
//! Data structures describing a generated polymer: beads (atoms), the bonds between them
//! and the system that owns both.
//!
//! ## Key Components
//!
//! - [`ids`] - 1-based sequential identifiers for atoms and bonds
//! - [`atom`] - A bead with its molecule id, numeric type, structural role and position
//! - [`topology`] - Bonds and the structural tier they belong to
//! - [`system`] - The assembled polymer and the builder that assigns identifiers
//!
//! ## Usage
//!
//! ```
//! use polystar::core::models::atom::BeadRole;
//! use polystar::core::models::system::PolymerSystemBuilder;
//! use polystar::core::models::topology::BondTier;
//! use nalgebra::Point3;
//!
//! let mut builder = PolymerSystemBuilder::new();
//! let core = builder.add_atom(1, 1, BeadRole::Core, Point3::origin());
//! let bead = builder.add_atom(1, 2, BeadRole::Terminal, Point3::new(1.0, 0.0, 0.0));
//! builder.add_bond(1, BondTier::Arm, core, bead).unwrap();
//! let system = builder.build();
//! assert_eq!(system.atoms().len(), 2);
//! ```

pub mod atom;
pub mod ids;
pub mod system;
pub mod topology;
