use super::ids::AtomId;
use nalgebra::Point3;
use std::fmt;

/// Structural role of a bead within a generated polymer.
///
/// The role is what the generator knows about a bead; the numeric LAMMPS atom type is
/// derived from it by a [`TypeScheme`](crate::engine::config::TypeScheme). Atoms read back
/// from a data file carry [`BeadRole::Other`], since the file format has no notion of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BeadRole {
    /// The central junction every primary arm starts from.
    Core,
    /// An interior bead of an arm or branch.
    Backbone,
    /// The last bead of a finished arm or branch segment.
    Terminal,
    /// A member of a detached ring.
    Ring,
    /// Unclassified bead.
    #[default]
    Other,
}

impl fmt::Display for BeadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Core => "core",
            Self::Backbone => "backbone",
            Self::Terminal => "terminal",
            Self::Ring => "ring",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A single coarse-grained bead.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Sequential 1-based id.
    pub id: AtomId,
    /// LAMMPS molecule id (column 2 of the `Atoms # molecular` section).
    pub molecule_id: u32,
    /// Numeric LAMMPS atom type.
    pub atom_type: u32,
    pub role: BeadRole,
    /// Cartesian position, in the generator's length units.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(
        id: AtomId,
        molecule_id: u32,
        atom_type: u32,
        role: BeadRole,
        position: Point3<f64>,
    ) -> Self {
        Self {
            id,
            molecule_id,
            atom_type,
            role,
            position,
        }
    }

    pub fn distance_to(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_keeps_all_fields() {
        let id = AtomId::new(7).unwrap();
        let atom = Atom::new(id, 2, 1, BeadRole::Terminal, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.id, id);
        assert_eq!(atom.molecule_id, 2);
        assert_eq!(atom.atom_type, 1);
        assert_eq!(atom.role, BeadRole::Terminal);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn distance_between_atoms_is_euclidean() {
        let a = Atom::new(AtomId::new(1).unwrap(), 1, 1, BeadRole::Core, Point3::origin());
        let b = Atom::new(
            AtomId::new(2).unwrap(),
            1,
            1,
            BeadRole::Backbone,
            Point3::new(3.0, 4.0, 0.0),
        );
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn default_role_is_other() {
        assert_eq!(BeadRole::default(), BeadRole::Other);
    }

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(BeadRole::Core.to_string(), "core");
        assert_eq!(BeadRole::Terminal.to_string(), "terminal");
        assert_eq!(BeadRole::Ring.to_string(), "ring");
    }
}
