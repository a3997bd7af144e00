use super::atom::{Atom, BeadRole};
use super::ids::{AtomId, BondId};
use super::topology::{Bond, BondTier};
use nalgebra::Point3;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Bond endpoint {0} does not refer to an existing atom")]
    UnknownAtom(AtomId),
    #[error("Bond would connect atom {0} to itself")]
    SelfBond(AtomId),
}

/// A generated (or parsed) polymer: atoms and bonds in creation order.
///
/// The `i`-th atom always carries id `i + 1` and the same holds for bonds, so lookups by id
/// are plain vector indexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolymerSystem {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl PolymerSystem {
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn get_atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id.index())
    }

    pub fn get_bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id.index())
    }

    /// Distinct atom types present, in ascending order.
    pub fn atom_types(&self) -> BTreeSet<u32> {
        self.atoms.iter().map(|a| a.atom_type).collect()
    }

    /// Distinct bond types present, in ascending order.
    pub fn bond_types(&self) -> BTreeSet<u32> {
        self.bonds.iter().map(|b| b.bond_type).collect()
    }

    pub fn atoms_with_role(&self, role: BeadRole) -> impl Iterator<Item = &Atom> {
        self.atoms.iter().filter(move |a| a.role == role)
    }

    pub fn bonds_in_tier(&self, tier: BondTier) -> impl Iterator<Item = &Bond> {
        self.bonds.iter().filter(move |b| b.tier == tier)
    }

    /// Number of bonds touching each atom, indexed by `AtomId::index`.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.atoms.len()];
        for bond in &self.bonds {
            degrees[bond.atom1_id.index()] += 1;
            degrees[bond.atom2_id.index()] += 1;
        }
        degrees
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Accumulates atoms and bonds while assigning sequential ids.
///
/// A builder is owned by exactly one construction pass; the next id is always the current
/// length of the corresponding collection plus one.
#[derive(Debug, Default)]
pub struct PolymerSystemBuilder {
    system: PolymerSystem,
}

impl PolymerSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(atoms: usize, bonds: usize) -> Self {
        Self {
            system: PolymerSystem {
                atoms: Vec::with_capacity(atoms),
                bonds: Vec::with_capacity(bonds),
            },
        }
    }

    pub fn add_atom(
        &mut self,
        molecule_id: u32,
        atom_type: u32,
        role: BeadRole,
        position: Point3<f64>,
    ) -> AtomId {
        let id = AtomId::from_index(self.system.atoms.len());
        self.system
            .atoms
            .push(Atom::new(id, molecule_id, atom_type, role, position));
        id
    }

    /// Adds a bond between two atoms that already exist.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownAtom`] when either endpoint has not been added yet and
    /// [`TopologyError::SelfBond`] when both endpoints are the same atom.
    pub fn add_bond(
        &mut self,
        bond_type: u32,
        tier: BondTier,
        atom1_id: AtomId,
        atom2_id: AtomId,
    ) -> Result<BondId, TopologyError> {
        for endpoint in [atom1_id, atom2_id] {
            if endpoint.index() >= self.system.atoms.len() {
                return Err(TopologyError::UnknownAtom(endpoint));
            }
        }
        if atom1_id == atom2_id {
            return Err(TopologyError::SelfBond(atom1_id));
        }
        let id = BondId::from_index(self.system.bonds.len());
        self.system
            .bonds
            .push(Bond::new(id, bond_type, tier, atom1_id, atom2_id));
        Ok(id)
    }

    pub fn atom_count(&self) -> usize {
        self.system.atoms.len()
    }

    pub fn build(self) -> PolymerSystem {
        self.system
    }
}
