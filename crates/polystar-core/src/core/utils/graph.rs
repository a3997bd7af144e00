use crate::core::models::ids::AtomId;
use crate::core::models::system::PolymerSystem;
use crate::core::models::topology::{Bond, BondTier};
use std::collections::BTreeMap;
use std::fmt;

/// Topological classification of one connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentShape {
    /// A single atom with no bonds.
    Isolated,
    /// Connected and acyclic: `bonds == atoms - 1`.
    Tree,
    /// Exactly one simple cycle through every atom: `bonds == atoms` and all degrees are 2.
    Ring,
    /// Anything else (multiple cycles, or a cycle with hanging chains).
    Cyclic,
}

impl fmt::Display for ComponentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Isolated => "isolated",
            Self::Tree => "tree",
            Self::Ring => "ring",
            Self::Cyclic => "cyclic",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Member atoms in ascending id order.
    pub atoms: Vec<AtomId>,
    pub bond_count: usize,
    pub shape: ComponentShape,
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Returns `false` when both elements were already in the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// Splits the bond graph of `system` into connected components, ordered by their
/// lowest atom id.
pub fn connected_components(system: &PolymerSystem) -> Vec<Component> {
    components_of(system, system.bonds().iter())
}

/// Same as [`connected_components`], ignoring bonds of the given tier.
pub fn connected_components_excluding(system: &PolymerSystem, tier: BondTier) -> Vec<Component> {
    components_of(system, system.bonds().iter().filter(|b| b.tier != tier))
}

fn components_of<'a>(
    system: &PolymerSystem,
    bonds: impl Iterator<Item = &'a Bond> + Clone,
) -> Vec<Component> {
    let n = system.atoms().len();
    let mut set = DisjointSet::new(n);
    let mut degrees = vec![0usize; n];
    for bond in bonds.clone() {
        let (a, b) = (bond.atom1_id.index(), bond.atom2_id.index());
        set.union(a, b);
        degrees[a] += 1;
        degrees[b] += 1;
    }

    let mut groups: BTreeMap<usize, (Vec<AtomId>, usize)> = BTreeMap::new();
    let mut root_order: Vec<usize> = Vec::new();
    for atom in system.atoms() {
        let root = set.find(atom.id.index());
        let entry = groups.entry(root).or_insert_with(|| {
            root_order.push(root);
            (Vec::new(), 0)
        });
        entry.0.push(atom.id);
    }
    for bond in bonds {
        let root = set.find(bond.atom1_id.index());
        if let Some(entry) = groups.get_mut(&root) {
            entry.1 += 1;
        }
    }

    root_order
        .into_iter()
        .filter_map(|root| groups.remove(&root))
        .map(|(atoms, bond_count)| {
            let shape = classify(&atoms, bond_count, &degrees);
            Component {
                atoms,
                bond_count,
                shape,
            }
        })
        .collect()
}

fn classify(atoms: &[AtomId], bond_count: usize, degrees: &[usize]) -> ComponentShape {
    if bond_count == 0 {
        ComponentShape::Isolated
    } else if bond_count + 1 == atoms.len() {
        ComponentShape::Tree
    } else if bond_count == atoms.len() && atoms.iter().all(|id| degrees[id.index()] == 2) {
        ComponentShape::Ring
    } else {
        ComponentShape::Cyclic
    }
}
