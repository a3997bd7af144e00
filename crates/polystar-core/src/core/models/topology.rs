use super::ids::{AtomId, BondId};
use std::fmt;

/// The structural tier a bond belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BondTier {
    /// Core-to-bead or bead-to-bead bond along a primary arm.
    Arm,
    /// Bond along a secondary arm sprouting from a primary arm terminus.
    Branch,
    /// Bond closing a detached ring.
    Ring,
    #[default]
    Other,
}

impl fmt::Display for BondTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Arm => "Arm",
                Self::Branch => "Branch",
                Self::Ring => "Ring",
                Self::Other => "Other",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub id: BondId,
    pub bond_type: u32, // Numeric LAMMPS bond type
    pub tier: BondTier,
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
}

impl Bond {
    pub fn new(
        id: BondId,
        bond_type: u32,
        tier: BondTier,
        atom1_id: AtomId,
        atom2_id: AtomId,
    ) -> Self {
        Self {
            id,
            bond_type,
            tier,
            atom1_id,
            atom2_id,
        }
    }
}
