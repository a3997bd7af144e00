use crate::core::io::lammps::{LammpsWriteOptions, MassAssignment};
use crate::core::models::atom::BeadRole;
use crate::core::models::topology::BondTier;
use nalgebra::Vector3;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

const MAX_PRECISION: usize = 12;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}' ({value}): must be {constraint}")]
    InvalidParameter {
        parameter: &'static str,
        constraint: &'static str,
        value: String,
    },
}

fn invalid(
    parameter: &'static str,
    constraint: &'static str,
    value: impl fmt::Display,
) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter,
        constraint,
        value: value.to_string(),
    }
}

/// Whether arms are allowed to leave the xy-plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimensionality {
    /// Every bead has the z coordinate of the core.
    Planar,
    /// Arms, branches and rings receive small out-of-plane lifts that keep overlapping
    /// segments apart.
    #[default]
    Spatial,
}

/// What is attached at the terminal bead of each primary arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmTerminus {
    /// Nothing: a plain star.
    #[default]
    Bare,
    /// `count` secondary arms of `length` beads each, bonded to the primary terminus.
    Branches { count: usize, length: usize },
    /// A ring of `size` atoms placed beyond the terminus and not bonded to it.
    DetachedRing { size: usize },
}

impl ArmTerminus {
    /// Atoms added per arm on top of the arm beads themselves.
    pub fn atoms_per_arm(&self) -> usize {
        match *self {
            Self::Bare => 0,
            Self::Branches { count, length } => count * length,
            Self::DetachedRing { size } => size,
        }
    }

    /// Bonds added per arm on top of the arm bonds themselves.
    pub fn bonds_per_arm(&self) -> usize {
        // Branch beads each bond to a predecessor; a closed ring has as many bonds as atoms.
        self.atoms_per_arm()
    }
}

/// Mapping from structural roles and tiers to numeric LAMMPS types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeScheme {
    /// Junctions and segment ends are type 1, interior and ring beads type 2. Arm bonds are
    /// type 1; branch or ring bonds (never both in one structure) are type 2.
    #[default]
    Structural,
    /// Every atom and bond is type 1.
    Uniform,
}

impl TypeScheme {
    pub fn atom_type(&self, role: BeadRole) -> u32 {
        match self {
            Self::Uniform => 1,
            Self::Structural => match role {
                BeadRole::Core | BeadRole::Terminal => 1,
                BeadRole::Backbone | BeadRole::Ring | BeadRole::Other => 2,
            },
        }
    }

    pub fn bond_type(&self, tier: BondTier) -> u32 {
        match self {
            Self::Uniform => 1,
            Self::Structural => match tier {
                BondTier::Arm | BondTier::Other => 1,
                BondTier::Branch | BondTier::Ring => 2,
            },
        }
    }
}

/// How molecule ids are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoleculeIdScheme {
    /// The whole structure, rings included, is molecule 1.
    #[default]
    Single,
    /// The core is molecule 1; arm `i` (0-based) and everything hanging off it is `i + 2`.
    PerArm,
}

impl MoleculeIdScheme {
    pub fn core_molecule(&self) -> u32 {
        1
    }

    pub fn arm_molecule(&self, arm_index: usize) -> u32 {
        match self {
            Self::Single => 1,
            Self::PerArm => u32::try_from(arm_index + 2).unwrap_or(u32::MAX),
        }
    }
}

/// Where the generated coordinates end up relative to the box `[0, box_size]^3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Centering {
    /// Shift every coordinate by `box_size / 2` so the core sits at the box centre.
    #[default]
    BoxCenter,
    /// Write coordinates exactly as generated, centred on the origin.
    AsBuilt,
}

/// Immutable description of one branched polymer and how to write it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDescriptor {
    pub arms: usize,
    pub arm_length: usize,
    pub terminus: ArmTerminus,
    /// Bond length between consecutive beads.
    pub spacing: f64,
    /// Rotation of the first arm away from +x.
    pub phase_degrees: f64,
    pub dimensionality: Dimensionality,
    pub type_scheme: TypeScheme,
    pub molecule_ids: MoleculeIdScheme,
    /// Edge length of the cubic simulation box.
    pub box_size: f64,
    pub centering: Centering,
    /// Decimal places for coordinates in the data file.
    pub precision: usize,
    pub masses: Option<MassAssignment>,
    pub title: String,
}

impl StructureDescriptor {
    /// Checks every structural and output parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] naming the first offending parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arms < 1 {
            return Err(invalid("arms", "at least 1", self.arms));
        }
        if self.arm_length < 1 {
            return Err(invalid("arm_length", "at least 1", self.arm_length));
        }
        match self.terminus {
            ArmTerminus::Bare => {}
            ArmTerminus::Branches { count, length } => {
                if count > 0 && length < 1 {
                    return Err(invalid(
                        "branch_length",
                        "at least 1 when branches are requested",
                        length,
                    ));
                }
            }
            ArmTerminus::DetachedRing { size } => {
                if size < 3 {
                    return Err(invalid("loop_size", "at least 3 to close a ring", size));
                }
            }
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(invalid("spacing", "a finite number greater than 0", self.spacing));
        }
        if !(self.box_size.is_finite() && self.box_size > 0.0) {
            return Err(invalid("box_size", "a finite number greater than 0", self.box_size));
        }
        if !self.phase_degrees.is_finite() {
            return Err(invalid("phase_degrees", "finite", self.phase_degrees));
        }
        if self.precision > MAX_PRECISION {
            return Err(invalid("precision", "at most 12 decimal places", self.precision));
        }
        if self.title.contains(['\n', '\r']) {
            return Err(invalid("title", "a single line", format!("{:?}", self.title)));
        }
        match &self.masses {
            Some(MassAssignment::Uniform(mass)) if !(mass.is_finite() && *mass > 0.0) => {
                return Err(invalid("masses", "finite and greater than 0", mass));
            }
            Some(MassAssignment::PerType(table)) => {
                for (atom_type, mass) in table {
                    if *atom_type == 0 {
                        return Err(invalid("masses", "keyed by atom types starting at 1", 0));
                    }
                    if !(mass.is_finite() && *mass > 0.0) {
                        return Err(invalid("masses", "finite and greater than 0", mass));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn expected_atom_count(&self) -> usize {
        1 + self.arms * (self.arm_length + self.terminus.atoms_per_arm())
    }

    pub fn expected_bond_count(&self) -> usize {
        self.arms * (self.arm_length + self.terminus.bonds_per_arm())
    }

    /// Number of detached rings the structure contains.
    pub fn ring_count(&self) -> usize {
        match self.terminus {
            ArmTerminus::DetachedRing { .. } => self.arms,
            _ => 0,
        }
    }

    /// One-line human-readable description of the topology.
    pub fn describe(&self) -> String {
        let arms = format!(
            "1 core junction, {} arm{} of {} bead{}",
            self.arms,
            plural(self.arms),
            self.arm_length,
            plural(self.arm_length)
        );
        match self.terminus {
            ArmTerminus::Bare => arms,
            ArmTerminus::Branches { count: 0, .. } => arms,
            ArmTerminus::Branches { count, length } => format!(
                "{}, each ending in {} branch{} of {} bead{}",
                arms,
                count,
                if count == 1 { "" } else { "es" },
                length,
                plural(length)
            ),
            ArmTerminus::DetachedRing { size } => format!(
                "{}, {} detached ring loop{} of {} atoms (not bonded to the arms)",
                arms,
                self.arms,
                plural(self.arms),
                size
            ),
        }
    }

    /// Default first line of the data file for this topology.
    pub fn default_title(&self) -> String {
        match self.terminus {
            ArmTerminus::Branches { count, .. } if count > 0 => {
                "LAMMPS data file for branched tree polymer".to_string()
            }
            ArmTerminus::DetachedRing { .. } => format!(
                "LAMMPS data file - {}-arm polymer with detached terminal loops",
                self.arms
            ),
            _ => format!("LAMMPS data file for {}-arm star polymer", self.arms),
        }
    }

    /// Writer options derived from the output half of the descriptor.
    pub fn write_options(&self) -> LammpsWriteOptions {
        let offset = match self.centering {
            Centering::BoxCenter => Vector3::repeat(self.box_size / 2.0),
            Centering::AsBuilt => Vector3::zeros(),
        };
        LammpsWriteOptions {
            title: self.title.clone(),
            box_size: self.box_size,
            offset,
            precision: self.precision,
            masses: self.masses.clone(),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[derive(Default)]
pub struct StructureDescriptorBuilder {
    arms: Option<usize>,
    arm_length: Option<usize>,
    terminus: Option<ArmTerminus>,
    spacing: Option<f64>,
    phase_degrees: Option<f64>,
    dimensionality: Option<Dimensionality>,
    type_scheme: Option<TypeScheme>,
    molecule_ids: Option<MoleculeIdScheme>,
    box_size: Option<f64>,
    centering: Option<Centering>,
    precision: Option<usize>,
    masses: Option<MassAssignment>,
    title: Option<String>,
}

impl StructureDescriptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arms(mut self, n: usize) -> Self {
        self.arms = Some(n);
        self
    }
    pub fn arm_length(mut self, beads: usize) -> Self {
        self.arm_length = Some(beads);
        self
    }
    pub fn terminus(mut self, terminus: ArmTerminus) -> Self {
        self.terminus = Some(terminus);
        self
    }
    pub fn branches(self, count: usize, length: usize) -> Self {
        self.terminus(ArmTerminus::Branches { count, length })
    }
    pub fn detached_rings(self, size: usize) -> Self {
        self.terminus(ArmTerminus::DetachedRing { size })
    }
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }
    pub fn phase_degrees(mut self, degrees: f64) -> Self {
        self.phase_degrees = Some(degrees);
        self
    }
    pub fn dimensionality(mut self, dimensionality: Dimensionality) -> Self {
        self.dimensionality = Some(dimensionality);
        self
    }
    pub fn type_scheme(mut self, scheme: TypeScheme) -> Self {
        self.type_scheme = Some(scheme);
        self
    }
    pub fn molecule_ids(mut self, scheme: MoleculeIdScheme) -> Self {
        self.molecule_ids = Some(scheme);
        self
    }
    pub fn box_size(mut self, size: f64) -> Self {
        self.box_size = Some(size);
        self
    }
    pub fn centering(mut self, centering: Centering) -> Self {
        self.centering = Some(centering);
        self
    }
    pub fn precision(mut self, places: usize) -> Self {
        self.precision = Some(places);
        self
    }
    pub fn masses(mut self, masses: Option<MassAssignment>) -> Self {
        self.masses = masses;
        self
    }
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn build(self) -> Result<StructureDescriptor, ConfigError> {
        let mut descriptor = StructureDescriptor {
            arms: self.arms.ok_or(ConfigError::MissingParameter("arms"))?,
            arm_length: self
                .arm_length
                .ok_or(ConfigError::MissingParameter("arm_length"))?,
            terminus: self.terminus.unwrap_or_default(),
            spacing: self
                .spacing
                .ok_or(ConfigError::MissingParameter("spacing"))?,
            phase_degrees: self.phase_degrees.unwrap_or(0.0),
            dimensionality: self.dimensionality.unwrap_or_default(),
            type_scheme: self.type_scheme.unwrap_or_default(),
            molecule_ids: self.molecule_ids.unwrap_or_default(),
            box_size: self
                .box_size
                .ok_or(ConfigError::MissingParameter("box_size"))?,
            centering: self.centering.unwrap_or_default(),
            precision: self.precision.unwrap_or(6),
            masses: self.masses,
            title: String::new(),
        };
        descriptor.title = match self.title {
            Some(title) => title,
            None => descriptor.default_title(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
