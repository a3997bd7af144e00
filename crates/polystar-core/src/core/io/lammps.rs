use crate::core::io::traits::TopologyFile;
use crate::core::models::atom::BeadRole;
use crate::core::models::ids::AtomId;
use crate::core::models::system::{PolymerSystem, PolymerSystemBuilder};
use crate::core::models::topology::BondTier;
use nalgebra::{Point3, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_TITLE: &str = "LAMMPS data file generated by polystar";

#[derive(Debug, Error)]
pub enum LammpsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: LammpsParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),
    #[error("No mass given for atom type {0}")]
    MissingMass(u32),
}

#[derive(Debug, Error, PartialEq)]
pub enum LammpsParseErrorKind {
    #[error("Invalid integer for {field} (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float for {field} (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("{section} entry needs at least {expected} fields, found {found}")]
    TooFewFields {
        section: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Unrecognized header line '{0}'")]
    UnrecognizedHeader(String),
}

/// How masses are assigned to atom types in the `Masses` section.
#[derive(Debug, Clone, PartialEq)]
pub enum MassAssignment {
    /// Every atom type present gets the same mass.
    Uniform(f64),
    /// Explicit per-type masses; every atom type present must be listed.
    PerType(BTreeMap<u32, f64>),
}

impl MassAssignment {
    pub fn mass_for(&self, atom_type: u32) -> Option<f64> {
        match self {
            Self::Uniform(mass) => Some(*mass),
            Self::PerType(table) => table.get(&atom_type).copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LammpsWriteOptions {
    /// Text of the mandatory first (comment) line.
    pub title: String,
    /// Edge length of the cubic box `[0, box_size]^3`.
    pub box_size: f64,
    /// Translation applied to every coordinate on output.
    pub offset: Vector3<f64>,
    /// Decimal places for coordinates and box bounds.
    pub precision: usize,
    pub masses: Option<MassAssignment>,
}

impl Default for LammpsWriteOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            box_size: 50.0,
            offset: Vector3::zeros(),
            precision: 6,
            masses: None,
        }
    }
}

/// Header information recovered from a data file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LammpsHeader {
    pub title: String,
    pub atoms: usize,
    pub bonds: usize,
    pub atom_types: usize,
    pub bond_types: usize,
    /// `(lo, hi)` for x, y and z.
    pub bounds: [(f64, f64); 3],
    pub masses: BTreeMap<u32, f64>,
}

/// The number of types to declare in the header.
///
/// LAMMPS requires every type id to be `<=` the declared count, so the largest id is used.
/// For the contiguous `1..=k` numbering the generator produces this equals the number of
/// distinct types present.
fn declared_type_count(types: &BTreeSet<u32>, kind: &str) -> usize {
    let max = types.iter().next_back().copied().unwrap_or(0) as usize;
    if max != types.len() {
        warn!(
            "{} types {:?} are not numbered 1..={}; declaring {} types.",
            kind,
            types,
            types.len(),
            max
        );
    }
    max
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

fn parse_int<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<T, LammpsError> {
    value.parse().map_err(|_| LammpsError::Parse {
        line,
        kind: LammpsParseErrorKind::InvalidInt {
            field,
            value: value.into(),
        },
    })
}

fn parse_float(value: &str, field: &'static str, line: usize) -> Result<f64, LammpsError> {
    value.parse().map_err(|_| LammpsError::Parse {
        line,
        kind: LammpsParseErrorKind::InvalidFloat {
            field,
            value: value.into(),
        },
    })
}

fn require_fields<'a>(
    line: &'a str,
    section: &'static str,
    expected: usize,
    line_num: usize,
) -> Result<Vec<&'a str>, LammpsError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < expected {
        return Err(LammpsError::Parse {
            line: line_num,
            kind: LammpsParseErrorKind::TooFewFields {
                section,
                expected,
                found: fields.len(),
            },
        });
    }
    Ok(fields)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Masses,
    Atoms,
    Bonds,
    Skipped,
}

struct RawAtom {
    id: u32,
    molecule_id: u32,
    atom_type: u32,
    position: Point3<f64>,
}

struct RawBond {
    id: u32,
    bond_type: u32,
    atom1: u32,
    atom2: u32,
}

pub struct LammpsFile;

impl LammpsFile {
    fn parse_header_line(
        header: &mut LammpsHeader,
        content: &str,
        line_num: usize,
    ) -> Result<(), LammpsError> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        match fields.as_slice() {
            [n, "atoms"] => header.atoms = parse_int(n, "atom count", line_num)?,
            [n, "bonds"] => header.bonds = parse_int(n, "bond count", line_num)?,
            [n, "atom", "types"] => header.atom_types = parse_int(n, "atom type count", line_num)?,
            [n, "bond", "types"] => header.bond_types = parse_int(n, "bond type count", line_num)?,
            [_, "angles" | "dihedrals" | "impropers"]
            | [_, "angle" | "dihedral" | "improper", "types"] => {}
            [lo, hi, axis_lo, _] if matches!(*axis_lo, "xlo" | "ylo" | "zlo") => {
                let axis = match *axis_lo {
                    "xlo" => 0,
                    "ylo" => 1,
                    _ => 2,
                };
                header.bounds[axis] = (
                    parse_float(lo, "box lower bound", line_num)?,
                    parse_float(hi, "box upper bound", line_num)?,
                );
            }
            _ => {
                return Err(LammpsError::Parse {
                    line: line_num,
                    kind: LammpsParseErrorKind::UnrecognizedHeader(content.to_string()),
                });
            }
        }
        Ok(())
    }

    fn assemble(
        header: &LammpsHeader,
        mut atoms: Vec<RawAtom>,
        mut bonds: Vec<RawBond>,
    ) -> Result<PolymerSystem, LammpsError> {
        if atoms.len() != header.atoms {
            return Err(LammpsError::Inconsistency(format!(
                "Header declares {} atoms but the Atoms section lists {}",
                header.atoms,
                atoms.len()
            )));
        }
        if bonds.len() != header.bonds {
            return Err(LammpsError::Inconsistency(format!(
                "Header declares {} bonds but the Bonds section lists {}",
                header.bonds,
                bonds.len()
            )));
        }

        atoms.sort_unstable_by_key(|a| a.id);
        bonds.sort_unstable_by_key(|b| b.id);

        let mut builder = PolymerSystemBuilder::with_capacity(atoms.len(), bonds.len());
        for (i, raw) in atoms.into_iter().enumerate() {
            if raw.id as usize != i + 1 {
                return Err(LammpsError::Inconsistency(format!(
                    "Atom ids must be 1..={} without gaps (found id {} at position {})",
                    header.atoms,
                    raw.id,
                    i + 1
                )));
            }
            builder.add_atom(raw.molecule_id, raw.atom_type, BeadRole::Other, raw.position);
        }
        for (i, raw) in bonds.into_iter().enumerate() {
            if raw.id as usize != i + 1 {
                return Err(LammpsError::Inconsistency(format!(
                    "Bond ids must be 1..={} without gaps (found id {} at position {})",
                    header.bonds,
                    raw.id,
                    i + 1
                )));
            }
            let endpoint = |raw_id: u32| {
                AtomId::new(raw_id).ok_or_else(|| {
                    LammpsError::Inconsistency(format!("Bond {} references atom 0", raw.id))
                })
            };
            let (a, b) = (endpoint(raw.atom1)?, endpoint(raw.atom2)?);
            builder
                .add_bond(raw.bond_type, BondTier::Other, a, b)
                .map_err(|e| LammpsError::Inconsistency(format!("Bond {}: {}", raw.id, e)))?;
        }
        Ok(builder.build())
    }

    fn write_masses(
        system: &PolymerSystem,
        masses: &MassAssignment,
        writer: &mut impl Write,
    ) -> Result<(), LammpsError> {
        let mut lines = Vec::new();
        for atom_type in system.atom_types() {
            let mass = masses
                .mass_for(atom_type)
                .ok_or(LammpsError::MissingMass(atom_type))?;
            lines.push(format!("{} {}", atom_type, mass));
        }
        writeln!(writer, "Masses\n")?;
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl TopologyFile for LammpsFile {
    type Metadata = LammpsHeader;
    type Options = LammpsWriteOptions;
    type Error = LammpsError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(PolymerSystem, Self::Metadata), Self::Error> {
        let mut header = LammpsHeader::default();
        let mut section = Section::Header;
        let mut seen_atoms_section = false;
        let mut atoms = Vec::new();
        let mut bonds = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            if line_num == 1 {
                header.title = line.trim().to_string();
                continue;
            }

            let content = strip_comment(&line);
            if content.is_empty() {
                continue;
            }

            if content.starts_with(|c: char| c.is_ascii_alphabetic()) {
                section = match content {
                    "Masses" => Section::Masses,
                    "Atoms" => {
                        seen_atoms_section = true;
                        Section::Atoms
                    }
                    "Bonds" => Section::Bonds,
                    other => {
                        debug!("Skipping unsupported section '{}'", other);
                        Section::Skipped
                    }
                };
                continue;
            }

            match section {
                Section::Header => Self::parse_header_line(&mut header, content, line_num)?,
                Section::Masses => {
                    let fields = require_fields(content, "Masses", 2, line_num)?;
                    let atom_type = parse_int(fields[0], "atom type", line_num)?;
                    let mass = parse_float(fields[1], "mass", line_num)?;
                    header.masses.insert(atom_type, mass);
                }
                Section::Atoms => {
                    let fields = require_fields(content, "Atoms", 6, line_num)?;
                    atoms.push(RawAtom {
                        id: parse_int(fields[0], "atom id", line_num)?,
                        molecule_id: parse_int(fields[1], "molecule id", line_num)?,
                        atom_type: parse_int(fields[2], "atom type", line_num)?,
                        position: Point3::new(
                            parse_float(fields[3], "x", line_num)?,
                            parse_float(fields[4], "y", line_num)?,
                            parse_float(fields[5], "z", line_num)?,
                        ),
                    });
                }
                Section::Bonds => {
                    let fields = require_fields(content, "Bonds", 4, line_num)?;
                    bonds.push(RawBond {
                        id: parse_int(fields[0], "bond id", line_num)?,
                        bond_type: parse_int(fields[1], "bond type", line_num)?,
                        atom1: parse_int(fields[2], "bond atom", line_num)?,
                        atom2: parse_int(fields[3], "bond atom", line_num)?,
                    });
                }
                Section::Skipped => {}
            }
        }

        if !seen_atoms_section {
            return Err(LammpsError::MissingSection("Atoms"));
        }
        let system = Self::assemble(&header, atoms, bonds)?;
        Ok((system, header))
    }

    fn write_to(
        system: &PolymerSystem,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let p = options.precision;
        let atom_types = declared_type_count(&system.atom_types(), "Atom");
        let bond_types = declared_type_count(&system.bond_types(), "Bond");

        writeln!(writer, "{}\n", options.title)?;
        writeln!(writer, "{} atoms", system.atoms().len())?;
        writeln!(writer, "{} bonds", system.bonds().len())?;
        writeln!(writer, "0 angles\n0 dihedrals\n0 impropers\n")?;
        writeln!(writer, "{} atom types", atom_types)?;
        writeln!(writer, "{} bond types\n", bond_types)?;

        for axis in ["x", "y", "z"] {
            writeln!(
                writer,
                "{:.*} {:.*} {}lo {}hi",
                p, 0.0, p, options.box_size, axis, axis
            )?;
        }
        writeln!(writer)?;

        if let Some(masses) = &options.masses {
            Self::write_masses(system, masses, writer)?;
        }

        let mut outside = 0usize;
        writeln!(writer, "Atoms # molecular\n")?;
        for atom in system.atoms() {
            let pos = atom.position + options.offset;
            if pos.iter().any(|c| *c < 0.0 || *c > options.box_size) {
                outside += 1;
            }
            writeln!(
                writer,
                "{} {} {} {:.*} {:.*} {:.*}",
                atom.id, atom.molecule_id, atom.atom_type, p, pos.x, p, pos.y, p, pos.z
            )?;
        }
        if outside > 0 {
            warn!(
                "{} of {} atoms lie outside the box [0, {}]; LAMMPS will remap or reject them.",
                outside,
                system.atoms().len(),
                options.box_size
            );
        }

        if !system.bonds().is_empty() {
            writeln!(writer, "\nBonds\n")?;
            for bond in system.bonds() {
                writeln!(
                    writer,
                    "{} {} {} {}",
                    bond.id, bond.bond_type, bond.atom1_id, bond.atom2_id
                )?;
            }
        }
        Ok(())
    }
}
