use crate::core::io::lammps::LammpsFile;
use crate::core::io::traits::{TopologyFile, persist_atomically};
use crate::core::models::system::PolymerSystem;
use crate::engine::builder;
use crate::engine::config::StructureDescriptor;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Counts describing a generated structure, as printed after a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSummary {
    pub atoms: usize,
    pub bonds: usize,
    pub atom_types: usize,
    pub bond_types: usize,
    pub rings: usize,
    pub description: String,
}

impl StructureSummary {
    pub fn of(system: &PolymerSystem, descriptor: &StructureDescriptor) -> Self {
        Self {
            atoms: system.atoms().len(),
            bonds: system.bonds().len(),
            atom_types: system.atom_types().len(),
            bond_types: system.bond_types().len(),
            rings: descriptor.ring_count(),
            description: descriptor.describe(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub path: PathBuf,
    pub summary: StructureSummary,
}

/// Builds the topology and renders the complete data file into memory.
///
/// # Errors
///
/// Returns [`EngineError::InvalidParameter`] for an invalid descriptor and
/// [`EngineError::Render`] when the system cannot be serialized with the requested options
/// (for example a mass table that misses a type).
pub fn render(
    descriptor: &StructureDescriptor,
    reporter: &ProgressReporter,
) -> Result<(PolymerSystem, Vec<u8>), EngineError> {
    let system = builder::build(descriptor, reporter)?;
    reporter.report(Progress::PhaseStart {
        name: "Rendering data file",
    });
    let bytes = LammpsFile::render(&system, &descriptor.write_options())
        .map_err(EngineError::Render)?;
    reporter.report(Progress::PhaseFinish);
    Ok((system, bytes))
}

/// Generates the structure described by `descriptor` and writes it to `path`.
///
/// Nothing is written unless the whole file rendered successfully; the file is then
/// published with a single rename, so `path` never holds a partial data file.
#[instrument(skip_all, name = "generate_workflow", fields(path = %path.display()))]
pub fn run(
    descriptor: &StructureDescriptor,
    path: &Path,
    reporter: &ProgressReporter,
) -> Result<GenerationReport, EngineError> {
    info!("Generating {}.", descriptor.describe());
    let (system, bytes) = render(descriptor, reporter)?;

    persist_atomically(path, &bytes).map_err(|e| EngineError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let summary = StructureSummary::of(&system, descriptor);
    info!(
        atoms = summary.atoms,
        bonds = summary.bonds,
        "Wrote data file {:?}.",
        path
    );
    Ok(GenerationReport {
        path: path.to_path_buf(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::lammps::MassAssignment;
    use crate::engine::config::{
        ArmTerminus, Centering, Dimensionality, StructureDescriptorBuilder, TypeScheme,
    };
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn tree() -> StructureDescriptor {
        StructureDescriptorBuilder::new()
            .arms(3)
            .arm_length(10)
            .branches(2, 10)
            .spacing(1.1)
            .box_size(50.0)
            .precision(4)
            .build()
            .unwrap()
    }

    fn loops() -> StructureDescriptor {
        StructureDescriptorBuilder::new()
            .arms(3)
            .arm_length(3)
            .detached_rings(4)
            .spacing(0.5)
            .box_size(20.0)
            .centering(Centering::AsBuilt)
            .type_scheme(TypeScheme::Uniform)
            .masses(Some(MassAssignment::Uniform(12.011)))
            .build()
            .unwrap()
    }

    #[test]
    fn run_writes_tree_file_with_matching_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.data");
        let report = run(&tree(), &path, &ProgressReporter::silent()).unwrap();
        assert_eq!(report.summary.atoms, 91);
        assert_eq!(report.summary.bonds, 90);
        assert_eq!(report.summary.atom_types, 2);
        assert_eq!(report.summary.rings, 0);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("LAMMPS data file for branched tree polymer\n\n"));
        assert!(text.contains("\n91 atoms\n90 bonds\n0 angles\n0 dihedrals\n0 impropers\n"));
        // Core is shifted to the box centre.
        assert!(text.contains("\n1 1 1 25.0000 25.0000 25.0000\n"));
    }

    #[test]
    fn written_file_reads_back_with_same_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loops.data");
        run(&loops(), &path, &ProgressReporter::silent()).unwrap();
        let (system, header) = LammpsFile::read_from_path(&path).unwrap();
        assert_eq!(header.atoms, 22);
        assert_eq!(header.bonds, 21);
        assert_eq!(header.atom_types, 1);
        assert_eq!(header.bond_types, 1);
        assert_eq!(header.masses, BTreeMap::from([(1, 12.011)]));
        assert_eq!(system.atoms().len(), 22);
        for bond in system.bonds() {
            for end in [bond.atom1_id, bond.atom2_id] {
                assert!((1..=22).contains(&end.get()));
            }
        }
        // As-built coordinates keep the core slightly above the origin.
        assert!((system.atoms()[0].position.z - 0.1).abs() < 1e-9);
    }

    #[test]
    fn rendered_headers_match_built_counts_across_shapes() {
        let termini = [
            ArmTerminus::Bare,
            ArmTerminus::Branches {
                count: 1,
                length: 1,
            },
            ArmTerminus::Branches {
                count: 3,
                length: 2,
            },
            ArmTerminus::DetachedRing { size: 3 },
            ArmTerminus::DetachedRing { size: 7 },
        ];
        for arms in 1..=6 {
            for arm_length in 1..=4 {
                for terminus in termini {
                    for dimensionality in [Dimensionality::Spatial, Dimensionality::Planar] {
                        let descriptor = StructureDescriptorBuilder::new()
                            .arms(arms)
                            .arm_length(arm_length)
                            .terminus(terminus)
                            .spacing(0.8)
                            .dimensionality(dimensionality)
                            .box_size(200.0)
                            .build()
                            .unwrap();
                        let label = descriptor.describe();
                        let (system, bytes) =
                            render(&descriptor, &ProgressReporter::silent()).unwrap();
                        let (atoms, bonds) = (system.atoms().len(), system.bonds().len());
                        assert_eq!(atoms, descriptor.expected_atom_count(), "{label}");
                        assert_eq!(bonds, descriptor.expected_bond_count(), "{label}");

                        let text = String::from_utf8(bytes).unwrap();
                        let counts = format!("\n{atoms} atoms\n{bonds} bonds\n");
                        assert!(text.contains(&counts), "{label}");

                        let (read, header) = LammpsFile::read_from(&mut text.as_bytes()).unwrap();
                        assert_eq!((header.atoms, header.bonds), (atoms, bonds), "{label}");
                        assert_eq!(read.bonds().len(), bonds, "{label}");
                    }
                }
            }
        }
    }

    #[test]
    fn identical_descriptors_render_identical_bytes() {
        let (_, a) = render(&tree(), &ProgressReporter::silent()).unwrap();
        let (_, b) = render(&tree(), &ProgressReporter::silent()).unwrap();
        assert_eq!(a, b);
        let (_, c) = render(&loops(), &ProgressReporter::silent()).unwrap();
        let (_, d) = render(&loops(), &ProgressReporter::silent()).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn invalid_loop_size_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.data");
        let descriptor = StructureDescriptor {
            terminus: crate::engine::config::ArmTerminus::DetachedRing { size: 2 },
            ..loops()
        };
        let err = run(&descriptor, &path, &ProgressReporter::silent()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_mass_fails_before_touching_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.data");
        let descriptor = StructureDescriptor {
            masses: Some(MassAssignment::PerType(BTreeMap::from([(1, 12.011)]))),
            ..tree()
        };
        let err = run(&descriptor, &path, &ProgressReporter::silent()).unwrap_err();
        assert!(matches!(err, EngineError::Render(_)));
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_destination_reports_output_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("tree.data");
        let err = run(&tree(), &path, &ProgressReporter::silent()).unwrap_err();
        match err {
            EngineError::Output { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Output error, got {:?}", other),
        }
    }
}
