use super::config::{ArmTerminus, Dimensionality, StructureDescriptor};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::atom::BeadRole;
use crate::core::models::ids::AtomId;
use crate::core::models::system::{PolymerSystem, PolymerSystemBuilder};
use crate::core::models::topology::BondTier;
use crate::core::utils::geometry;
use nalgebra::{Point3, Unit, Vector3};
use tracing::{debug, instrument};

/// Distance from the arm terminus to a ring centre, in units of the ring radius.
const RING_STANDOFF: f64 = 1.2;

/// Out-of-plane offsets applied in [`Dimensionality::Spatial`] mode.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpatialProfile {
    core_z: f64,
    arm_lift: f64,
    branch_lift: f64,
    ring_layer: f64,
}

impl SpatialProfile {
    fn for_descriptor(descriptor: &StructureDescriptor) -> Self {
        match descriptor.dimensionality {
            Dimensionality::Planar => Self {
                core_z: 0.0,
                arm_lift: 0.0,
                branch_lift: 0.0,
                ring_layer: 0.0,
            },
            Dimensionality::Spatial => {
                let rings = matches!(descriptor.terminus, ArmTerminus::DetachedRing { .. });
                Self {
                    core_z: if rings { 0.1 } else { 0.0 },
                    arm_lift: if rings { 0.01 } else { 0.0 },
                    branch_lift: 0.5 * descriptor.spacing,
                    ring_layer: 0.05,
                }
            }
        }
    }
}

/// Validates `descriptor` and assembles the full topology it describes.
///
/// Atoms are numbered core first, then arm by arm: the arm beads walking outward, followed
/// by whatever hangs off that arm's terminus. Bonds are numbered in the order they are made.
///
/// # Errors
///
/// Returns [`EngineError::InvalidParameter`] when the descriptor fails validation. No partial
/// structure is produced in that case.
pub fn build(
    descriptor: &StructureDescriptor,
    reporter: &ProgressReporter,
) -> Result<PolymerSystem, EngineError> {
    descriptor.validate()?;
    TopologyBuilder::new(descriptor).run(reporter)
}

struct TopologyBuilder<'d> {
    descriptor: &'d StructureDescriptor,
    profile: SpatialProfile,
    system: PolymerSystemBuilder,
}

impl<'d> TopologyBuilder<'d> {
    fn new(descriptor: &'d StructureDescriptor) -> Self {
        Self {
            descriptor,
            profile: SpatialProfile::for_descriptor(descriptor),
            system: PolymerSystemBuilder::with_capacity(
                descriptor.expected_atom_count(),
                descriptor.expected_bond_count(),
            ),
        }
    }

    #[instrument(skip_all, name = "topology_builder", fields(arms = self.descriptor.arms))]
    fn run(mut self, reporter: &ProgressReporter) -> Result<PolymerSystem, EngineError> {
        let d = self.descriptor;
        reporter.report(Progress::PhaseStart {
            name: "Building topology",
        });

        let core_position = Point3::new(0.0, 0.0, self.profile.core_z);
        let core = self.system.add_atom(
            d.molecule_ids.core_molecule(),
            d.type_scheme.atom_type(BeadRole::Core),
            BeadRole::Core,
            core_position,
        );

        reporter.report(Progress::ArmsStart {
            total: d.arms as u64,
        });
        for arm in 0..d.arms {
            let before = self.system.atom_count();
            self.build_arm(arm, core, &core_position)?;
            let atoms = self.system.atom_count() - before;
            debug!(arm, atoms, "arm assembled");
            reporter.report(Progress::ArmBuilt { index: arm, atoms });
        }
        reporter.report(Progress::ArmsFinish);

        let system = self.system.build();
        reporter.report(Progress::PhaseFinish);

        if system.atoms().len() != d.expected_atom_count()
            || system.bonds().len() != d.expected_bond_count()
        {
            return Err(EngineError::Internal(format!(
                "built {} atoms and {} bonds, expected {} and {}",
                system.atoms().len(),
                system.bonds().len(),
                d.expected_atom_count(),
                d.expected_bond_count()
            )));
        }
        Ok(system)
    }

    fn build_arm(
        &mut self,
        arm: usize,
        core: AtomId,
        core_position: &Point3<f64>,
    ) -> Result<(), EngineError> {
        let d = self.descriptor;
        let angle = geometry::even_spread_degrees(arm, d.arms, d.phase_degrees);
        let direction = geometry::planar_direction(angle);
        let molecule = d.molecule_ids.arm_molecule(arm);
        // Arm lift is measured from z = 0, not from the raised core.
        let arm_origin = Point3::new(core_position.x, core_position.y, 0.0);

        let (terminus, terminus_position) = self.walk_segment(
            core,
            &arm_origin,
            &direction,
            d.arm_length,
            self.profile.arm_lift,
            BondTier::Arm,
            molecule,
        )?;

        match d.terminus {
            ArmTerminus::Bare => {}
            ArmTerminus::Branches { count, length } => {
                for offset in geometry::fan_offsets_degrees(count) {
                    let branch_direction = geometry::planar_direction(angle + offset);
                    self.walk_segment(
                        terminus,
                        &terminus_position,
                        &branch_direction,
                        length,
                        self.profile.branch_lift,
                        BondTier::Branch,
                        molecule,
                    )?;
                }
            }
            ArmTerminus::DetachedRing { size } => {
                self.place_ring(
                    arm,
                    &direction,
                    &terminus_position,
                    core_position.z,
                    size,
                    molecule,
                )?;
            }
        }
        Ok(())
    }

    /// Adds `count` beads walking outward from `anchor`, bonding each to its predecessor.
    /// Returns the last bead and its position.
    #[allow(clippy::too_many_arguments)]
    fn walk_segment(
        &mut self,
        anchor: AtomId,
        anchor_position: &Point3<f64>,
        direction: &Unit<Vector3<f64>>,
        count: usize,
        lift: f64,
        tier: BondTier,
        molecule: u32,
    ) -> Result<(AtomId, Point3<f64>), EngineError> {
        let scheme = self.descriptor.type_scheme;
        let positions = geometry::bead_walk(
            anchor_position,
            direction,
            self.descriptor.spacing,
            lift,
            count,
        );
        let mut previous = (anchor, *anchor_position);
        for (j, position) in positions.into_iter().enumerate() {
            let role = if j + 1 == count {
                BeadRole::Terminal
            } else {
                BeadRole::Backbone
            };
            let bead = self
                .system
                .add_atom(molecule, scheme.atom_type(role), role, position);
            self.system
                .add_bond(scheme.bond_type(tier), tier, previous.0, bead)?;
            previous = (bead, position);
        }
        Ok(previous)
    }

    /// Places a closed ring centred beyond the arm terminus. The ring is not bonded to the arm.
    fn place_ring(
        &mut self,
        arm: usize,
        direction: &Unit<Vector3<f64>>,
        terminus_position: &Point3<f64>,
        core_z: f64,
        size: usize,
        molecule: u32,
    ) -> Result<(), EngineError> {
        let scheme = self.descriptor.type_scheme;
        let radius = geometry::ring_radius(self.descriptor.spacing, size);
        let mut center = terminus_position + direction.into_inner() * (RING_STANDOFF * radius);
        center.z = core_z + self.profile.ring_layer * (arm + 1) as f64;

        let v = geometry::planar_perpendicular(direction);
        let members: Vec<AtomId> = geometry::ring_positions(&center, radius, size, direction, &v)
            .into_iter()
            .map(|position| {
                self.system.add_atom(
                    molecule,
                    scheme.atom_type(BeadRole::Ring),
                    BeadRole::Ring,
                    position,
                )
            })
            .collect();

        let bond_type = scheme.bond_type(BondTier::Ring);
        for (k, &atom) in members.iter().enumerate() {
            let next = members[(k + 1) % members.len()];
            self.system.add_bond(bond_type, BondTier::Ring, atom, next)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::graph::{
        ComponentShape, connected_components, connected_components_excluding,
    };
    use crate::engine::config::{
        ConfigError, MoleculeIdScheme, StructureDescriptorBuilder, TypeScheme,
    };
    use std::sync::Mutex;

    const EPS: f64 = 1e-6;

    fn tree() -> StructureDescriptor {
        StructureDescriptorBuilder::new()
            .arms(3)
            .arm_length(10)
            .branches(2, 10)
            .spacing(1.1)
            .box_size(50.0)
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
            .type_scheme(TypeScheme::Uniform)
            .build()
            .unwrap()
    }

    fn bond_length(system: &PolymerSystem, a: AtomId, b: AtomId) -> f64 {
        let a = system.get_atom(a).unwrap();
        let b = system.get_atom(b).unwrap();
        a.distance_to(b)
    }

    #[test]
    fn tree_example_has_expected_counts() {
        let system = build(&tree(), &ProgressReporter::silent()).unwrap();
        assert_eq!(system.atoms().len(), 91);
        assert_eq!(system.bonds().len(), 90);
        assert_eq!(system.atoms()[0].role, BeadRole::Core);
        assert_eq!(system.atoms()[0].position, Point3::origin());
    }

    #[test]
    fn tree_is_a_single_connected_tree() {
        let system = build(&tree(), &ProgressReporter::silent()).unwrap();
        let components = connected_components(&system);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].shape, ComponentShape::Tree);
        assert_eq!(components[0].atoms.len(), 91);
    }

    #[test]
    fn tree_degrees_match_topology() {
        let system = build(&tree(), &ProgressReporter::silent()).unwrap();
        let degrees = system.degrees();
        assert_eq!(degrees[0], 3);
        let junctions = degrees.iter().filter(|&&d| d == 3).count();
        // core plus one junction per arm
        assert_eq!(junctions, 4);
        let leaves = degrees.iter().filter(|&&d| d == 1).count();
        assert_eq!(leaves, 6);
    }

    #[test]
    fn arm_beads_follow_the_arm_direction() {
        let system = build(&tree(), &ProgressReporter::silent()).unwrap();
        // Arm 1 points at 120 degrees; its beads are atoms 32..=41.
        let first = &system.atoms()[31];
        assert!((first.position.x - 1.1 * (-0.5)).abs() < EPS);
        assert!((first.position.y - 1.1 * 3f64.sqrt() / 2.0).abs() < EPS);
        assert_eq!(first.position.z, 0.0);
        let terminal = &system.atoms()[40];
        assert_eq!(terminal.role, BeadRole::Terminal);
        assert!((terminal.position.coords.norm() - 11.0).abs() < EPS);
    }

    #[test]
    fn spatial_branches_climb_out_of_plane() {
        let system = build(&tree(), &ProgressReporter::silent()).unwrap();
        // First branch of arm 0 starts right after the ten arm beads.
        let branch_start = &system.atoms()[11];
        assert!((branch_start.position.z - 0.55).abs() < EPS);
        let branch_end = &system.atoms()[20];
        assert!((branch_end.position.z - 5.5).abs() < EPS);
        assert_eq!(branch_end.role, BeadRole::Terminal);
    }

    #[test]
    fn planar_structures_stay_in_plane_with_uniform_bond_lengths() {
        for descriptor in [tree(), loops()] {
            let planar = StructureDescriptor {
                dimensionality: Dimensionality::Planar,
                ..descriptor
            };
            let system = build(&planar, &ProgressReporter::silent()).unwrap();
            assert!(system.atoms().iter().all(|a| a.position.z == 0.0));
            for bond in system.bonds() {
                let len = bond_length(&system, bond.atom1_id, bond.atom2_id);
                assert!((len - planar.spacing).abs() < EPS, "bond {} has length {}", bond.id, len);
            }
        }
    }

    #[test]
    fn loops_example_has_expected_counts_and_components() {
        let system = build(&loops(), &ProgressReporter::silent()).unwrap();
        assert_eq!(system.atoms().len(), 22);
        assert_eq!(system.bonds().len(), 21);

        let components = connected_components(&system);
        assert_eq!(components.len(), 4);
        assert_eq!(components[0].shape, ComponentShape::Tree);
        assert_eq!(components[0].atoms.len(), 10);
        for ring in &components[1..] {
            assert_eq!(ring.shape, ComponentShape::Ring);
            assert_eq!(ring.atoms.len(), 4);
            assert_eq!(ring.bond_count, 4);
        }
    }

    #[test]
    fn ring_chords_equal_spacing_and_rings_float_free() {
        let system = build(&loops(), &ProgressReporter::silent()).unwrap();
        for bond in system.bonds_in_tier(BondTier::Ring) {
            let len = bond_length(&system, bond.atom1_id, bond.atom2_id);
            assert!((len - 0.5).abs() < EPS);
            for end in [bond.atom1_id, bond.atom2_id] {
                assert_eq!(system.get_atom(end).unwrap().role, BeadRole::Ring);
            }
        }
        for bond in system.bonds_in_tier(BondTier::Arm) {
            for end in [bond.atom1_id, bond.atom2_id] {
                assert_ne!(system.get_atom(end).unwrap().role, BeadRole::Ring);
            }
        }
    }

    #[test]
    fn rings_sit_on_separate_layers() {
        let system = build(&loops(), &ProgressReporter::silent()).unwrap();
        assert!((system.atoms()[0].position.z - 0.1).abs() < EPS);
        let ring_z: Vec<f64> = system
            .atoms_with_role(BeadRole::Ring)
            .map(|a| a.position.z)
            .collect();
        assert_eq!(ring_z.len(), 12);
        for (arm, layer) in ring_z.chunks(4).enumerate() {
            let expected = 0.1 + 0.05 * (arm + 1) as f64;
            assert!(layer.iter().all(|z| (z - expected).abs() < EPS));
        }
    }

    #[test]
    fn spatial_ring_arms_lift_from_the_plane() {
        let system = build(&loops(), &ProgressReporter::silent()).unwrap();
        let arm_z: Vec<f64> = system.atoms()[1..4].iter().map(|a| a.position.z).collect();
        for (z, expected) in arm_z.iter().zip([0.01, 0.02, 0.03]) {
            assert!((z - expected).abs() < EPS, "arm bead at z = {z}, expected {expected}");
        }
    }

    #[test]
    fn uniform_scheme_uses_a_single_type() {
        let system = build(&loops(), &ProgressReporter::silent()).unwrap();
        assert_eq!(system.atom_types().into_iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(system.bond_types().into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn structural_scheme_uses_two_dense_types() {
        let system = build(&tree(), &ProgressReporter::silent()).unwrap();
        assert_eq!(system.atom_types().into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(system.bond_types().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn per_arm_molecules_cover_arm_attachments() {
        let descriptor = StructureDescriptor {
            molecule_ids: MoleculeIdScheme::PerArm,
            ..loops()
        };
        let system = build(&descriptor, &ProgressReporter::silent()).unwrap();
        assert_eq!(system.atoms()[0].molecule_id, 1);
        // Arm 0 owns atoms 2..=8 (three arm beads and a four-atom ring).
        assert!(system.atoms()[1..8].iter().all(|a| a.molecule_id == 2));
        assert!(system.atoms()[15..22].iter().all(|a| a.molecule_id == 4));
    }

    #[test]
    fn single_arm_bare_star_is_a_chain() {
        let descriptor = StructureDescriptorBuilder::new()
            .arms(1)
            .arm_length(1)
            .spacing(1.0)
            .box_size(10.0)
            .build()
            .unwrap();
        let system = build(&descriptor, &ProgressReporter::silent()).unwrap();
        assert_eq!(system.atoms().len(), 2);
        assert_eq!(system.bonds().len(), 1);
        assert_eq!(system.atoms()[1].role, BeadRole::Terminal);
    }

    fn sweep_descriptors() -> Vec<StructureDescriptor> {
        let termini = [
            ArmTerminus::Bare,
            ArmTerminus::Branches {
                count: 1,
                length: 1,
            },
            ArmTerminus::Branches {
                count: 2,
                length: 3,
            },
            ArmTerminus::Branches {
                count: 3,
                length: 2,
            },
            ArmTerminus::DetachedRing { size: 3 },
            ArmTerminus::DetachedRing { size: 7 },
        ];
        let mut descriptors = Vec::new();
        for arms in 1..=6 {
            for arm_length in 1..=4 {
                for terminus in termini {
                    for dimensionality in [Dimensionality::Spatial, Dimensionality::Planar] {
                        descriptors.push(
                            StructureDescriptorBuilder::new()
                                .arms(arms)
                                .arm_length(arm_length)
                                .terminus(terminus)
                                .spacing(0.8)
                                .dimensionality(dimensionality)
                                .box_size(200.0)
                                .build()
                                .unwrap(),
                        );
                    }
                }
            }
        }
        descriptors
    }

    #[test]
    fn every_shape_in_the_sweep_has_consistent_topology() {
        for descriptor in sweep_descriptors() {
            let label = descriptor.describe();
            let system = build(&descriptor, &ProgressReporter::silent()).unwrap();
            let n = system.atoms().len();
            assert_eq!(n, descriptor.expected_atom_count(), "{label}");
            assert_eq!(system.bonds().len(), descriptor.expected_bond_count(), "{label}");

            for bond in system.bonds() {
                for end in [bond.atom1_id, bond.atom2_id] {
                    assert!((1..=n).contains(&(end.get() as usize)), "{label}: bond {}", bond.id);
                }
                let ring_ends = [bond.atom1_id, bond.atom2_id]
                    .iter()
                    .filter(|&&end| system.get_atom(end).unwrap().role == BeadRole::Ring)
                    .count();
                assert_ne!(ring_ends, 1, "{label}: bond {} crosses into a ring", bond.id);
            }

            let ring_atoms = system.atoms_with_role(BeadRole::Ring).count();
            let backbone = connected_components_excluding(&system, BondTier::Ring);
            let trees: Vec<_> = backbone.iter().filter(|c| c.atoms.len() > 1).collect();
            assert_eq!(trees.len(), 1, "{label}");
            assert_eq!(trees[0].shape, ComponentShape::Tree, "{label}");
            assert_eq!(trees[0].atoms.len(), n - ring_atoms, "{label}");
            assert_eq!(backbone.len(), 1 + ring_atoms, "{label}");

            let components = connected_components(&system);
            match descriptor.terminus {
                ArmTerminus::DetachedRing { size } => {
                    assert_eq!(components.len(), 1 + descriptor.arms, "{label}");
                    for ring in &components[1..] {
                        assert_eq!(ring.shape, ComponentShape::Ring, "{label}");
                        assert_eq!(ring.atoms.len(), size, "{label}");
                        assert_eq!(ring.bond_count, size, "{label}");
                    }
                    for bond in system.bonds_in_tier(BondTier::Ring) {
                        let len = bond_length(&system, bond.atom1_id, bond.atom2_id);
                        assert!((len - descriptor.spacing).abs() < EPS, "{label}: chord {len}");
                    }
                }
                _ => assert_eq!(components.len(), 1, "{label}"),
            }
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let a = build(&tree(), &ProgressReporter::silent()).unwrap();
        let b = build(&tree(), &ProgressReporter::silent()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_descriptor_is_rejected_before_building() {
        let descriptor = StructureDescriptor {
            terminus: ArmTerminus::DetachedRing { size: 2 },
            ..loops()
        };
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| seen.lock().unwrap().push(e)));
        let err = build(&descriptor, &reporter).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter(ConfigError::InvalidParameter {
                parameter: "loop_size",
                ..
            })
        ));
        drop(reporter);
        assert!(seen.into_inner().unwrap().is_empty());
    }

    #[test]
    fn reports_one_event_per_arm() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| seen.lock().unwrap().push(e)));
        build(&loops(), &reporter).unwrap();
        drop(reporter);
        let events = seen.into_inner().unwrap();
        assert_eq!(
            events.first(),
            Some(&Progress::PhaseStart {
                name: "Building topology"
            })
        );
        assert_eq!(events.last(), Some(&Progress::PhaseFinish));
        let built: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Progress::ArmBuilt { index, atoms } => Some((*index, *atoms)),
                _ => None,
            })
            .collect();
        assert_eq!(built, vec![(0, 7), (1, 7), (2, 7)]);
    }
}
