mod defaults;

pub use defaults::{DefaultsConfig, Preset};

use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use polystar::core::io::lammps::MassAssignment;
use polystar::core::utils::masses;
use polystar::engine::config::{
    self as core_config, ArmTerminus, Dimensionality, MoleculeIdScheme, StructureDescriptor,
    StructureDescriptorBuilder,
};
use polystar::engine::error::EngineError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::de::IntoDeserializer;
use serde::de::value::StrDeserializer;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum TerminusKind {
    Bare,
    Branches,
    DetachedRing,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialTerminusConfig {
    #[serde(rename = "type")]
    kind: Option<TerminusKind>,
    count: Option<usize>,
    length: Option<usize>,
    size: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialStructureConfig {
    arms: Option<usize>,
    #[serde(rename = "arm-length")]
    arm_length: Option<usize>,
    spacing: Option<f64>,
    #[serde(rename = "phase-deg")]
    phase_deg: Option<f64>,
    dimensionality: Option<Dimensionality>,
    terminus: Option<PartialTerminusConfig>,
}

/// Either a preset name, one mass for every type, or a `{ type = mass }` table.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum PartialMasses {
    Uniform(f64),
    Named(String),
    Table(BTreeMap<String, f64>),
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    #[serde(rename = "box-size")]
    box_size: Option<f64>,
    centering: Option<core_config::Centering>,
    #[serde(rename = "coordinate-precision")]
    coordinate_precision: Option<usize>,
    #[serde(rename = "molecule-ids")]
    molecule_ids: Option<MoleculeIdScheme>,
    #[serde(rename = "type-scheme")]
    type_scheme: Option<core_config::TypeScheme>,
    masses: Option<PartialMasses>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialGenerateConfig {
    title: Option<String>,
    structure: Option<PartialStructureConfig>,
    output: Option<PartialOutputConfig>,
}

impl PartialGenerateConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the final descriptor. Precedence, highest first: command-line flags,
    /// `-S` overrides, the config file, then the preset.
    pub fn merge_with_cli(mut self, args: &GenerateArgs) -> Result<StructureDescriptor> {
        self.apply_set_values(&args.set_values)?;

        let preset = args.preset.unwrap_or_default();
        debug!("Starting from the '{:?}' preset.", preset);
        let defaults = DefaultsConfig::for_preset(preset);
        let structure = self.structure.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let terminus = Self::merge_terminus(defaults.terminus, structure.terminus, args)?;

        let dimensionality = if args.dimensionality.planar {
            Dimensionality::Planar
        } else if args.dimensionality.spatial {
            Dimensionality::Spatial
        } else {
            structure.dimensionality.unwrap_or(defaults.dimensionality)
        };

        let molecule_ids = if args.molecule_per_arm {
            MoleculeIdScheme::PerArm
        } else {
            output.molecule_ids.unwrap_or(defaults.molecule_ids)
        };

        let masses = match output.masses {
            Some(partial) => Self::resolve_masses(partial)?,
            None => defaults
                .masses
                .map(|name| Self::resolve_masses(PartialMasses::Named(name.to_string())))
                .transpose()?
                .flatten(),
        };

        let mut builder = StructureDescriptorBuilder::new()
            .arms(args.arms.or(structure.arms).unwrap_or(defaults.arms))
            .arm_length(
                args.arm_length
                    .or(structure.arm_length)
                    .unwrap_or(defaults.arm_length),
            )
            .terminus(terminus)
            .spacing(args.spacing.or(structure.spacing).unwrap_or(defaults.spacing))
            .phase_degrees(
                args.phase_deg
                    .or(structure.phase_deg)
                    .unwrap_or(defaults.phase_degrees),
            )
            .dimensionality(dimensionality)
            .box_size(args.box_size.or(output.box_size).unwrap_or(defaults.box_size))
            .centering(output.centering.unwrap_or(defaults.centering))
            .precision(output.coordinate_precision.unwrap_or(defaults.precision))
            .molecule_ids(molecule_ids)
            .type_scheme(output.type_scheme.unwrap_or(defaults.type_scheme))
            .masses(masses);

        if let Some(title) = args.title.clone().or(self.title) {
            builder = builder.title(title);
        }

        builder.build().map_err(|e| CliError::Engine(EngineError::from(e)))
    }

    fn merge_terminus(
        preset: ArmTerminus,
        file: Option<PartialTerminusConfig>,
        args: &GenerateArgs,
    ) -> Result<ArmTerminus> {
        let resolved = match file {
            Some(partial) => Self::resolve_terminus(preset, partial)?,
            None => preset,
        };

        if let Some(size) = args.loop_size {
            return Ok(ArmTerminus::DetachedRing { size });
        }
        if args.branches.is_some() || args.branch_length.is_some() {
            let partial = PartialTerminusConfig {
                kind: Some(TerminusKind::Branches),
                count: args.branches,
                length: args.branch_length,
                size: None,
            };
            return Self::resolve_terminus(resolved, partial);
        }
        Ok(resolved)
    }

    /// Fills fields missing from `partial` from `base` when it is the same kind of
    /// terminus, or from the preset that uses that kind otherwise.
    fn resolve_terminus(base: ArmTerminus, partial: PartialTerminusConfig) -> Result<ArmTerminus> {
        let kind = partial.kind.unwrap_or(match base {
            ArmTerminus::Bare => TerminusKind::Bare,
            ArmTerminus::Branches { .. } => TerminusKind::Branches,
            ArmTerminus::DetachedRing { .. } => TerminusKind::DetachedRing,
        });

        let ignored = match kind {
            TerminusKind::Bare => vec![
                ("count", partial.count),
                ("length", partial.length),
                ("size", partial.size),
            ],
            TerminusKind::Branches => vec![("size", partial.size)],
            TerminusKind::DetachedRing => {
                vec![("count", partial.count), ("length", partial.length)]
            }
        };
        for (field, value) in ignored {
            if value.is_some() {
                warn!(
                    "Ignoring `structure.terminus.{}`: it does not apply to a {:?} terminus.",
                    field, kind
                );
            }
        }

        Ok(match kind {
            TerminusKind::Bare => ArmTerminus::Bare,
            TerminusKind::Branches => {
                let fallback = match base {
                    ArmTerminus::Branches { .. } => base,
                    _ => DefaultsConfig::for_preset(Preset::Tree).terminus,
                };
                let ArmTerminus::Branches { count, length } = fallback else {
                    return Err(CliError::Config(
                        "The tree preset does not define branches.".to_string(),
                    ));
                };
                ArmTerminus::Branches {
                    count: partial.count.unwrap_or(count),
                    length: partial.length.unwrap_or(length),
                }
            }
            TerminusKind::DetachedRing => {
                let fallback = match base {
                    ArmTerminus::DetachedRing { .. } => base,
                    _ => DefaultsConfig::for_preset(Preset::Loops).terminus,
                };
                let ArmTerminus::DetachedRing { size } = fallback else {
                    return Err(CliError::Config(
                        "The loops preset does not define a ring.".to_string(),
                    ));
                };
                ArmTerminus::DetachedRing {
                    size: partial.size.unwrap_or(size),
                }
            }
        })
    }

    fn resolve_masses(partial: PartialMasses) -> Result<Option<MassAssignment>> {
        match partial {
            PartialMasses::Uniform(mass) => Ok(Some(MassAssignment::Uniform(mass))),
            PartialMasses::Named(name) if name.trim().eq_ignore_ascii_case("none") => Ok(None),
            PartialMasses::Named(name) => masses::preset_mass(&name)
                .map(|mass| Some(MassAssignment::Uniform(mass)))
                .ok_or_else(|| {
                    CliError::Config(format!(
                        "Unknown mass preset '{}'. Available presets: {}, or 'none'.",
                        name,
                        masses::preset_names().join(", ")
                    ))
                }),
            PartialMasses::Table(table) => {
                let mut per_type = BTreeMap::new();
                for (key, mass) in table {
                    let atom_type = key.trim().parse::<u32>().map_err(|_| {
                        CliError::Config(format!(
                            "Mass table keys must be atom type numbers, found '{}'",
                            key
                        ))
                    })?;
                    per_type.insert(atom_type, mass);
                }
                Ok(Some(MassAssignment::PerType(per_type)))
            }
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value_str) = (key.trim(), value_str.trim());

            match key {
                "title" => self.title = Some(value_str.to_string()),
                "structure.arms" => {
                    self.structure.get_or_insert_with(Default::default).arms =
                        Some(parse_number(key, value_str)?);
                }
                "structure.arm-length" => {
                    self.structure.get_or_insert_with(Default::default).arm_length =
                        Some(parse_number(key, value_str)?);
                }
                "structure.spacing" => {
                    self.structure.get_or_insert_with(Default::default).spacing =
                        Some(parse_number(key, value_str)?);
                }
                "structure.phase-deg" => {
                    self.structure.get_or_insert_with(Default::default).phase_deg =
                        Some(parse_number(key, value_str)?);
                }
                "structure.dimensionality" => {
                    self.structure.get_or_insert_with(Default::default).dimensionality =
                        Some(parse_name(key, value_str)?);
                }
                "structure.terminus.type" => {
                    self.terminus_mut().kind = Some(parse_name(key, value_str)?)
                }
                "structure.terminus.count" => {
                    self.terminus_mut().count = Some(parse_number(key, value_str)?)
                }
                "structure.terminus.length" => {
                    self.terminus_mut().length = Some(parse_number(key, value_str)?)
                }
                "structure.terminus.size" => {
                    self.terminus_mut().size = Some(parse_number(key, value_str)?)
                }
                "output.box-size" => {
                    self.output.get_or_insert_with(Default::default).box_size =
                        Some(parse_number(key, value_str)?);
                }
                "output.centering" => {
                    self.output.get_or_insert_with(Default::default).centering =
                        Some(parse_name(key, value_str)?);
                }
                "output.coordinate-precision" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .coordinate_precision = Some(parse_number(key, value_str)?);
                }
                "output.molecule-ids" => {
                    self.output.get_or_insert_with(Default::default).molecule_ids =
                        Some(parse_name(key, value_str)?);
                }
                "output.type-scheme" => {
                    self.output.get_or_insert_with(Default::default).type_scheme =
                        Some(parse_name(key, value_str)?);
                }
                "output.masses" => {
                    let masses = match value_str.parse::<f64>() {
                        Ok(mass) => PartialMasses::Uniform(mass),
                        Err(_) => PartialMasses::Named(value_str.to_string()),
                    };
                    self.output.get_or_insert_with(Default::default).masses = Some(masses);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn terminus_mut(&mut self) -> &mut PartialTerminusConfig {
        self.structure
            .get_or_insert_with(Default::default)
            .terminus
            .get_or_insert_with(Default::default)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid numeric value for {}: {}", key, value)))
}

fn parse_name<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    let de: StrDeserializer<serde::de::value::Error> = value.into_deserializer();
    T::deserialize(de).map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))
}
