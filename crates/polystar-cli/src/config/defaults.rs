use clap::ValueEnum;
use polystar::engine::config::{
    ArmTerminus, Centering, Dimensionality, MoleculeIdScheme, TypeScheme,
};

/// Built-in parameter sets reproducing the two classic generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Three arms of ten beads, each ending in two ten-bead branches.
    #[default]
    Tree,
    /// Three short arms, each followed by a detached four-atom ring.
    Loops,
}

pub struct DefaultsConfig {
    pub arms: usize,
    pub arm_length: usize,
    pub terminus: ArmTerminus,
    pub spacing: f64,
    pub phase_degrees: f64,
    pub dimensionality: Dimensionality,
    pub box_size: f64,
    pub centering: Centering,
    pub precision: usize,
    pub molecule_ids: MoleculeIdScheme,
    pub type_scheme: TypeScheme,
    /// Name of a mass preset applied to every atom type.
    pub masses: Option<&'static str>,
}

impl DefaultsConfig {
    pub fn for_preset(preset: Preset) -> Self {
        match preset {
            Preset::Tree => Self {
                arms: 3,
                arm_length: 10,
                terminus: ArmTerminus::Branches {
                    count: 2,
                    length: 10,
                },
                spacing: 1.1,
                phase_degrees: 0.0,
                dimensionality: Dimensionality::Spatial,
                box_size: 50.0,
                centering: Centering::BoxCenter,
                precision: 4,
                molecule_ids: MoleculeIdScheme::Single,
                type_scheme: TypeScheme::Structural,
                masses: None,
            },
            Preset::Loops => Self {
                arms: 3,
                arm_length: 3,
                terminus: ArmTerminus::DetachedRing { size: 4 },
                spacing: 0.5,
                phase_degrees: 0.0,
                dimensionality: Dimensionality::Spatial,
                box_size: 20.0,
                centering: Centering::AsBuilt,
                precision: 6,
                molecule_ids: MoleculeIdScheme::Single,
                type_scheme: TypeScheme::Uniform,
                masses: Some("carbon"),
            },
        }
    }
}
