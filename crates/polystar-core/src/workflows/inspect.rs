use crate::core::io::lammps::{LammpsFile, LammpsHeader};
use crate::core::io::traits::TopologyFile;
use crate::core::utils::graph::{Component, ComponentShape, connected_components};
use crate::engine::error::EngineError;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct InspectionReport {
    pub header: LammpsHeader,
    pub components: Vec<Component>,
}

impl InspectionReport {
    pub fn ring_count(&self) -> usize {
        self.count_shape(ComponentShape::Ring)
    }

    pub fn tree_count(&self) -> usize {
        self.count_shape(ComponentShape::Tree)
    }

    fn count_shape(&self, shape: ComponentShape) -> usize {
        self.components.iter().filter(|c| c.shape == shape).count()
    }

    /// True when everything outside the simple rings forms one connected tree.
    pub fn backbone_is_tree(&self) -> bool {
        let mut rest = self
            .components
            .iter()
            .filter(|c| c.shape != ComponentShape::Ring);
        match (rest.next(), rest.next()) {
            (Some(only), None) => matches!(
                only.shape,
                ComponentShape::Tree | ComponentShape::Isolated
            ),
            _ => false,
        }
    }
}

/// Reads a data file and reports its counts and the shape of every connected component.
///
/// # Errors
///
/// Returns [`EngineError::Input`] when the file cannot be read or is inconsistent.
#[instrument(skip_all, name = "inspect_workflow", fields(path = %path.display()))]
pub fn run(path: &Path) -> Result<InspectionReport, EngineError> {
    let (system, header) = LammpsFile::read_from_path(path).map_err(|source| EngineError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let components = connected_components(&system);
    info!(
        atoms = header.atoms,
        bonds = header.bonds,
        components = components.len(),
        "Inspected data file."
    );
    Ok(InspectionReport { header, components })
}
