use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::lammps::LammpsError;
use crate::core::models::system::TopologyError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidParameter(#[from] ConfigError),

    #[error("Topology construction failed: {0}")]
    Topology(#[from] TopologyError),

    #[error("Failed to serialize topology: {0}")]
    Render(#[source] LammpsError),

    #[error("Failed to write data file {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: LammpsError,
    },

    #[error("Failed to read data file {path:?}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: LammpsError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
