use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid data on row {row} of '{path}': {message}")]
    InvalidRow {
        path: String,
        row: usize,
        message: String,
    },
    #[error("No samples found in '{0}'")]
    EmptySeries(String),
    #[error("Series have different lengths ({left} vs {right} samples)")]
    LengthMismatch { left: usize, right: usize },
    #[error("Timestep mismatch at sample {index}: {left} vs {right}")]
    TimestepMismatch { index: usize, left: f64, right: f64 },
    #[error("Reference summary has no '{0}' entry")]
    MissingReference(&'static str),
    #[error("Invalid atom count {0}: a linear reference chain needs at least 2 atoms")]
    InvalidAtomCount(usize),
    #[error("Atom counts must be at least 1")]
    EmptyAtomCount,
}
