use super::error::AnalysisError;
use super::gyration::GyrationSeries;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

const MEAN_RG_SQUARED_KEY: &str = "Mean Rg²";
const MEAN_RG_KEY: &str = "Mean Rg";

static MEAN_RG_SQUARED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Mean Rg²\s*=\s*([\d.]+)").expect("Invalid Mean Rg² pattern"));
static MEAN_RG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Mean Rg\s*=\s*([\d.]+)").expect("Invalid Mean Rg pattern"));

/// Reference values extracted from a plain-text results summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSummary {
    pub mean_rg_squared: f64,
    pub mean_rg: f64,
}

impl ReferenceSummary {
    /// Extracts the first `Mean Rg² = <value>` and `Mean Rg = <value>` entries.
    pub fn parse(text: &str) -> Result<Self, AnalysisError> {
        let mean_rg_squared = find_value(&MEAN_RG_SQUARED_PATTERN, text)
            .ok_or(AnalysisError::MissingReference(MEAN_RG_SQUARED_KEY))?;
        let mean_rg = find_value(&MEAN_RG_PATTERN, text)
            .ok_or(AnalysisError::MissingReference(MEAN_RG_KEY))?;
        Ok(Self {
            mean_rg_squared,
            mean_rg,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&text)
    }
}

fn find_value(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|value| value.as_str().parse().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compactness {
    MoreCompact,
    MoreExpanded,
}

/// A simulated series measured against a reference summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceComparison {
    pub mean_rg: f64,
    pub mean_rg_squared: f64,
    pub reference: ReferenceSummary,
    /// `<Rg²>_polymer / <Rg²>_reference`.
    pub g: f64,
}

impl ReferenceComparison {
    /// Uses every sample of `series`, not only the equilibrated half.
    pub fn compute(series: &GyrationSeries, reference: ReferenceSummary) -> Self {
        let stats = series.stats();
        Self {
            mean_rg: stats.mean,
            mean_rg_squared: stats.mean_square,
            reference,
            g: stats.mean_square / reference.mean_rg_squared,
        }
    }

    pub fn compactness(&self) -> Compactness {
        if self.g < 1.0 {
            Compactness::MoreCompact
        } else {
            Compactness::MoreExpanded
        }
    }
}
