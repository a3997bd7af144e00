use super::error::AnalysisError;
use super::gyration::GyrationSeries;
use crate::core::io::traits::persist_atomically;
use std::path::Path;

/// Flory exponent for a chain in good solvent.
pub const DEFAULT_EXPONENT: f64 = 1.176;

/// Step-by-step comparison of two Rg series sampled on the same timesteps.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractionReport {
    pub mean_a: f64,
    pub mean_b: f64,
    /// `(mean_a / mean_b)^2 * (atoms_a / atoms_b)^exponent`.
    pub g: f64,
    /// `(timestep, rg_b - rg_a)` for every shared timestep.
    pub differences: Vec<(f64, f64)>,
    pub mean_difference: f64,
}

/// Compares two series that must share their timestep column exactly.
pub fn contraction_factor(
    a: &GyrationSeries,
    b: &GyrationSeries,
    atoms_a: usize,
    atoms_b: usize,
    exponent: f64,
) -> Result<ContractionReport, AnalysisError> {
    for atoms in [atoms_a, atoms_b] {
        if atoms == 0 {
            return Err(AnalysisError::EmptyAtomCount);
        }
    }
    if a.len() != b.len() {
        return Err(AnalysisError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut differences = Vec::with_capacity(a.len());
    for (index, (sa, sb)) in a.samples().iter().zip(b.samples()).enumerate() {
        if sa.timestep != sb.timestep {
            return Err(AnalysisError::TimestepMismatch {
                index,
                left: sa.timestep,
                right: sb.timestep,
            });
        }
        differences.push((sa.timestep, sb.rg - sa.rg));
    }

    let mean_a = a.stats().mean;
    let mean_b = b.stats().mean;
    let mean_difference =
        differences.iter().map(|(_, d)| d).sum::<f64>() / differences.len() as f64;
    let g = (mean_a / mean_b).powi(2) * (atoms_a as f64 / atoms_b as f64).powf(exponent);

    Ok(ContractionReport {
        mean_a,
        mean_b,
        g,
        differences,
        mean_difference,
    })
}

impl ContractionReport {
    /// Writes the difference series as two whitespace-separated columns.
    pub fn save_differences(&self, path: &Path) -> Result<(), AnalysisError> {
        let mut text = String::from("# Step  Rg_diff(Rg_b - Rg_a)\n");
        for (step, diff) in &self.differences {
            text.push_str(&format!("{} {:.18e}\n", step, diff));
        }
        persist_atomically(path, text.as_bytes()).map_err(|e| AnalysisError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::gyration::GyrationSample;

    fn series(points: &[(f64, f64)]) -> GyrationSeries {
        GyrationSeries::from_samples(
            points
                .iter()
                .map(|&(timestep, rg)| GyrationSample { timestep, rg })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn computes_factor_and_differences() {
        let a = series(&[(0.0, 2.0), (100.0, 4.0)]);
        let b = series(&[(0.0, 4.0), (100.0, 8.0)]);
        let report = contraction_factor(&a, &b, 91, 87, DEFAULT_EXPONENT).unwrap();
        assert_eq!(report.mean_a, 3.0);
        assert_eq!(report.mean_b, 6.0);
        let expected = 0.25 * (91.0f64 / 87.0).powf(1.176);
        assert!((report.g - expected).abs() < 1e-12);
        assert_eq!(report.differences, vec![(0.0, 2.0), (100.0, 4.0)]);
        assert_eq!(report.mean_difference, 3.0);
    }

    #[test]
    fn zero_atom_counts_are_rejected() {
        let a = series(&[(0.0, 2.0), (100.0, 4.0)]);
        for (atoms_a, atoms_b) in [(0, 10), (10, 0)] {
            let err = contraction_factor(&a, &a, atoms_a, atoms_b, DEFAULT_EXPONENT).unwrap_err();
            assert!(matches!(err, AnalysisError::EmptyAtomCount));
            assert_eq!(err.to_string(), "Atom counts must be at least 1");
        }
    }

    #[test]
    fn mismatched_timesteps_are_rejected() {
        let a = series(&[(0.0, 1.0), (100.0, 1.0)]);
        let b = series(&[(0.0, 1.0), (200.0, 1.0)]);
        assert!(matches!(
            contraction_factor(&a, &b, 10, 10, DEFAULT_EXPONENT),
            Err(AnalysisError::TimestepMismatch { index: 1, .. })
        ));
        let c = series(&[(0.0, 1.0)]);
        assert!(matches!(
            contraction_factor(&a, &c, 10, 10, DEFAULT_EXPONENT),
            Err(AnalysisError::LengthMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn saved_differences_reload_as_a_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.txt");
        let a = series(&[(0.0, 1.0), (50.0, 1.5)]);
        let b = series(&[(0.0, 1.25), (50.0, 2.0)]);
        let report = contraction_factor(&a, &b, 5, 5, DEFAULT_EXPONENT).unwrap();
        report.save_differences(&path).unwrap();
        let reloaded = GyrationSeries::from_path(&path).unwrap();
        assert_eq!(reloaded.rg_values(), vec![0.25, 0.5]);
    }
}
