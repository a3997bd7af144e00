use super::error::AnalysisError;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyrationSample {
    pub timestep: f64,
    pub rg: f64,
}

/// Mean, population standard deviation and mean square of a set of Rg values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub std: f64,
    pub mean_square: f64,
    pub samples: usize,
}

impl SeriesStats {
    /// Returns `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let mean_square = values.iter().map(|v| v * v).sum::<f64>() / n;
        Some(Self {
            mean,
            std: variance.sqrt(),
            mean_square,
            samples: values.len(),
        })
    }
}

/// A radius of gyration time series, as written by `fix ave/time` on `compute gyration`.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct GyrationSeries {
    samples: Vec<GyrationSample>,
}

impl GyrationSeries {
    pub fn from_samples(samples: Vec<GyrationSample>) -> Option<Self> {
        if samples.is_empty() {
            None
        } else {
            Some(Self { samples })
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let file = std::fs::File::open(path).map_err(|e| AnalysisError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_reader(file, &path.to_string_lossy())
    }

    /// Reads whitespace-separated rows whose first two columns are the timestep and Rg.
    /// Lines starting with `#` are comments; extra columns are ignored.
    pub fn from_reader(reader: impl Read, source_name: &str) -> Result<Self, AnalysisError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .comment(Some(b'#'))
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut samples = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| AnalysisError::Csv {
                path: source_name.to_string(),
                source: e,
            })?;
            let fields: Vec<&str> = record.iter().flat_map(str::split_whitespace).collect();
            if fields.is_empty() {
                continue;
            }
            let invalid = |message: String| AnalysisError::InvalidRow {
                path: source_name.to_string(),
                row: row + 1,
                message,
            };
            let [timestep, rg, ..] = fields.as_slice() else {
                return Err(invalid(format!(
                    "expected at least 2 columns, found {}",
                    fields.len()
                )));
            };
            let parse = |value: &str, column: &str| {
                value
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("{} '{}' is not a number", column, value)))
            };
            samples.push(GyrationSample {
                timestep: parse(*timestep, "timestep")?,
                rg: parse(*rg, "Rg")?,
            });
        }

        Self::from_samples(samples)
            .ok_or_else(|| AnalysisError::EmptySeries(source_name.to_string()))
    }

    pub fn samples(&self) -> &[GyrationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn rg_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.rg).collect()
    }

    pub fn last_timestep(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.timestep)
    }

    /// The second half of the series, starting at sample `len / 2`.
    pub fn equilibrated(&self) -> &[GyrationSample] {
        &self.samples[self.samples.len() / 2..]
    }

    pub fn stats(&self) -> SeriesStats {
        Self::stats_of(&self.samples)
    }

    pub fn equilibrated_stats(&self) -> SeriesStats {
        Self::stats_of(self.equilibrated())
    }

    fn stats_of(samples: &[GyrationSample]) -> SeriesStats {
        let values: Vec<f64> = samples.iter().map(|s| s.rg).collect();
        SeriesStats::of(&values).unwrap_or(SeriesStats {
            mean: 0.0,
            std: 0.0,
            mean_square: 0.0,
            samples: 0,
        })
    }
}
