//! Monte Carlo confidence intervals and samples
//!
//! Two kinds of files are read: the result of a finished run holding `CI` and `K`, and the dump
//! the engine writes while sampling, holding `ci0` and `k`.
use std::path::{Path, PathBuf};

use log::info;
use nalgebra::DMatrix;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::configuration;
use crate::results::node::{field, matrix, Node};
use crate::results::{read_result_file, ResultsError};

/// File the Monte Carlo results of `result_file` are saved to, `<stem>_mc.<ext>`
pub fn monte_carlo_path(result_file: &Path) -> PathBuf {
    let config = configuration::current();
    let stem = result_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = result_file
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or(config.result_extension);
    result_file.with_file_name(format!(
        "{}{}.{}",
        stem, config.monte_carlo_suffix, extension
    ))
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConfidenceInterval {
    pub parameter: String,
    pub lb: f64,
    pub ub: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloResults {
    parameter_names: Vec<String>,
    confidence_intervals: Vec<ConfidenceInterval>,
    /// One row per sample, one column per parameter
    samples: DMatrix<f64>,
    dump: bool,
}

impl MonteCarloResults {
    /// Read a Monte Carlo file, naming its columns after the fitted parameters
    pub fn read<P: AsRef<Path>>(
        path: P,
        parameter_names: &[String],
    ) -> Result<MonteCarloResults, ResultsError> {
        let value = read_result_file(path.as_ref())?;
        info!("Reading Monte Carlo results from {}", path.as_ref().display());
        MonteCarloResults::from_value(&value, parameter_names)
    }

    pub fn from_value(
        value: &Value,
        parameter_names: &[String],
    ) -> Result<MonteCarloResults, ResultsError> {
        let raw = match Node::classify(value) {
            Node::Record(record) => record,
            _ => return Err(not_monte_carlo()),
        };
        let n_parameters = parameter_names.len();
        let (ci, samples, dump) = if raw.contains_key("CI") {
            let samples = oriented(matrix(field(raw, "K")?)?, n_parameters);
            (field(raw, "CI")?, samples, false)
        } else if raw.contains_key("ci0") {
            (field(raw, "ci0")?, flatten_dump(raw, n_parameters)?, true)
        } else {
            return Err(not_monte_carlo());
        };

        let ci = oriented_ci(matrix(ci)?, n_parameters);
        if ci.shape() != (2, n_parameters) {
            return Err(ResultsError::Format(format!(
                "confidence intervals have shape {:?}, expected (2, {})",
                ci.shape(),
                n_parameters
            )));
        }
        if samples.ncols() != n_parameters {
            return Err(ResultsError::Format(format!(
                "samples have {} columns but {} parameters were fitted",
                samples.ncols(),
                n_parameters
            )));
        }
        let confidence_intervals = parameter_names
            .iter()
            .enumerate()
            .map(|(i, parameter)| ConfidenceInterval {
                parameter: parameter.clone(),
                lb: ci[(0, i)],
                ub: ci[(1, i)],
            })
            .collect();
        Ok(MonteCarloResults {
            parameter_names: parameter_names.to_vec(),
            confidence_intervals,
            samples,
            dump,
        })
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn confidence_intervals(&self) -> &[ConfidenceInterval] {
        &self.confidence_intervals
    }

    pub fn samples(&self) -> &DMatrix<f64> {
        &self.samples
    }

    /// All samples of one parameter
    pub fn samples_of(&self, parameter: &str) -> Option<Vec<f64>> {
        let index = self.parameter_names.iter().position(|p| p == parameter)?;
        Some(self.samples.column(index).iter().copied().collect())
    }

    /// Whether the results were read from an unfinished run
    pub fn is_dump(&self) -> bool {
        self.dump
    }
}

fn not_monte_carlo() -> ResultsError {
    ResultsError::Format(
        "not a Monte Carlo file, expected CI and K or ci0 and k".to_string(),
    )
}

/// A single sample of several parameters may be stored as a flat vector
fn oriented(samples: DMatrix<f64>, n_parameters: usize) -> DMatrix<f64> {
    if samples.ncols() == 1 && n_parameters > 1 && samples.nrows() == n_parameters {
        samples.transpose()
    } else {
        samples
    }
}

/// The interval of a single parameter may be stored as a flat vector
fn oriented_ci(ci: DMatrix<f64>, n_parameters: usize) -> DMatrix<f64> {
    if ci.shape() == (n_parameters, 2) && n_parameters != 2 {
        ci.transpose()
    } else {
        ci
    }
}

/// Flatten the iteration by sample by parameter cube of a dump into one row per sample
///
/// After a single iteration the cube is stored as a sample by parameter matrix, which is read as
/// a cube of one iteration.
fn flatten_dump(
    raw: &Map<String, Value>,
    n_parameters: usize,
) -> Result<DMatrix<f64>, ResultsError> {
    let k = field(raw, "k")?;
    let is_cube = match k {
        Value::Array(items) => items
            .iter()
            .any(|item| matches!(item, Value::Array(inner) if inner.iter().any(Value::is_array))),
        _ => false,
    };
    let iterations: Vec<DMatrix<f64>> = match k {
        Value::Array(items) if is_cube => items.iter().map(matrix).collect::<Result<_, _>>()?,
        other => vec![oriented(matrix(other)?, n_parameters)],
    };

    let mut values = Vec::new();
    let mut n_rows = 0;
    for iteration in &iterations {
        if iteration.ncols() != n_parameters {
            return Err(ResultsError::Format(format!(
                "dump samples have {} columns but {} parameters were fitted",
                iteration.ncols(),
                n_parameters
            )));
        }
        for row in iteration.row_iter() {
            values.extend(row.iter().copied());
            n_rows += 1;
        }
    }
    Ok(DMatrix::from_row_slice(n_rows, n_parameters, &values))
}

#[cfg(test)]
mod monte_carlo_tests {
    use super::*;
    use serde_json::json;

    fn names() -> Vec<String> {
        vec!["R1".to_string(), "R2".to_string(), "B".to_string()]
    }

    #[test]
    fn sibling_file_name() {
        assert_eq!(
            monte_carlo_path(Path::new("/data/run/output.mat")),
            PathBuf::from("/data/run/output_mc.mat")
        );
        assert_eq!(
            monte_carlo_path(Path::new("/data/run/output.json")),
            PathBuf::from("/data/run/output_mc.json")
        );
    }

    #[test]
    fn finished_run() {
        let raw = json!({
            "CI": [[0.9, 1.8, 0.1], [1.1, 2.2, 0.3]],
            "K": [[1.0, 2.0, 0.2], [1.05, 1.9, 0.25]]
        });
        let mc = MonteCarloResults::from_value(&raw, &names()).unwrap();
        assert!(!mc.is_dump());
        assert_eq!(mc.samples().shape(), (2, 3));
        assert_eq!(mc.samples_of("R2").unwrap(), vec![2.0, 1.9]);
        assert_eq!(mc.confidence_intervals()[2].lb, 0.1);
        assert_eq!(mc.confidence_intervals()[2].ub, 0.3);
    }

    #[test]
    fn dump_cube_is_flattened_by_iteration() {
        let raw = json!({
            "ci0": [[0.9, 1.8, 0.1], [1.1, 2.2, 0.3]],
            "k": [
                [[1.0, 2.0, 0.2], [1.1, 2.1, 0.21]],
                [[1.2, 2.2, 0.22], [1.3, 2.3, 0.23]]
            ]
        });
        let mc = MonteCarloResults::from_value(&raw, &names()).unwrap();
        assert!(mc.is_dump());
        assert_eq!(mc.samples_of("R1").unwrap(), vec![1.0, 1.1, 1.2, 1.3]);
        assert_eq!(mc.samples_of("B").unwrap(), vec![0.2, 0.21, 0.22, 0.23]);
    }

    #[test]
    fn dump_after_one_iteration() {
        let raw = json!({
            "ci0": [[0.9, 1.8, 0.1], [1.1, 2.2, 0.3]],
            "k": [[1.0, 2.0, 0.2], [1.1, 2.1, 0.21]]
        });
        let mc = MonteCarloResults::from_value(&raw, &names()).unwrap();
        assert_eq!(mc.samples().shape(), (2, 3));
        assert_eq!(mc.samples_of("R2").unwrap(), vec![2.0, 2.1]);
    }

    #[test]
    fn unknown_layout() {
        let raw = json!({"samples": [[1.0]]});
        assert!(matches!(
            MonteCarloResults::from_value(&raw, &names()),
            Err(ResultsError::Format(_))
        ));
    }

    #[test]
    fn parameter_count_mismatch() {
        let raw = json!({"CI": [[0.9, 1.8], [1.1, 2.2]], "K": [[1.0, 2.0]]});
        assert!(matches!(
            MonteCarloResults::from_value(&raw, &names()),
            Err(ResultsError::Format(_))
        ));
    }
}
