//! Decoding of the engine results into tables
//!
//! The engine result file is read through its JSON export: an object holding the model under
//! `m`, and optionally the fit under `f` and the simulation under `s`. Monte Carlo results live
//! in a second file.
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde_json::Value;
use thiserror::Error;

use crate::results::fitdata::FitData;
use crate::results::model::IncaModel;
use crate::results::monte_carlo::{monte_carlo_path, MonteCarloResults};
use crate::results::node::{field, Node};
use crate::results::simulation::Simulation;

pub mod fitdata;
pub mod model;
pub mod monte_carlo;
pub mod node;
pub mod normality;
pub mod simulation;
pub mod table;

/// Where to find Monte Carlo results
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MonteCarloSource {
    /// Do not read Monte Carlo results
    #[default]
    Skip,
    /// Read them from the sibling file `<stem>_mc.<ext>` of the result file
    Inferred,
    File(PathBuf),
}

/// Everything the engine produced in one run
#[derive(Debug, Clone, PartialEq)]
pub struct IncaResults {
    pub model: IncaModel,
    pub fitdata: Option<FitData>,
    pub simulation: Option<Simulation>,
    pub monte_carlo: Option<MonteCarloResults>,
}

impl IncaResults {
    /// Read a result file and, if requested, the matching Monte Carlo file
    ///
    /// The Monte Carlo samples are named after the fitted parameters, so they can only be read
    /// together with a fit.
    pub fn read<P: AsRef<Path>>(
        path: P,
        monte_carlo: MonteCarloSource,
    ) -> Result<IncaResults, ResultsError> {
        let path = path.as_ref();
        info!("Reading results from {}", path.display());
        let mut results = IncaResults::from_value(&read_result_file(path)?)?;
        let mc_file = match monte_carlo {
            MonteCarloSource::Skip => return Ok(results),
            MonteCarloSource::Inferred => monte_carlo_path(path),
            MonteCarloSource::File(file) => file,
        };
        let parameter_names = match &results.fitdata {
            Some(fitdata) => fitdata.parameter_ids(),
            None => {
                return Err(ResultsError::Precondition(
                    "Monte Carlo results need a fit to name their parameters".to_string(),
                ))
            }
        };
        results.monte_carlo = Some(MonteCarloResults::read(mc_file, &parameter_names)?);
        Ok(results)
    }

    /// Decode an already parsed result tree, without Monte Carlo results
    pub fn from_value(value: &Value) -> Result<IncaResults, ResultsError> {
        let raw = match Node::classify(value) {
            Node::Record(record) => record,
            _ => {
                return Err(ResultsError::Format(
                    "result file must hold a record".to_string(),
                ))
            }
        };
        Ok(IncaResults {
            model: IncaModel::from_value(field(raw, "m")?)?,
            fitdata: raw.get("f").map(FitData::from_value).transpose()?,
            simulation: raw.get("s").map(Simulation::from_value).transpose()?,
            monte_carlo: None,
        })
    }
}

/// Read and parse a JSON result file
pub fn read_result_file(path: &Path) -> Result<Value, ResultsError> {
    if !path.exists() {
        return Err(ResultsError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("Result file {0} does not exist")]
    FileNotFound(PathBuf),
    #[error("Unable to read result file")]
    Read(#[from] std::io::Error),
    #[error("Unable to parse result file")]
    Parse(#[from] serde_json::Error),
    #[error("Field {0} is missing from the results")]
    MissingField(String),
    #[error("Unexpected result layout: {0}")]
    Format(String),
    #[error("{0}")]
    Precondition(String),
}

#[cfg(test)]
mod results_tests {
    use super::*;

    fn data_path(file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("results")
            .join(file)
    }

    #[test]
    fn read_simple_model() {
        let results = IncaResults::read(data_path("simple_model.json"), MonteCarloSource::Skip)
            .unwrap();
        assert_eq!(results.model.metabolite_ids(), &["A", "B", "C"]);
        let fluxes = results.model.rates_in_net_exch_format().unwrap();
        let ids: Vec<&str> = fluxes.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "R2 net", "R2 exch"]);
        assert_eq!(fluxes[1].value, 10.0);

        let fitdata = results.fitdata.as_ref().unwrap();
        assert!(fitdata.goodness_of_fit().accepted);
        assert_eq!(fitdata.measurements_and_fit_detailed().len(), 3);
        let normality = fitdata.residual_normality(None).unwrap();
        assert_eq!(normality.alpha, 0.05);
        assert!((normality.statistic - 0.923077).abs() < 1e-6);
        assert!((normality.p_value - 0.463263).abs() < 1e-6);
        assert!(normality.normal);

        let simulation = results.simulation.as_ref().unwrap();
        assert!(simulation.is_steady_state());
        assert_eq!(simulation.simulated_data().len(), 2);
        assert!(results.monte_carlo.is_none());
    }

    #[test]
    fn read_inferred_monte_carlo() {
        let results =
            IncaResults::read(data_path("simple_model.json"), MonteCarloSource::Inferred).unwrap();
        let mc = results.monte_carlo.unwrap();
        assert!(!mc.is_dump());
        assert_eq!(mc.parameter_names(), &["R1", "R2"]);
        assert_eq!(mc.samples_of("R1").unwrap(), vec![10.1, 9.7, 10.4]);
    }

    #[test]
    fn read_monte_carlo_dump() {
        let results = IncaResults::read(
            data_path("simple_model.json"),
            MonteCarloSource::File(data_path("simple_model_dump.json")),
        )
        .unwrap();
        let mc = results.monte_carlo.unwrap();
        assert!(mc.is_dump());
        assert_eq!(mc.samples_of("R2").unwrap(), vec![9.8, 10.3, 10.0, 10.1]);
        assert_eq!(mc.confidence_intervals()[1].ub, 11.2);
    }

    #[test]
    fn missing_monte_carlo_file() {
        let err = IncaResults::read(
            data_path("simple_model.json"),
            MonteCarloSource::File(data_path("not_there_mc.json")),
        )
        .unwrap_err();
        assert!(matches!(err, ResultsError::FileNotFound(_)));
    }

    #[test]
    fn simulation_without_fit() {
        let results =
            IncaResults::read(data_path("simulation_only.json"), MonteCarloSource::Skip).unwrap();
        assert!(results.fitdata.is_none());
        assert_eq!(results.model.metabolite_ids(), &["A"]);
        assert!(results.model.rates().is_empty());
        let simulation = results.simulation.unwrap();
        assert!(!simulation.is_steady_state());
        assert_eq!(simulation.simulated_data().len(), 4);

        let err = IncaResults::read(data_path("simulation_only.json"), MonteCarloSource::Inferred)
            .unwrap_err();
        assert!(matches!(err, ResultsError::Precondition(_)));
    }

    #[test]
    fn missing_result_file() {
        assert!(matches!(
            IncaResults::read(data_path("missing.json"), MonteCarloSource::Skip),
            Err(ResultsError::FileNotFound(_))
        ));
    }
}
