//! Resolution of which measurement categories each experiment carries
//!
//! Experiments are not declared anywhere; an experiment exists when some measurement table has
//! rows for it.
use indexmap::IndexMap;
use log::debug;

use crate::data::measurement::{FluxMeasurement, MsMeasurement, PoolMeasurement};
use crate::script::experiment::MeasurementType;
use crate::script::ScriptError;

/// Experiment id to the measurement categories present for it
pub type ExperimentDataConfig = IndexMap<String, Vec<MeasurementType>>;

/// Collects the experiment ids of each measurement table
#[derive(Debug, Clone, Default)]
pub struct ExperimentConfigResolver {
    categories: IndexMap<MeasurementType, Vec<String>>,
}

impl ExperimentConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the experiment ids of one category, duplicates are ignored
    pub fn with_experiment_ids<'a, I>(mut self, measurement_type: MeasurementType, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let experiments = self.categories.entry(measurement_type).or_default();
        for id in ids {
            if !experiments.iter().any(|e| e == id) {
                experiments.push(id.to_string());
            }
        }
        self
    }

    pub fn with_fluxes(self, fluxes: &[FluxMeasurement]) -> Self {
        self.with_experiment_ids(
            MeasurementType::Flux,
            fluxes.iter().map(|f| f.experiment_id.as_str()),
        )
    }

    pub fn with_ms(self, measurements: &[MsMeasurement]) -> Self {
        self.with_experiment_ids(
            MeasurementType::Ms,
            measurements.iter().map(|m| m.experiment_id.as_str()),
        )
    }

    pub fn with_pools(self, pools: &[PoolMeasurement]) -> Self {
        self.with_experiment_ids(
            MeasurementType::PoolSize,
            pools.iter().map(|p| p.experiment_id.as_str()),
        )
    }

    /// NMR data is only carried as experiment ids, the writers do not support it
    pub fn with_nmr<S: AsRef<str>>(self, experiment_ids: &[S]) -> Self {
        self.with_experiment_ids(
            MeasurementType::Nmr,
            experiment_ids.iter().map(|id| id.as_ref()),
        )
    }

    /// Invert the category to experiments mapping
    ///
    /// Experiments appear in order of first sighting, their categories in the order the
    /// categories were registered.
    pub fn resolve(&self) -> ExperimentDataConfig {
        let mut config = ExperimentDataConfig::new();
        for (measurement_type, experiments) in &self.categories {
            for experiment_id in experiments {
                config
                    .entry(experiment_id.clone())
                    .or_default()
                    .push(*measurement_type);
            }
        }
        debug!("Resolved experiment configuration: {:?}", config);
        config
    }
}

/// Build the experiment configuration from the measurement tables that are present
///
/// Categories are registered in the order flux, MS, pool size, NMR.
pub fn make_experiment_data_config(
    fluxes: Option<&[FluxMeasurement]>,
    ms: Option<&[MsMeasurement]>,
    pools: Option<&[PoolMeasurement]>,
    nmr_experiment_ids: Option<&[String]>,
) -> ExperimentDataConfig {
    let mut resolver = ExperimentConfigResolver::new();
    if let Some(fluxes) = fluxes {
        resolver = resolver.with_fluxes(fluxes);
    }
    if let Some(ms) = ms {
        resolver = resolver.with_ms(ms);
    }
    if let Some(pools) = pools {
        resolver = resolver.with_pools(pools);
    }
    if let Some(nmr_experiment_ids) = nmr_experiment_ids {
        resolver = resolver.with_nmr(nmr_experiment_ids);
    }
    resolver.resolve()
}

/// Experiments to include in a script
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExperimentSelection {
    #[default]
    All,
    One(String),
    Many(Vec<String>),
}

impl From<&str> for ExperimentSelection {
    /// `"All"` selects every experiment, anything else a single one
    fn from(value: &str) -> Self {
        if value == "All" {
            ExperimentSelection::All
        } else {
            ExperimentSelection::One(value.to_string())
        }
    }
}

impl From<Vec<String>> for ExperimentSelection {
    fn from(value: Vec<String>) -> Self {
        ExperimentSelection::Many(value)
    }
}

impl From<Vec<&str>> for ExperimentSelection {
    fn from(value: Vec<&str>) -> Self {
        ExperimentSelection::Many(value.into_iter().map(String::from).collect())
    }
}

/// Restrict a configuration to the selected experiments, keeping the configuration order
///
/// Selecting an experiment that has no measurements is an error.
pub fn select_experiments(
    config: &ExperimentDataConfig,
    selection: &ExperimentSelection,
) -> Result<ExperimentDataConfig, ScriptError> {
    let selected: Vec<&str> = match selection {
        ExperimentSelection::All => return Ok(config.clone()),
        ExperimentSelection::One(id) => vec![id.as_str()],
        ExperimentSelection::Many(ids) => ids.iter().map(|id| id.as_str()).collect(),
    };
    if let Some(unknown) = selected.iter().find(|id| !config.contains_key(**id)) {
        return Err(ScriptError::UnknownExperiment(unknown.to_string()));
    }
    Ok(config
        .iter()
        .filter(|(id, _)| selected.contains(&id.as_str()))
        .map(|(id, types)| (id.clone(), types.clone()))
        .collect())
}

#[cfg(test)]
mod config_tests {
    use super::*;

    fn config() -> ExperimentDataConfig {
        ExperimentConfigResolver::new()
            .with_experiment_ids(MeasurementType::Flux, ["exp1", "exp2", "exp1"])
            .with_experiment_ids(MeasurementType::Ms, ["exp2", "exp3"])
            .resolve()
    }

    #[test]
    fn inversion_keeps_first_seen_order() {
        let config = config();
        let found: Vec<(&str, Vec<MeasurementType>)> = config
            .iter()
            .map(|(id, types)| (id.as_str(), types.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("exp1", vec![MeasurementType::Flux]),
                ("exp2", vec![MeasurementType::Flux, MeasurementType::Ms]),
                ("exp3", vec![MeasurementType::Ms]),
            ]
        );
    }

    #[test]
    fn absent_tables_contribute_nothing() {
        assert!(make_experiment_data_config(None, None, None, None).is_empty());
    }

    #[test]
    fn nmr_experiments_are_registered_last() {
        let nmr = vec!["exp2".to_string(), "exp4".to_string()];
        let config = ExperimentConfigResolver::new()
            .with_experiment_ids(MeasurementType::Flux, ["exp2"])
            .with_nmr(&nmr)
            .resolve();
        assert_eq!(config["exp2"], vec![MeasurementType::Flux, MeasurementType::Nmr]);
        assert_eq!(config["exp4"], vec![MeasurementType::Nmr]);
    }

    #[test]
    fn select() {
        let config = config();
        assert_eq!(select_experiments(&config, &"All".into()).unwrap(), config);
        let one = select_experiments(&config, &"exp2".into()).unwrap();
        assert_eq!(one.keys().collect::<Vec<_>>(), vec!["exp2"]);
        let some = select_experiments(&config, &vec!["exp3", "exp1"].into()).unwrap();
        assert_eq!(some.keys().collect::<Vec<_>>(), vec!["exp1", "exp3"]);
    }

    #[test]
    fn select_unknown_experiment() {
        assert!(matches!(
            select_experiments(&config(), &"exp9".into()),
            Err(ScriptError::UnknownExperiment(id)) if id == "exp9"
        ));
    }
}
