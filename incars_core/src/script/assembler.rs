//! Assembly of a complete script from the input tables
use derive_builder::Builder;
use log::info;

use crate::data::measurement::{FluxMeasurement, MsMeasurement, PoolMeasurement};
use crate::data::reaction::ReactionRecord;
use crate::data::schema::{validate_flux_references, validate_reactions, validate_table};
use crate::data::tracer::TracerRecord;
use crate::script::config::{make_experiment_data_config, select_experiments, ExperimentSelection};
use crate::script::document::{Block, ScriptDocument};
use crate::script::experiment::{define_experiment, define_model, MeasurementType};
use crate::script::measurements::{define_flux_measurements, define_pool_measurements};
use crate::script::ms::define_ms_data;
use crate::script::reactions::define_reactions;
use crate::script::tracers::define_tracers;
use crate::script::ScriptError;

/// The tables a script is generated from
#[derive(Builder, Debug, Clone, Default, PartialEq)]
#[builder(setter(into))]
pub struct ModelData {
    pub reactions: Vec<ReactionRecord>,
    pub tracers: Vec<TracerRecord>,
    #[builder(default)]
    pub flux_measurements: Option<Vec<FluxMeasurement>>,
    #[builder(default)]
    pub ms_measurements: Option<Vec<MsMeasurement>>,
    #[builder(default)]
    pub pool_measurements: Option<Vec<PoolMeasurement>>,
    /// Experiments with NMR data, which cannot be written yet
    #[builder(default)]
    pub nmr_experiment_ids: Option<Vec<String>>,
}

impl ModelData {
    /// Check every table, and that flux measurements only name known reactions
    pub fn validate(&self) -> Result<(), ScriptError> {
        validate_reactions(&self.reactions)?;
        validate_table(&self.tracers)?;
        if let Some(fluxes) = &self.flux_measurements {
            validate_table(fluxes)?;
            validate_flux_references(fluxes, &self.reactions)?;
        }
        if let Some(ms) = &self.ms_measurements {
            validate_table(ms)?;
        }
        if let Some(pools) = &self.pool_measurements {
            validate_table(pools)?;
        }
        Ok(())
    }
}

/// Create a script defining the reactions, the selected experiments and the model
///
/// All tables are validated before any text is written. Experiments are taken from the
/// measurement tables, in order of first appearance. The returned document has empty
/// options, model modification and runner blocks for the caller to fill.
pub fn create_inca_script_from_data(
    data: &ModelData,
    selection: &ExperimentSelection,
) -> Result<ScriptDocument, ScriptError> {
    data.validate()?;
    let config = make_experiment_data_config(
        data.flux_measurements.as_deref(),
        data.ms_measurements.as_deref(),
        data.pool_measurements.as_deref(),
        data.nmr_experiment_ids.as_deref(),
    );
    let config = select_experiments(&config, selection)?;

    let mut script = ScriptDocument::new();
    for (experiment_id, measurement_types) in &config {
        info!(
            "Adding experiment {} with {} measurement categories",
            experiment_id,
            measurement_types.len()
        );
        script.add_to_block(Block::Tracers, &define_tracers(&data.tracers, experiment_id)?);
        for measurement_type in measurement_types {
            match measurement_type {
                MeasurementType::Flux => {
                    let fluxes = data.flux_measurements.as_deref().unwrap_or_default();
                    script.add_to_block(
                        Block::Fluxes,
                        &define_flux_measurements(fluxes, experiment_id)?,
                    );
                }
                MeasurementType::Ms => {
                    let ms = data.ms_measurements.as_deref().unwrap_or_default();
                    script.add_to_block(Block::MsFragments, &define_ms_data(ms, experiment_id)?);
                }
                MeasurementType::PoolSize => {
                    let pools = data.pool_measurements.as_deref().unwrap_or_default();
                    script.add_to_block(
                        Block::PoolSizes,
                        &define_pool_measurements(pools, experiment_id)?,
                    );
                }
                MeasurementType::Nmr => {
                    return Err(ScriptError::NotImplemented("NMR data".to_string()))
                }
            }
        }
        script.add_to_block(
            Block::Experiments,
            &define_experiment(experiment_id, measurement_types)?,
        );
    }

    script.add_to_block(Block::Reactions, &define_reactions(&data.reactions)?);
    let experiment_ids: Vec<&str> = config.keys().map(|id| id.as_str()).collect();
    script.add_to_block(Block::Model, &define_model(&experiment_ids));
    Ok(script)
}

#[cfg(test)]
mod assembler_tests {
    use super::*;
    use crate::data::measurement::{FluxMeasurementBuilder, MsMeasurementBuilder};
    use crate::data::tracer::TracerRecordBuilder;
    use simplelog::{Config, LevelFilter, TestLogger};

    fn init_logger() {
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    }

    fn tracer(experiment_id: &str) -> TracerRecord {
        TracerRecordBuilder::default()
            .experiment_id(experiment_id)
            .tracer_id("[1-13C]A")
            .met_id("A")
            .atom_ids(vec![1])
            .atom_mdv(vec![0.05, 0.95])
            .enrichment(1.0)
            .build()
            .unwrap()
    }

    fn flux(experiment_id: &str, rxn_id: &str) -> FluxMeasurement {
        FluxMeasurementBuilder::default()
            .experiment_id(experiment_id)
            .rxn_id(rxn_id)
            .flux(1.0)
            .flux_std_error(0.1)
            .build()
            .unwrap()
    }

    fn simple_data() -> ModelData {
        ModelDataBuilder::default()
            .reactions(vec![
                ReactionRecord::new("R1", "A (C1:a) -> B (C1:a)"),
                ReactionRecord::new("R2", "B (C1:a) -> C (C1:a)"),
            ])
            .tracers(vec![tracer("exp1")])
            .flux_measurements(Some(vec![flux("exp1", "R1")]))
            .build()
            .unwrap()
    }

    #[test]
    fn single_experiment_script() {
        init_logger();
        let script = create_inca_script_from_data(&simple_data(), &ExperimentSelection::All).unwrap();
        let text = script.render();

        let reactions = text.find("% REACTION BLOCK").unwrap();
        let tracers = text.find("% TRACERS BLOCK").unwrap();
        let experiments = text.find("% EXPERIMENTAL_DATA BLOCK").unwrap();
        let model = text.find("% MODEL BLOCK").unwrap();
        assert!(reactions < tracers && tracers < experiments && experiments < model);

        assert_eq!(text.matches("t_exp1 = tracer(").count(), 1);
        assert_eq!(text.matches("f_exp1 = [").count(), 1);
        assert_eq!(text.matches("m = model(r, 'expts', [e_exp1]);").count(), 1);
        assert!(script
            .block(Block::Experiments)
            .contains("e_exp1 = experiment(t_exp1, 'id', 'exp1', 'data_flx', f_exp1);\n"));
        assert!(script.block(Block::Reactions).contains("'id', 'R2'"));
    }

    #[test]
    fn experiments_follow_data_order() {
        init_logger();
        let mut data = simple_data();
        data.tracers.push(tracer("exp2"));
        data.flux_measurements = Some(vec![flux("exp2", "R2"), flux("exp1", "R1")]);
        data.ms_measurements = Some(vec![MsMeasurementBuilder::default()
            .experiment_id("exp1")
            .met_id("B")
            .ms_id("B1")
            .labelled_atom_ids(vec![1])
            .mass_isotope(0)
            .intensity(Some(1.0))
            .intensity_std_error(Some(0.01))
            .build()
            .unwrap()]);
        let script = create_inca_script_from_data(&data, &ExperimentSelection::All).unwrap();
        assert!(script
            .block(Block::Model)
            .contains("m = model(r, 'expts', [e_exp2,e_exp1]);"));
        assert!(script.block(Block::Experiments).contains(
            "e_exp1 = experiment(t_exp1, 'id', 'exp1', 'data_flx', f_exp1, 'data_ms', ms_exp1);"
        ));
        assert!(script.block(Block::MsFragments).contains("msdata('B1: B @ 1')"));

        let script = create_inca_script_from_data(&data, &"exp1".into()).unwrap();
        assert!(!script.render().contains("e_exp2"));
    }

    #[test]
    fn unknown_flux_reaction_fails_before_writing() {
        let mut data = simple_data();
        data.flux_measurements = Some(vec![flux("exp1", "R9")]);
        assert!(matches!(
            create_inca_script_from_data(&data, &ExperimentSelection::All),
            Err(ScriptError::Schema(err)) if err.column == "rxn_id"
        ));
    }

    #[test]
    fn nmr_data_is_not_supported() {
        let mut data = simple_data();
        data.nmr_experiment_ids = Some(vec!["exp1".to_string()]);
        assert!(matches!(
            create_inca_script_from_data(&data, &ExperimentSelection::All),
            Err(ScriptError::NotImplemented(_))
        ));
        // Unselected NMR experiments do not block the script
        data.nmr_experiment_ids = Some(vec!["exp2".to_string()]);
        assert!(create_inca_script_from_data(&data, &"exp1".into()).is_ok());
    }

    #[test]
    fn unknown_selected_experiment() {
        assert!(matches!(
            create_inca_script_from_data(&simple_data(), &"exp5".into()),
            Err(ScriptError::UnknownExperiment(_))
        ));
    }
}
