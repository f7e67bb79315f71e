//! Generation of the INCA script from the input tables
//!
//! The writers in this module rely on a naming convention for the engine variables:
//!
//! - `r`: the reactions of the model
//! - `t_<experiment_id>`: the tracers of an experiment
//! - `f_<experiment_id>`: the flux measurements of an experiment
//! - `ms_<experiment_id>`: the MS fragments and their measurements
//! - `p_<experiment_id>`: the pool size measurements
//! - `e_<experiment_id>`: the experiment itself
//! - `m`: the model
//!
//! Writers return text fragments and never touch a [`ScriptDocument`](document::ScriptDocument)
//! themselves; [`assembler`] puts the fragments into their blocks.
use thiserror::Error;

use crate::data::schema::SchemaError;
use crate::utils::formula::FormulaError;

pub mod assembler;
pub mod config;
pub mod document;
pub mod experiment;
pub mod matlab;
pub mod measurements;
pub mod ms;
pub mod options;
pub mod reactions;
pub mod runner;
pub mod tracers;

/// Errors raised while writing a script
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("Block name {0} not recognized")]
    UnknownBlock(String),
    #[error("Unknown measurement type {0}. Valid types are: 'data_flx', 'data_ms', 'data_cxn'")]
    UnknownMeasurementType(String),
    #[error("{0} is not yet supported")]
    NotImplemented(String),
    #[error("{0}")]
    Precondition(String),
    #[error("Experiment {0} has no measurements in the supplied tables")]
    UnknownExperiment(String),
    #[error("Mass isotope {mass_isotope} is measured more than once for fragment {ms_id} in experiment {experiment_id} (replicate {replicate}, time {time})")]
    DuplicateMassIsotope {
        experiment_id: String,
        ms_id: String,
        replicate: i64,
        time: f64,
        mass_isotope: i64,
    },
    #[error("Unable to write script")]
    Io(#[from] std::io::Error),
}
