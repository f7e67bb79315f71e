//! Flux, pool size and mass spectrometry measurement records
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A measured or estimated rate of one reaction
#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct FluxMeasurement {
    pub experiment_id: String,
    /// Reaction the flux was measured for
    pub rxn_id: String,
    /// Typically in mmol/gDW/h
    pub flux: f64,
    pub flux_std_error: f64,
}

/// A measured pool size of one metabolite
#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct PoolMeasurement {
    pub experiment_id: String,
    pub met_id: String,
    /// Typically in mmol/gDW
    pub pool_size: f64,
    pub pool_size_std_error: f64,
}

/// Intensity of one mass isotope of one MS fragment
#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct MsMeasurement {
    pub experiment_id: String,
    /// Metabolite the fragment is derived from
    pub met_id: String,
    /// Fragment id, several fragments can be measured from one metabolite
    pub ms_id: String,
    #[builder(default = "1")]
    pub measurement_replicate: i64,
    /// Atoms of the metabolite contained in the fragment
    pub labelled_atom_ids: Vec<i64>,
    /// Formula of the atoms that cannot carry label, used for natural abundance correction
    #[builder(default = "None")]
    #[serde(default)]
    pub unlabelled_atoms: Option<String>,
    /// M0 is 0, M+1 is 1 and so on
    pub mass_isotope: i64,
    #[builder(default = "None")]
    #[serde(default)]
    pub intensity: Option<f64>,
    #[builder(default = "None")]
    #[serde(default)]
    pub intensity_std_error: Option<f64>,
    /// Only relevant for isotopically non-stationary analysis
    #[builder(default = "0.0")]
    pub time: f64,
}
