//! This module provides the record describing one labelling group of a tracer
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// One labelling group of an isotope tracer fed in an experiment
///
/// A tracer with positions of different purity is given as several records sharing
/// `experiment_id`, `met_id`, `tracer_id` and `enrichment`. Each record is written as its own
/// tracer term with its own enrichment entry.
#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct TracerRecord {
    /// Experiment the tracer is used in
    pub experiment_id: String,
    /// Name of the tracer compound, e.g. `[1,2-13C]glucose`
    pub tracer_id: String,
    /// Metabolite the tracer is an isotopomer of
    pub met_id: String,
    /// Ids of the labelled atoms in this labelling group
    pub atom_ids: Vec<i64>,
    /// Mass distribution of the labelling group, `[unlabelled, labelled]`
    pub atom_mdv: Vec<f64>,
    /// Fraction of the metabolite pool made up by the tracer
    pub enrichment: f64,
}
