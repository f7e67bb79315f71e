//! Validation of the input tables against their column contracts
//!
//! Every table is checked row by row before any script text is produced. The first violation
//! found is returned, naming the table, the row, the column and the broken constraint.
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::data::measurement::{FluxMeasurement, MsMeasurement, PoolMeasurement};
use crate::data::reaction::ReactionRecord;
use crate::data::tracer::TracerRecord;

/// Experiment ids are used in engine variable names
static EXPERIMENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w-]+$").unwrap_or_else(|e| panic!("invalid experiment id pattern: {e}"))
});

/// Tolerance used when checking that a mass distribution sums to at most one
const MDV_SUM_TOLERANCE: f64 = 1e-9;

/// An input table failed its declared contract
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Schema violation in {table} row {row}, column `{column}` (value {value:?}): {constraint}")]
pub struct SchemaError {
    pub table: &'static str,
    pub row: usize,
    pub column: &'static str,
    pub value: String,
    pub constraint: String,
}

/// Row level contract of an input table
pub trait Validate {
    /// Name of the table used in error messages
    const TABLE: &'static str;

    /// Check one row, `row` is its position in the table
    fn validate(&self, row: usize) -> Result<(), SchemaError>;
}

/// Validate every row of a table
pub fn validate_table<T: Validate>(rows: &[T]) -> Result<(), SchemaError> {
    rows.iter()
        .enumerate()
        .try_for_each(|(row, record)| record.validate(row))
}

/// Validate the reactions table, which additionally requires unique reaction ids
pub fn validate_reactions(reactions: &[ReactionRecord]) -> Result<(), SchemaError> {
    validate_table(reactions)?;
    let mut seen = HashSet::new();
    for (row, reaction) in reactions.iter().enumerate() {
        if !seen.insert(reaction.rxn_id.as_str()) {
            return Err(violation::<ReactionRecord>(
                row,
                "rxn_id",
                &reaction.rxn_id,
                "reaction ids must be unique",
            ));
        }
    }
    Ok(())
}

/// Check that every flux measurement refers to a reaction of the model
pub fn validate_flux_references(
    fluxes: &[FluxMeasurement],
    reactions: &[ReactionRecord],
) -> Result<(), SchemaError> {
    let rxn_ids: HashSet<&str> = reactions.iter().map(|r| r.rxn_id.as_str()).collect();
    for (row, flux) in fluxes.iter().enumerate() {
        if !rxn_ids.contains(flux.rxn_id.as_str()) {
            return Err(violation::<FluxMeasurement>(
                row,
                "rxn_id",
                &flux.rxn_id,
                "must name a reaction of the reactions table",
            ));
        }
    }
    Ok(())
}

fn violation<T: Validate>(
    row: usize,
    column: &'static str,
    value: impl ToString,
    constraint: &str,
) -> SchemaError {
    SchemaError {
        table: T::TABLE,
        row,
        column,
        value: value.to_string(),
        constraint: constraint.to_string(),
    }
}

fn check_experiment_id<T: Validate>(row: usize, experiment_id: &str) -> Result<(), SchemaError> {
    if !EXPERIMENT_ID.is_match(experiment_id) {
        return Err(violation::<T>(
            row,
            "experiment_id",
            experiment_id,
            "must match ^[\\w-]+$ (letters, digits, underscore and hyphen)",
        ));
    }
    Ok(())
}

fn check_not_empty<T: Validate>(
    row: usize,
    column: &'static str,
    value: &str,
) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(violation::<T>(row, column, value, "must not be empty"));
    }
    Ok(())
}

fn check_finite<T: Validate>(row: usize, column: &'static str, value: f64) -> Result<(), SchemaError> {
    if !value.is_finite() {
        return Err(violation::<T>(row, column, value, "must be a finite number"));
    }
    Ok(())
}

fn check_std_error<T: Validate>(
    row: usize,
    column: &'static str,
    value: f64,
) -> Result<(), SchemaError> {
    check_finite::<T>(row, column, value)?;
    if value < 0.0 {
        return Err(violation::<T>(row, column, value, "must not be negative"));
    }
    Ok(())
}

impl Validate for ReactionRecord {
    const TABLE: &'static str = "reactions";

    fn validate(&self, row: usize) -> Result<(), SchemaError> {
        check_not_empty::<Self>(row, "rxn_id", &self.rxn_id)?;
        if !self.rxn_eqn.contains("->") {
            return Err(violation::<Self>(
                row,
                "rxn_eqn",
                &self.rxn_eqn,
                "must contain a reaction arrow, -> or <->",
            ));
        }
        if let Err(err) = self.equation() {
            return Err(violation::<Self>(row, "rxn_eqn", &self.rxn_eqn, &err.to_string()));
        }
        Ok(())
    }
}

impl Validate for TracerRecord {
    const TABLE: &'static str = "tracers";

    fn validate(&self, row: usize) -> Result<(), SchemaError> {
        check_experiment_id::<Self>(row, &self.experiment_id)?;
        check_not_empty::<Self>(row, "tracer_id", &self.tracer_id)?;
        check_not_empty::<Self>(row, "met_id", &self.met_id)?;
        if self.atom_mdv.len() != 2 {
            return Err(violation::<Self>(
                row,
                "atom_mdv",
                format!("{:?}", self.atom_mdv),
                "must hold exactly two values, [unlabelled, labelled]",
            ));
        }
        let in_range = self.atom_mdv.iter().all(|v| (0.0..=1.0).contains(v));
        let sum: f64 = self.atom_mdv.iter().sum();
        if !in_range || sum > 1.0 + MDV_SUM_TOLERANCE {
            return Err(violation::<Self>(
                row,
                "atom_mdv",
                format!("{:?}", self.atom_mdv),
                "values must lie in [0, 1] and sum to at most 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.enrichment) {
            return Err(violation::<Self>(
                row,
                "enrichment",
                self.enrichment,
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

impl Validate for FluxMeasurement {
    const TABLE: &'static str = "flux measurements";

    fn validate(&self, row: usize) -> Result<(), SchemaError> {
        check_experiment_id::<Self>(row, &self.experiment_id)?;
        check_not_empty::<Self>(row, "rxn_id", &self.rxn_id)?;
        check_finite::<Self>(row, "flux", self.flux)?;
        check_std_error::<Self>(row, "flux_std_error", self.flux_std_error)
    }
}

impl Validate for PoolMeasurement {
    const TABLE: &'static str = "pool size measurements";

    fn validate(&self, row: usize) -> Result<(), SchemaError> {
        check_experiment_id::<Self>(row, &self.experiment_id)?;
        check_not_empty::<Self>(row, "met_id", &self.met_id)?;
        check_finite::<Self>(row, "pool_size", self.pool_size)?;
        check_std_error::<Self>(row, "pool_size_std_error", self.pool_size_std_error)
    }
}

impl Validate for MsMeasurement {
    const TABLE: &'static str = "ms measurements";

    fn validate(&self, row: usize) -> Result<(), SchemaError> {
        check_experiment_id::<Self>(row, &self.experiment_id)?;
        check_not_empty::<Self>(row, "met_id", &self.met_id)?;
        check_not_empty::<Self>(row, "ms_id", &self.ms_id)?;
        if self.mass_isotope < 0 {
            return Err(violation::<Self>(
                row,
                "mass_isotope",
                self.mass_isotope,
                "must not be negative",
            ));
        }
        if let Some(std_error) = self.intensity_std_error {
            if !std_error.is_nan() {
                check_std_error::<Self>(row, "intensity_std_error", std_error)?;
            }
        }
        if self.time.is_nan() {
            return Err(violation::<Self>(row, "time", self.time, "must be a number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod schema_tests {
    use super::*;
    use crate::data::measurement::FluxMeasurementBuilder;
    use crate::data::tracer::TracerRecordBuilder;

    fn tracer() -> TracerRecord {
        TracerRecordBuilder::default()
            .experiment_id("exp1")
            .tracer_id("[1-13C]A")
            .met_id("A")
            .atom_ids(vec![1])
            .atom_mdv(vec![0.02, 0.98])
            .enrichment(0.5)
            .build()
            .unwrap()
    }

    #[test]
    fn valid_tables() {
        let reactions = vec![
            ReactionRecord::new("r1", "A -> B"),
            ReactionRecord::new("r2", "B <-> C"),
        ];
        assert!(validate_reactions(&reactions).is_ok());
        assert!(validate_table(&[tracer()]).is_ok());
    }

    #[test]
    fn missing_arrow() {
        let reactions = vec![ReactionRecord::new("r1", "A = B")];
        let err = validate_reactions(&reactions).unwrap_err();
        assert_eq!(err.table, "reactions");
        assert_eq!(err.column, "rxn_eqn");
        assert_eq!(err.row, 0);
    }

    #[test]
    fn duplicate_reaction_ids() {
        let reactions = vec![
            ReactionRecord::new("r1", "A -> B"),
            ReactionRecord::new("r1", "B -> C"),
        ];
        let err = validate_reactions(&reactions).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.column, "rxn_id");
    }

    #[test]
    fn experiment_id_pattern() {
        let mut bad = tracer();
        bad.experiment_id = "exp 1".to_string();
        let err = validate_table(&[tracer(), bad]).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.column, "experiment_id");
        assert!(err.to_string().contains("exp 1"));
    }

    #[test]
    fn atom_mdv_contract() {
        let mut bad = tracer();
        bad.atom_mdv = vec![0.5, 0.6];
        assert_eq!(validate_table(&[bad]).unwrap_err().column, "atom_mdv");
        let mut bad = tracer();
        bad.atom_mdv = vec![1.0];
        assert_eq!(validate_table(&[bad]).unwrap_err().column, "atom_mdv");
    }

    #[test]
    fn negative_std_error() {
        let flux = FluxMeasurementBuilder::default()
            .experiment_id("exp1")
            .rxn_id("r1")
            .flux(1.0)
            .flux_std_error(-0.1)
            .build()
            .unwrap();
        let err = validate_table(&[flux]).unwrap_err();
        assert_eq!(err.table, "flux measurements");
        assert_eq!(err.column, "flux_std_error");
    }

    #[test]
    fn flux_must_reference_known_reaction() {
        let reactions = vec![ReactionRecord::new("r1", "A -> B")];
        let fluxes = vec![FluxMeasurementBuilder::default()
            .experiment_id("exp1")
            .rxn_id("r9")
            .flux(1.0)
            .flux_std_error(0.1)
            .build()
            .unwrap()];
        let err = validate_flux_references(&fluxes, &reactions).unwrap_err();
        assert_eq!(err.column, "rxn_id");
        assert_eq!(err.value, "r9");
    }
}
