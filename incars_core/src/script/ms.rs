//! Writers for MS fragments and their mass isotope distributions, `ms_<experiment_id>`
//!
//! The engine expects one dense vector per fragment measurement, indexed by mass isotope. Rows
//! are therefore passed through [`fill_all_mass_isotope_gaps`] before any text is written.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::data::measurement::MsMeasurement;
use crate::data::schema::validate_table;
use crate::script::matlab::{
    cell_array, class_call, column_vector, format_number, format_optional, ms_var, quote,
    row_vector,
};
use crate::script::ScriptError;
use crate::utils::formula::unlabelled_atoms;

/// Order of the measurement groups: experiment, fragment, replicate, time
fn group_order(a: &MsMeasurement, b: &MsMeasurement) -> Ordering {
    a.experiment_id
        .cmp(&b.experiment_id)
        .then_with(|| a.ms_id.cmp(&b.ms_id))
        .then_with(|| a.measurement_replicate.cmp(&b.measurement_replicate))
        .then_with(|| a.time.total_cmp(&b.time))
}

/// Make the mass isotopes of every measurement group a contiguous range starting at 0
///
/// Rows are grouped by `(experiment_id, ms_id, measurement_replicate, time)`. Missing mass
/// isotopes up to the largest one measured are inserted with the identifying columns of the
/// closest preceding row (or the first row when the gap is at the start) and without intensity
/// or standard error. The result is sorted by group and mass isotope.
///
/// A mass isotope measured twice within a group is an error.
pub fn fill_all_mass_isotope_gaps(
    measurements: &[MsMeasurement],
) -> Result<Vec<MsMeasurement>, ScriptError> {
    validate_table(measurements)?;
    let mut rows: Vec<&MsMeasurement> = measurements.iter().collect();
    rows.sort_by(|a, b| group_order(a, b));

    let mut filled = Vec::with_capacity(rows.len());
    for group in rows.chunk_by(|a, b| group_order(a, b) == Ordering::Equal) {
        let mut by_isotope: BTreeMap<i64, &MsMeasurement> = BTreeMap::new();
        for &row in group {
            if by_isotope.insert(row.mass_isotope, row).is_some() {
                return Err(ScriptError::DuplicateMassIsotope {
                    experiment_id: row.experiment_id.clone(),
                    ms_id: row.ms_id.clone(),
                    replicate: row.measurement_replicate,
                    time: row.time,
                    mass_isotope: row.mass_isotope,
                });
            }
        }
        let (Some(first), Some(max_isotope)) =
            (by_isotope.values().next().copied(), by_isotope.keys().last().copied())
        else {
            continue;
        };
        let mut template = first;
        for mass_isotope in 0..=max_isotope {
            match by_isotope.get(&mass_isotope) {
                Some(row) => {
                    template = *row;
                    filled.push((*row).clone());
                }
                None => {
                    debug!(
                        "Filling missing mass isotope {} of fragment {} in experiment {}",
                        mass_isotope, template.ms_id, template.experiment_id
                    );
                    filled.push(MsMeasurement {
                        mass_isotope,
                        intensity: None,
                        intensity_std_error: None,
                        ..template.clone()
                    });
                }
            }
        }
    }
    Ok(filled)
}

/// Derive `unlabelled_atoms` from the molecular formula of each fragment
///
/// `fragment_formulas` maps `ms_id` to the molecular formula of the fragment. Rows that already
/// carry `unlabelled_atoms`, or whose fragment has no formula, are left unchanged.
pub fn fill_unlabelled_atoms(
    measurements: &[MsMeasurement],
    fragment_formulas: &IndexMap<String, String>,
) -> Result<Vec<MsMeasurement>, ScriptError> {
    measurements
        .iter()
        .map(|row| -> Result<MsMeasurement, ScriptError> {
            let mut row = row.clone();
            if row.unlabelled_atoms.is_none() {
                if let Some(formula) = fragment_formulas.get(&row.ms_id) {
                    row.unlabelled_atoms = Some(unlabelled_atoms(formula, &row.labelled_atom_ids)?);
                }
            }
            Ok(row)
        })
        .collect()
}

/// Define the MS fragments measured in one experiment
///
/// Expects rows that went through [`fill_all_mass_isotope_gaps`]. Fragments are written in
/// order of `ms_id`, each described by the first of its rows.
pub fn define_ms_fragments(measurements: &[MsMeasurement], experiment_id: &str) -> String {
    let mut fragments: BTreeMap<&str, &MsMeasurement> = BTreeMap::new();
    for row in measurements.iter().filter(|m| m.experiment_id == experiment_id) {
        fragments.entry(row.ms_id.as_str()).or_insert(row);
    }

    let mut script = format!(
        "\n% define mass spectrometry measurements for experiment {}\n{} = [...\n",
        experiment_id,
        ms_var(experiment_id)
    );
    for (ms_id, row) in fragments {
        let atoms: Vec<String> = row.labelled_atom_ids.iter().map(|a| a.to_string()).collect();
        let term = format!("{}: {} @ {}", ms_id, row.met_id, atoms.join(" "));
        let mut properties = Vec::new();
        if let Some(unlabelled) = row.unlabelled_atoms.as_deref().filter(|u| !u.is_empty()) {
            properties.push(("more", quote(unlabelled)));
        }
        script.push_str(&class_call("msdata", Some(&quote(&term)), &properties));
        script.push_str(",...\n");
    }
    script.push_str("];\n");
    script
}

/// Define the mass isotope distributions measured in one experiment
///
/// Expects rows that went through [`fill_all_mass_isotope_gaps`]. Each `(replicate, time)`
/// group of a fragment becomes one column of the intensity and standard error matrices.
/// Columns shorter than the longest column of the fragment are padded with `NaN`.
pub fn define_ms_measurements(measurements: &[MsMeasurement], experiment_id: &str) -> String {
    let mut fragments: BTreeMap<&str, Vec<&MsMeasurement>> = BTreeMap::new();
    for row in measurements.iter().filter(|m| m.experiment_id == experiment_id) {
        fragments.entry(row.ms_id.as_str()).or_default().push(row);
    }

    let variable = ms_var(experiment_id);
    let mut script = format!(
        "\n% define mass spectrometry measurements for experiment {}\n",
        experiment_id
    );
    for (ms_id, mut rows) in fragments {
        rows.sort_by(|a, b| group_order(a, b).then(a.mass_isotope.cmp(&b.mass_isotope)));
        let columns: Vec<&[&MsMeasurement]> = rows
            .chunk_by(|a, b| group_order(a, b) == Ordering::Equal)
            .collect();
        let length = columns.iter().map(|c| c.len()).max().unwrap_or(0);

        let mut intensities = Vec::with_capacity(columns.len());
        let mut std_errors = Vec::with_capacity(columns.len());
        let mut ids = Vec::with_capacity(columns.len());
        let mut times = Vec::with_capacity(columns.len());
        for column in &columns {
            intensities.push(padded_column(column, length, |m| m.intensity));
            std_errors.push(padded_column(column, length, |m| m.intensity_std_error));
            let first = column[0];
            ids.push(quote(&measurement_id(
                experiment_id,
                ms_id,
                first.time,
                first.measurement_replicate,
            )));
            times.push(format_number(first.time));
        }
        script.push_str(&format!(
            "{}{{{}}}.idvs = idv({}, 'id', {}, 'std', {}, 'time', {});\n",
            variable,
            quote(ms_id),
            row_vector(&intensities),
            cell_array(&ids),
            row_vector(&std_errors),
            row_vector(&times)
        ));
    }
    script
}

fn padded_column<F>(column: &[&MsMeasurement], length: usize, value: F) -> String
where
    F: Fn(&MsMeasurement) -> Option<f64>,
{
    let mut items: Vec<String> = column.iter().map(|&m| format_optional(value(m))).collect();
    items.resize(length, "NaN".to_string());
    column_vector(&items)
}

/// Identifier of one measurement column, `<experiment>_<ms_id>_<time>_<replicate>`
fn measurement_id(experiment_id: &str, ms_id: &str, time: f64, replicate: i64) -> String {
    format!(
        "{}_{}_{}_{}",
        experiment_id,
        ms_id,
        format_number(time).replace('.', "_"),
        replicate
    )
}

/// Define fragments and measurements of one experiment
///
/// An experiment without MS measurements yields an empty string and a warning.
pub fn define_ms_data(
    measurements: &[MsMeasurement],
    experiment_id: &str,
) -> Result<String, ScriptError> {
    let filled = fill_all_mass_isotope_gaps(measurements)?;
    if !filled.iter().any(|m| m.experiment_id == experiment_id) {
        warn!("No MS measurements found for experiment {}", experiment_id);
        return Ok(String::new());
    }
    let mut script = define_ms_fragments(&filled, experiment_id);
    script.push_str(&define_ms_measurements(&filled, experiment_id));
    Ok(script)
}
