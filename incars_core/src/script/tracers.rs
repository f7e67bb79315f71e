//! Writer for the tracers `t_<experiment_id>` of an experiment
use std::cmp::Ordering;

use log::warn;

use crate::data::schema::validate_table;
use crate::data::tracer::TracerRecord;
use crate::script::matlab::{format_number, quote, row_vector, tracers_var};
use crate::script::ScriptError;

/// Define the tracers fed in one experiment
///
/// Every labelling group row becomes one tracer term, with its own entry in the enrichment
/// vector and its own column of the atom mass distribution matrix. Rows are ordered by
/// metabolite, tracer id and enrichment, and columns are counted across the whole experiment.
pub fn define_tracers(
    tracers: &[TracerRecord],
    experiment_id: &str,
) -> Result<String, ScriptError> {
    validate_table(tracers)?;
    let mut rows: Vec<&TracerRecord> = tracers
        .iter()
        .filter(|t| t.experiment_id == experiment_id)
        .collect();
    if rows.is_empty() {
        warn!("No tracers defined for experiment {}", experiment_id);
    }
    rows.sort_by(|a, b| tracer_order(a, b));

    let variable = tracers_var(experiment_id);
    let mut script = format!(
        "% define tracers used in {}\n{} = tracer({{...\n",
        experiment_id, variable
    );
    for tracer in &rows {
        let atoms: Vec<String> = tracer.atom_ids.iter().map(|a| a.to_string()).collect();
        let term = format!("{}: {} @ {}", tracer.tracer_id, tracer.met_id, atoms.join(" "));
        script.push_str(&format!("{},...\n", quote(&term)));
    }
    script.push_str("});\n");

    let enrichments: Vec<String> = rows.iter().map(|t| format_number(t.enrichment)).collect();
    script.push_str(&format!("{}.frac = {};\n", variable, row_vector(&enrichments)));

    for (column, tracer) in rows.iter().enumerate() {
        let mdv: Vec<String> = tracer.atom_mdv.iter().map(|v| format_number(*v)).collect();
        script.push_str(&format!(
            "{}.atoms.it(:,{}) = {};\n",
            variable,
            column + 1,
            row_vector(&mdv)
        ));
    }
    Ok(script)
}

/// Tracers are written grouped by metabolite, tracer id and enrichment
fn tracer_order(a: &TracerRecord, b: &TracerRecord) -> Ordering {
    a.met_id
        .cmp(&b.met_id)
        .then_with(|| a.tracer_id.cmp(&b.tracer_id))
        .then_with(|| a.enrichment.total_cmp(&b.enrichment))
}
