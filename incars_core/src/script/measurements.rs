//! Writers for flux `f_<experiment_id>` and pool size `p_<experiment_id>` measurements
use log::warn;

use crate::data::measurement::{FluxMeasurement, PoolMeasurement};
use crate::data::schema::validate_table;
use crate::script::matlab::{class_call, flux_var, format_number, pool_var, quote};
use crate::script::ScriptError;

/// Define the flux measurements of one experiment
///
/// An experiment without flux measurements yields an empty string and a warning.
pub fn define_flux_measurements(
    fluxes: &[FluxMeasurement],
    experiment_id: &str,
) -> Result<String, ScriptError> {
    validate_table(fluxes)?;
    let rows: Vec<(&str, f64, f64)> = fluxes
        .iter()
        .filter(|f| f.experiment_id == experiment_id)
        .map(|f| (f.rxn_id.as_str(), f.flux, f.flux_std_error))
        .collect();
    if rows.is_empty() {
        warn!("No flux measurements found for experiment {}", experiment_id);
        return Ok(String::new());
    }
    Ok(data_vector(
        &format!("flux measurements for experiment {}", experiment_id),
        &flux_var(experiment_id),
        &rows,
    ))
}

/// Define the pool size measurements of one experiment
///
/// An experiment without pool size measurements yields an empty string and a warning.
pub fn define_pool_measurements(
    pools: &[PoolMeasurement],
    experiment_id: &str,
) -> Result<String, ScriptError> {
    validate_table(pools)?;
    let rows: Vec<(&str, f64, f64)> = pools
        .iter()
        .filter(|p| p.experiment_id == experiment_id)
        .map(|p| (p.met_id.as_str(), p.pool_size, p.pool_size_std_error))
        .collect();
    if rows.is_empty() {
        warn!("No pool size measurements found for experiment {}", experiment_id);
        return Ok(String::new());
    }
    Ok(data_vector(
        &format!("pool measurements for experiment {}", experiment_id),
        &pool_var(experiment_id),
        &rows,
    ))
}

/// A vector of `data` objects, one per `(id, value, std)` row
fn data_vector(description: &str, variable: &str, rows: &[(&str, f64, f64)]) -> String {
    let mut script = format!("\n% define {}\n{} = [...\n", description, variable);
    for (id, value, std) in rows {
        let call = class_call(
            "data",
            Some(&quote(id)),
            &[("val", format_number(*value)), ("std", format_number(*std))],
        );
        script.push_str(&call);
        script.push_str(",...\n");
    }
    script.push_str("];\n");
    script
}
