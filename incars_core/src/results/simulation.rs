//! Simulated mass isotope distributions `s`, in long format
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::results::node::{field, matrix, text, vector, Node};
use crate::results::ResultsError;

/// One mass isotope of one simulated fragment
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimulatedMdv {
    pub experiment: String,
    pub id: String,
    /// `f64::INFINITY` for steady state simulations
    pub time: f64,
    #[serde(rename = "type")]
    pub measurement_type: String,
    pub mass_isotope: usize,
    pub mdv: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    steady_state: bool,
    simulated_data: Vec<SimulatedMdv>,
}

impl Simulation {
    /// Read the simulation records
    ///
    /// When no record has an infinite time the simulation is a time course: each record then
    /// holds a vector of times and an isotope by time matrix, which is split into one
    /// distribution per time point. Otherwise each record holds one steady state distribution.
    pub fn from_value(value: &Value) -> Result<Simulation, ResultsError> {
        let records = Node::classify(value).records()?;
        let times: Vec<Vec<f64>> = records
            .iter()
            .map(|record| vector(field(record, "time")?))
            .collect::<Result<_, _>>()?;
        let steady_state = times.iter().flatten().any(|t| t.is_infinite());

        let mut simulated_data = Vec::new();
        for (record, times) in records.iter().zip(times) {
            let distributions = if steady_state {
                vec![(f64::INFINITY, vector(field(record, "val")?)?)]
            } else {
                time_course(record, &times)?
            };
            for (time, mdv) in distributions {
                explode(record, time, &mdv, &mut simulated_data)?;
            }
        }
        debug!(
            "Read {} simulated values, steady state: {}",
            simulated_data.len(),
            steady_state
        );
        Ok(Simulation {
            steady_state,
            simulated_data,
        })
    }

    pub fn is_steady_state(&self) -> bool {
        self.steady_state
    }

    /// Columns `experiment, id, time, type, mass_isotope, mdv`
    pub fn simulated_data(&self) -> &[SimulatedMdv] {
        &self.simulated_data
    }
}

/// Pair each time point with the distribution simulated for it
fn time_course(
    record: &Map<String, Value>,
    times: &[f64],
) -> Result<Vec<(f64, Vec<f64>)>, ResultsError> {
    let by_time = matrix(field(record, "val")?)?.transpose();
    if by_time.nrows() != times.len() {
        return Err(ResultsError::Format(format!(
            "simulation of {} has {} time points but {} distributions",
            text(field(record, "id")?),
            times.len(),
            by_time.nrows()
        )));
    }
    Ok(times
        .iter()
        .zip(by_time.row_iter())
        .map(|(time, row)| (*time, row.iter().copied().collect()))
        .collect())
}

fn explode(
    record: &Map<String, Value>,
    time: f64,
    mdv: &[f64],
    out: &mut Vec<SimulatedMdv>,
) -> Result<(), ResultsError> {
    let experiment = text(field(record, "expt")?);
    let id = text(field(record, "id")?);
    let measurement_type = text(field(record, "type")?);
    for (mass_isotope, value) in mdv.iter().enumerate() {
        out.push(SimulatedMdv {
            experiment: experiment.clone(),
            id: id.clone(),
            time,
            measurement_type: measurement_type.clone(),
            mass_isotope,
            mdv: *value,
        });
    }
    Ok(())
}
