//! The model `m` as it was fitted: metabolites, states, rates and options
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::results::node::{field, number, records_of, text, Node};
use crate::results::table::Table;
use crate::results::ResultsError;

/// Direction of a rate record, reversible reactions have one of each
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn parse(tag: &str) -> Result<Direction, ResultsError> {
        match tag {
            "f" => Ok(Direction::Forward),
            "b" => Ok(Direction::Backward),
            other => Err(ResultsError::Format(format!(
                "rate direction must be 'f' or 'b', found '{}'",
                other
            ))),
        }
    }
}

/// Rate of one direction of a reaction
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub id: String,
    pub direction: Direction,
    pub value: f64,
}

/// A flux in net/exchange form
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NetExchFlux {
    /// Reaction id, suffixed with ` net` or ` exch` for reversible reactions
    pub id: String,
    pub value: f64,
}

impl Display for NetExchFlux {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.value)
    }
}

/// Convert directional rates into net and exchange fluxes
///
/// Rates sharing an id are grouped, in order of first appearance. A reaction with a forward and
/// a backward rate becomes `<id> net` (forward minus backward) and `<id> exch` (the smaller of
/// the two). A reaction with a single rate is passed through.
///
/// # Examples
/// ```rust
/// use incars_core::results::model::{convert_reactions_to_net_exch_format, Direction, RateRecord};
/// let rates = vec![
///     RateRecord { id: "B".into(), direction: Direction::Forward, value: 2.0 },
///     RateRecord { id: "B".into(), direction: Direction::Backward, value: 1.0 },
/// ];
/// let fluxes = convert_reactions_to_net_exch_format(&rates).unwrap();
/// assert_eq!(fluxes[0].id, "B net");
/// assert_eq!(fluxes[1].value, 1.0);
/// ```
pub fn convert_reactions_to_net_exch_format(
    rates: &[RateRecord],
) -> Result<Vec<NetExchFlux>, ResultsError> {
    let mut groups: IndexMap<&str, Vec<&RateRecord>> = IndexMap::new();
    for rate in rates {
        groups.entry(rate.id.as_str()).or_default().push(rate);
    }

    let mut fluxes = Vec::with_capacity(rates.len());
    for (id, group) in groups {
        match group.as_slice() {
            [single] => fluxes.push(NetExchFlux {
                id: id.to_string(),
                value: single.value,
            }),
            [first, second] => {
                let (forward, backward) = match (first.direction, second.direction) {
                    (Direction::Forward, Direction::Backward) => (first, second),
                    (Direction::Backward, Direction::Forward) => (second, first),
                    _ => {
                        return Err(ResultsError::Precondition(format!(
                            "reaction {} has two rates in the same direction",
                            id
                        )))
                    }
                };
                fluxes.push(NetExchFlux {
                    id: format!("{} net", id),
                    value: forward.value - backward.value,
                });
                fluxes.push(NetExchFlux {
                    id: format!("{} exch", id),
                    value: forward.value.min(backward.value),
                });
            }
            _ => {
                return Err(ResultsError::Precondition(format!(
                    "reaction {} has {} rates, expected one or two",
                    id,
                    group.len()
                )))
            }
        }
    }
    Ok(fluxes)
}

/// The model object saved with the results
#[derive(Debug, Clone, PartialEq)]
pub struct IncaModel {
    metabolite_ids: Vec<String>,
    states: Table,
    rates: Vec<RateRecord>,
    options: IndexMap<String, Value>,
}

impl IncaModel {
    pub fn from_value(value: &Value) -> Result<IncaModel, ResultsError> {
        let raw = match Node::classify(value) {
            Node::Record(record) => record,
            _ => return Err(ResultsError::Format("model must be a record".to_string())),
        };

        let metabolite_ids = records_of(raw, "mets")?
            .into_iter()
            .map(|met| field(met, "id").map(text))
            .collect::<Result<Vec<_>, _>>()?;
        let states = Table::from_records(&records_of(raw, "states")?, None);
        let rates = match raw.get("rates") {
            Some(rates) => Node::classify(rates)
                .records()?
                .into_iter()
                .map(rate_record)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let options = match raw.get("options") {
            Some(Value::Object(options)) => options
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => IndexMap::new(),
        };
        debug!(
            "Read model with {} metabolites and {} rates",
            metabolite_ids.len(),
            rates.len()
        );
        Ok(IncaModel {
            metabolite_ids,
            states,
            rates,
            options,
        })
    }

    pub fn metabolite_ids(&self) -> &[String] {
        &self.metabolite_ids
    }

    /// Metabolites with their balancing and source/sink status
    pub fn states(&self) -> &Table {
        &self.states
    }

    /// Directional rates of the reactions, as set on the model
    pub fn rates(&self) -> &[RateRecord] {
        &self.rates
    }

    pub fn rates_in_net_exch_format(&self) -> Result<Vec<NetExchFlux>, ResultsError> {
        convert_reactions_to_net_exch_format(&self.rates)
    }

    /// Options the engine ran with
    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }
}

/// Rate records carry their value either directly or in a nested `flx` record
fn rate_record(record: &Map<String, Value>) -> Result<RateRecord, ResultsError> {
    let value = match record.get("val") {
        Some(value) => number(value)?,
        None => match Node::classify(field(record, "flx")?) {
            Node::Record(flx) => number(field(flx, "val")?)?,
            Node::Leaf(value) => number(value)?,
            Node::RecordArray(_) => {
                return Err(ResultsError::Format(
                    "flx of a rate must be a single record".to_string(),
                ))
            }
        },
    };
    Ok(RateRecord {
        id: text(field(record, "id")?),
        direction: Direction::parse(&text(field(record, "dir")?))?,
        value,
    })
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use serde_json::json;

    fn rate(id: &str, direction: Direction, value: f64) -> RateRecord {
        RateRecord {
            id: id.to_string(),
            direction,
            value,
        }
    }

    #[test]
    fn net_exch_conversion() {
        let rates = vec![
            rate("A", Direction::Forward, 1.0),
            rate("B", Direction::Forward, 2.0),
            rate("B", Direction::Backward, 1.0),
            rate("C", Direction::Forward, 3.0),
        ];
        let found: Vec<(String, f64)> = convert_reactions_to_net_exch_format(&rates)
            .unwrap()
            .into_iter()
            .map(|f| (f.id, f.value))
            .collect();
        let expected: Vec<(String, f64)> = vec![
            ("A".to_string(), 1.0),
            ("B net".to_string(), 1.0),
            ("B exch".to_string(), 1.0),
            ("C".to_string(), 3.0),
        ];
        assert_eq!(found, expected);
    }

    #[test]
    fn backward_listed_first() {
        let rates = vec![
            rate("B", Direction::Backward, 5.0),
            rate("B", Direction::Forward, 2.0),
        ];
        let fluxes = convert_reactions_to_net_exch_format(&rates).unwrap();
        assert_eq!(fluxes[0].value, -3.0);
        assert_eq!(fluxes[1].value, 2.0);
    }

    #[test]
    fn too_many_rates() {
        let rates = vec![
            rate("B", Direction::Forward, 1.0),
            rate("B", Direction::Backward, 1.0),
            rate("B", Direction::Forward, 1.0),
        ];
        assert!(matches!(
            convert_reactions_to_net_exch_format(&rates),
            Err(ResultsError::Precondition(_))
        ));
        let same_direction = vec![rate("B", Direction::Forward, 1.0), rate("B", Direction::Forward, 2.0)];
        assert!(convert_reactions_to_net_exch_format(&same_direction).is_err());
    }

    #[test]
    fn model_from_value() {
        let raw = json!({
            "mets": [{"id": "A"}, {"id": "B"}],
            "states": {"id": "A.ext", "bal": 0, "src": 1},
            "rates": [
                {"id": "R1", "dir": "f", "flx": {"val": 2.0, "lb": 0.0, "ub": "Inf"}},
                {"id": "R1", "dir": "b", "val": 0.5}
            ],
            "options": {"fit_starts": 10, "sim_ss": 1}
        });
        let model = IncaModel::from_value(&raw).unwrap();
        assert_eq!(model.metabolite_ids(), &["A", "B"]);
        assert_eq!(model.states().len(), 1);
        assert_eq!(model.options()["fit_starts"], json!(10));
        let fluxes = model.rates_in_net_exch_format().unwrap();
        assert_eq!(fluxes[0].to_string(), "R1 net: 1.5");
        assert_eq!(fluxes[1].to_string(), "R1 exch: 0.5");
    }
}
