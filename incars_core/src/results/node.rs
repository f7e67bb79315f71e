//! Classification of the nodes of a decoded result tree
//!
//! The engine collapses single element arrays, so a field holding an array of records may hold
//! a bare record, and a vector may be a bare scalar. Each node is classified once and the
//! accessors below accept both forms.
use nalgebra::DMatrix;
use serde_json::{Map, Value};

use crate::results::ResultsError;

/// Shape of a node in the result tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Record(&'a Map<String, Value>),
    RecordArray(&'a [Value]),
    Leaf(&'a Value),
}

impl<'a> Node<'a> {
    pub fn classify(value: &'a Value) -> Node<'a> {
        match value {
            Value::Object(record) => Node::Record(record),
            Value::Array(items) if items.iter().all(Value::is_object) => Node::RecordArray(items),
            _ => Node::Leaf(value),
        }
    }

    /// The records of this node, a single record counts as an array of one
    pub fn records(&self) -> Result<Vec<&'a Map<String, Value>>, ResultsError> {
        match self {
            Node::Record(record) => Ok(vec![*record]),
            Node::RecordArray(items) => Ok(items.iter().filter_map(Value::as_object).collect()),
            Node::Leaf(value) => Err(ResultsError::Format(format!(
                "expected a record or an array of records, found {}",
                value
            ))),
        }
    }
}

/// Look up a required field of a record
pub fn field<'a>(record: &'a Map<String, Value>, name: &str) -> Result<&'a Value, ResultsError> {
    record
        .get(name)
        .ok_or_else(|| ResultsError::MissingField(name.to_string()))
}

/// Records stored under a required field
pub fn records_of<'a>(
    record: &'a Map<String, Value>,
    name: &str,
) -> Result<Vec<&'a Map<String, Value>>, ResultsError> {
    Node::classify(field(record, name)?).records()
}

/// Read a number, accepting the spellings of non-finite values the export uses for strings
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "inf" | "+inf" | "infinity" => Some(f64::INFINITY),
            "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
            "nan" => Some(f64::NAN),
            _ => None,
        },
        Value::Null => Some(f64::NAN),
        Value::Array(items) if items.len() == 1 => as_f64(&items[0]),
        _ => None,
    }
}

/// Read a required number
pub fn number(value: &Value) -> Result<f64, ResultsError> {
    as_f64(value).ok_or_else(|| ResultsError::Format(format!("expected a number, found {}", value)))
}

/// Read a vector of numbers, a scalar counts as a vector of one
pub fn vector(value: &Value) -> Result<Vec<f64>, ResultsError> {
    match value {
        Value::Array(items) => items.iter().map(number).collect(),
        other => Ok(vec![number(other)?]),
    }
}

/// Read a matrix stored as an array of rows
///
/// A flat array is read as a single column and a scalar as a 1x1 matrix.
pub fn matrix(value: &Value) -> Result<DMatrix<f64>, ResultsError> {
    let rows: Vec<Vec<f64>> = match value {
        Value::Array(items) if items.iter().any(Value::is_array) => {
            items.iter().map(vector).collect::<Result<_, _>>()?
        }
        Value::Array(items) => items
            .iter()
            .map(|item| Ok(vec![number(item)?]))
            .collect::<Result<_, ResultsError>>()?,
        other => vec![vec![number(other)?]],
    };
    let n_columns = rows.first().map(|row| row.len()).unwrap_or(0);
    if rows.iter().any(|row| row.len() != n_columns) {
        return Err(ResultsError::Format(
            "matrix rows have different lengths".to_string(),
        ));
    }
    let values: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(values.len() / n_columns.max(1), n_columns, &values))
}

/// Read a string field, numbers are rendered as text
pub fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) if items.len() == 1 => text(&items[0]),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod node_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify() {
        let record = json!({"id": "A"});
        let records = json!([{"id": "A"}, {"id": "B"}]);
        let leaf = json!([1.0, 2.0]);
        assert!(matches!(Node::classify(&record), Node::Record(_)));
        assert!(matches!(Node::classify(&records), Node::RecordArray(_)));
        assert!(matches!(Node::classify(&leaf), Node::Leaf(_)));
    }

    #[test]
    fn single_record_is_an_array_of_one() {
        let record = json!({"id": "A"});
        assert_eq!(Node::classify(&record).records().unwrap().len(), 1);
        let leaf = json!(1.0);
        assert!(matches!(
            Node::classify(&leaf).records(),
            Err(ResultsError::Format(_))
        ));
    }

    #[test]
    fn numbers() {
        assert_eq!(as_f64(&json!(1.5)), Some(1.5));
        assert_eq!(as_f64(&json!("Inf")), Some(f64::INFINITY));
        assert_eq!(as_f64(&json!("-inf")), Some(f64::NEG_INFINITY));
        assert!(as_f64(&json!(null)).unwrap().is_nan());
        assert_eq!(as_f64(&json!("abc")), None);
        assert_eq!(vector(&json!(2.0)).unwrap(), vec![2.0]);
        assert_eq!(vector(&json!([1, 2])).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn matrices() {
        let m = matrix(&json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(1, 0)], 4.0);
        let column = matrix(&json!([1.0, 2.0])).unwrap();
        assert_eq!(column.shape(), (2, 1));
        assert!(matrix(&json!([[1.0], [1.0, 2.0]])).is_err());
    }
}
