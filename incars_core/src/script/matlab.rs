//! Formatting of literals and calls in the engine language
use std::fmt::{Display, Formatter};

/// Name of the reactions vector
pub const REACTIONS_VAR: &str = "r";
/// Name of the model object
pub const MODEL_VAR: &str = "m";

pub fn tracers_var(experiment_id: &str) -> String {
    format!("t_{}", experiment_id)
}

pub fn flux_var(experiment_id: &str) -> String {
    format!("f_{}", experiment_id)
}

pub fn ms_var(experiment_id: &str) -> String {
    format!("ms_{}", experiment_id)
}

pub fn pool_var(experiment_id: &str) -> String {
    format!("p_{}", experiment_id)
}

pub fn experiment_var(experiment_id: &str) -> String {
    format!("e_{}", experiment_id)
}

/// Format a number as a literal
///
/// Finite values keep a decimal point or exponent so they always read back as doubles,
/// missing values become `NaN`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else {
        format!("{:?}", value)
    }
}

/// Format an optional number, `None` becomes `NaN`
pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "NaN".to_string())
}

/// Quote a string literal, doubling embedded single quotes
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// `[a,b,c]`
pub fn row_vector<S: AsRef<str>>(items: &[S]) -> String {
    format!("[{}]", join(items, ","))
}

/// `[a;b;c]`
pub fn column_vector<S: AsRef<str>>(items: &[S]) -> String {
    format!("[{}]", join(items, ";"))
}

/// `{a,b,c}`
pub fn cell_array<S: AsRef<str>>(items: &[S]) -> String {
    format!("{{{}}}", join(items, ","))
}

fn join<S: AsRef<str>>(items: &[S], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(separator)
}

/// Call a class constructor with an optional positional argument and name/value pairs
///
/// - `cls(arg)` when there are no properties
/// - `cls('k', v, ...)` when there is no positional argument
/// - `cls(arg, 'k', v, ...)` otherwise
pub fn class_call(class: &str, argument: Option<&str>, properties: &[(&str, String)]) -> String {
    let mut arguments: Vec<String> = Vec::new();
    if let Some(argument) = argument {
        arguments.push(argument.to_string());
    }
    for (name, value) in properties {
        arguments.push(quote(name));
        arguments.push(value.clone());
    }
    format!("{}({})", class, arguments.join(", "))
}

/// A value that can be passed as an option or assigned to a property
#[derive(Debug, Clone, PartialEq)]
pub enum MatlabValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vector(Vec<f64>),
    /// Inserted verbatim, for expressions such as `[0,Inf]`
    Expression(String),
}

impl Display for MatlabValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MatlabValue::Bool(value) => write!(f, "{}", value),
            MatlabValue::Int(value) => write!(f, "{}", value),
            MatlabValue::Float(value) => write!(f, "{}", format_number(*value)),
            MatlabValue::Str(value) => write!(f, "{}", quote(value)),
            MatlabValue::Vector(values) => {
                let items: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
                write!(f, "{}", row_vector(&items))
            }
            MatlabValue::Expression(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for MatlabValue {
    fn from(value: bool) -> Self {
        MatlabValue::Bool(value)
    }
}

impl From<i64> for MatlabValue {
    fn from(value: i64) -> Self {
        MatlabValue::Int(value)
    }
}

impl From<f64> for MatlabValue {
    fn from(value: f64) -> Self {
        MatlabValue::Float(value)
    }
}

impl From<&str> for MatlabValue {
    fn from(value: &str) -> Self {
        MatlabValue::Str(value.to_string())
    }
}

impl From<String> for MatlabValue {
    fn from(value: String) -> Self {
        MatlabValue::Str(value)
    }
}

impl From<Vec<f64>> for MatlabValue {
    fn from(value: Vec<f64>) -> Self {
        MatlabValue::Vector(value)
    }
}
