//! Writers for experiments, the model, and modifications of model objects
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::script::matlab::{
    experiment_var, flux_var, ms_var, pool_var, quote, row_vector, tracers_var, MatlabValue,
    MODEL_VAR, REACTIONS_VAR,
};
use crate::script::ScriptError;

/// Category of measurements attached to an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementType {
    /// `data_flx`
    Flux,
    /// `data_ms`
    Ms,
    /// `data_cxn`
    PoolSize,
    /// `data_nmr`, not supported by the writers
    Nmr,
}

impl MeasurementType {
    pub fn tag(&self) -> &'static str {
        match self {
            MeasurementType::Flux => "data_flx",
            MeasurementType::Ms => "data_ms",
            MeasurementType::PoolSize => "data_cxn",
            MeasurementType::Nmr => "data_nmr",
        }
    }
}

impl FromStr for MeasurementType {
    type Err = ScriptError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "data_flx" => Ok(MeasurementType::Flux),
            "data_ms" => Ok(MeasurementType::Ms),
            "data_cxn" => Ok(MeasurementType::PoolSize),
            "data_nmr" => Ok(MeasurementType::Nmr),
            _ => Err(ScriptError::UnknownMeasurementType(tag.to_string())),
        }
    }
}

impl Display for MeasurementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Define an experiment from its tracers and the measurement categories it carries
///
/// # Examples
/// ```rust
/// use incars_core::script::experiment::{define_experiment, MeasurementType};
/// let text = define_experiment("exp1", &[MeasurementType::Flux]).unwrap();
/// assert_eq!(text, "e_exp1 = experiment(t_exp1, 'id', 'exp1', 'data_flx', f_exp1);\n");
/// ```
pub fn define_experiment(
    experiment_id: &str,
    measurement_types: &[MeasurementType],
) -> Result<String, ScriptError> {
    let mut arguments = vec![tracers_var(experiment_id), quote("id"), quote(experiment_id)];
    for measurement_type in measurement_types {
        let variable = match measurement_type {
            MeasurementType::Flux => flux_var(experiment_id),
            MeasurementType::Ms => ms_var(experiment_id),
            MeasurementType::PoolSize => pool_var(experiment_id),
            MeasurementType::Nmr => {
                return Err(ScriptError::NotImplemented("NMR data".to_string()))
            }
        };
        arguments.push(quote(measurement_type.tag()));
        arguments.push(variable);
    }
    Ok(format!(
        "{} = experiment({});\n",
        experiment_var(experiment_id),
        arguments.join(", ")
    ))
}

/// Define the model from the reactions and the given experiments, in the order given
pub fn define_model<S: AsRef<str>>(experiment_ids: &[S]) -> String {
    let experiments: Vec<String> = experiment_ids
        .iter()
        .map(|id| experiment_var(id.as_ref()))
        .collect();
    format!(
        "{} = model({}, 'expts', {});\n",
        MODEL_VAR,
        REACTIONS_VAR,
        row_vector(&experiments)
    )
}

/// Set properties of one object of the model, such as the bounds of a flux
///
/// The object is looked up by id in `m.<class>`, properties are assigned on
/// `m.<class>.<subclass>` when a subclass is given.
///
/// # Examples
/// ```rust
/// use incars_core::script::experiment::modify_class_instance;
/// let text = modify_class_instance("rates", Some("flx"), "R1", &[("lb", 0.0.into())]);
/// assert_eq!(
///     text,
///     "index_R1 = find(strcmp(m.rates.id, 'R1'));\nm.rates.flx.lb(index_R1) = 0.0;\n"
/// );
/// ```
pub fn modify_class_instance(
    class: &str,
    subclass: Option<&str>,
    instance_id: &str,
    properties: &[(&str, MatlabValue)],
) -> String {
    let index = format!("index_{}", identifier_safe(instance_id));
    let mut script = format!(
        "{} = find(strcmp({}.{}.id, {}));\n",
        index,
        MODEL_VAR,
        class,
        quote(instance_id)
    );
    let target = match subclass {
        Some(subclass) => format!("{}.{}.{}", MODEL_VAR, class, subclass),
        None => format!("{}.{}", MODEL_VAR, class),
    };
    for (property, value) in properties {
        script.push_str(&format!("{}.{}({}) = {};\n", target, property, index, value));
    }
    script
}

fn identifier_safe(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
