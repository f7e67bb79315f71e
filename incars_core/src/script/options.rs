//! Writer for the engine options of the model
use log::debug;

use crate::script::matlab::{class_call, MatlabValue, MODEL_VAR};

/// Set options of the model
///
/// Option names are passed through unchecked; the engine decides what it accepts.
///
/// # Examples
/// ```rust
/// use incars_core::script::options::define_options;
/// let text = define_options(&[("fit_starts", 10.into()), ("sim_na", false.into())]);
/// assert_eq!(text, "m.options = option('fit_starts', 10, 'sim_na', false);\n");
/// ```
pub fn define_options(options: &[(&str, MatlabValue)]) -> String {
    let properties: Vec<(&str, String)> = options
        .iter()
        .map(|(name, value)| {
            debug!("Setting option {} = {}", name, value);
            (*name, value.to_string())
        })
        .collect();
    format!("{}.options = {};\n", MODEL_VAR, class_call("option", None, &properties))
}
