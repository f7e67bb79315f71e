//! The fit data `f`: fitted parameters, the fit of each measurement and fit statistics
use std::fmt::{Display, Formatter};

use log::debug;
use serde_json::{Map, Value};

use crate::results::node::{as_f64, field, number, records_of, text, vector, Node};
use crate::results::normality::{shapiro_wilk, NormalityTest};
use crate::results::table::Table;
use crate::results::ResultsError;

/// Columns of the fitted parameter table
pub const FITTED_PARAMETER_COLUMNS: [&str; 16] = [
    "type", "id", "eqn", "val", "std", "lb", "ub", "unit", "free", "alf", "chi2s", "cont", "cor",
    "cov", "vals", "base",
];

/// Columns of the detailed measurement and fit table
pub const MEASUREMENT_DETAIL_COLUMNS: [&str; 11] = [
    "type",
    "expt",
    "id",
    "peak",
    "time",
    "data",
    "std",
    "fit",
    "weighted residual",
    "cont",
    "base",
];

/// Columns of the measurement sensitivity table
pub const SENSITIVITY_COLUMNS: [&str; 5] = ["type", "expt", "id", "esens", "msens"];

/// Result of a flux estimation, possibly refined by continuation
#[derive(Debug, Clone, PartialEq)]
pub struct FitData {
    /// Confidence level used for the fit statistics
    pub alpha: f64,
    /// Sum of squared weighted residuals
    pub chi2: f64,
    pub degrees_of_freedom: f64,
    /// Range of chi-square values accepted at the confidence level
    pub expected_chi2: (f64, f64),
    fitted_parameters: Table,
    overview: Table,
    detailed: Table,
    sensitivities: Table,
}

impl FitData {
    pub fn from_value(value: &Value) -> Result<FitData, ResultsError> {
        let raw = match Node::classify(value) {
            Node::Record(record) => record,
            _ => {
                return Err(ResultsError::Format(
                    "fit data must be a record".to_string(),
                ))
            }
        };

        let expected = vector(field(raw, "Echi2")?)?;
        let expected_chi2 = match expected.as_slice() {
            [lower, upper] => (*lower, *upper),
            _ => {
                return Err(ResultsError::Format(format!(
                    "Echi2 must hold two values, found {}",
                    expected.len()
                )))
            }
        };

        let parameters = records_of(raw, "par")?;
        let measurements = records_of(raw, "mnt")?;
        let residuals = flatten_residuals(&measurements)?;

        Ok(FitData {
            alpha: number(field(raw, "alf")?)?,
            chi2: number(field(raw, "chi2")?)?,
            degrees_of_freedom: number(field(raw, "dof")?)?,
            expected_chi2,
            fitted_parameters: Table::from_records(&parameters, Some(&FITTED_PARAMETER_COLUMNS)),
            overview: Table::from_records(&measurements, None).drop_columns(&["res"]),
            detailed: Table::from_records(&residuals, None)
                .drop_columns(&["esens", "msens", "cont"])
                .rename_column("val", "weighted residual")
                .reindex(&MEASUREMENT_DETAIL_COLUMNS),
            sensitivities: Table::from_records(&residuals, Some(&SENSITIVITY_COLUMNS)),
        })
    }

    /// One row per fitted flux, pool size or MS parameter
    pub fn fitted_parameters(&self) -> &Table {
        &self.fitted_parameters
    }

    /// Ids of the fitted parameters, in table order
    pub fn parameter_ids(&self) -> Vec<String> {
        self.fitted_parameters
            .column("id")
            .map(|ids| ids.into_iter().map(text).collect())
            .unwrap_or_default()
    }

    /// Fit of each measured quantity, summed over its data points
    pub fn measurements_and_fit_overview(&self) -> &Table {
        &self.overview
    }

    /// Fit of every single data point
    ///
    /// The weighted residual is `(fit - data) / std`. Contributions are only reported per
    /// measurement, so `cont` is always null here.
    pub fn measurements_and_fit_detailed(&self) -> &Table {
        &self.detailed
    }

    /// Detailed fit restricted to one quantity, `Flux`, `MS` or `Pool`
    ///
    /// Fluxes and pool sizes have no peaks, so that column is dropped for them.
    pub fn measurements_and_fit_detailed_for(&self, quantity: &str) -> Table {
        let table = self.detailed.filter_eq("type", quantity);
        match quantity {
            "Flux" | "Pool" => table.drop_columns(&["peak"]),
            _ => table,
        }
    }

    /// Sensitivities of each data point, kept apart from the detailed fit
    pub fn measurement_sensitivities(&self) -> &Table {
        &self.sensitivities
    }

    /// Shapiro-Wilk test of the weighted residuals
    ///
    /// The significance level defaults to the confidence level of the fit. Missing residuals are
    /// left out of the sample.
    pub fn residual_normality(&self, alpha: Option<f64>) -> Result<NormalityTest, ResultsError> {
        let alpha = alpha.unwrap_or(self.alpha);
        let residuals: Vec<f64> = self
            .detailed
            .column("weighted residual")
            .unwrap_or_default()
            .into_iter()
            .filter_map(as_f64)
            .filter(|r| !r.is_nan())
            .collect();
        let (statistic, p_value) = shapiro_wilk(&residuals)?;
        let test = NormalityTest::new(statistic, p_value, alpha);
        debug!(
            "Residuals are normally distributed: {} on a {} significance level",
            test.normal, alpha
        );
        Ok(test)
    }

    pub fn goodness_of_fit(&self) -> GoodnessOfFit {
        let (lower, upper) = self.expected_chi2;
        GoodnessOfFit {
            accepted: lower <= self.chi2 && self.chi2 <= upper,
            alpha: self.alpha,
            chi2: self.chi2,
            expected_chi2: self.expected_chi2,
        }
    }
}

/// Collect the residual records nested in each measurement
fn flatten_residuals<'a>(
    measurements: &[&'a Map<String, Value>],
) -> Result<Vec<&'a Map<String, Value>>, ResultsError> {
    let mut residuals = Vec::new();
    for measurement in measurements {
        if let Some(res) = measurement.get("res") {
            residuals.extend(Node::classify(res).records()?);
        }
    }
    Ok(residuals)
}

/// Chi-square test of a fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoodnessOfFit {
    pub accepted: bool,
    pub alpha: f64,
    pub chi2: f64,
    pub expected_chi2: (f64, f64),
}

impl Display for GoodnessOfFit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fit accepted: {}", self.accepted)?;
        writeln!(f, "Confidence level: {}", self.alpha)?;
        writeln!(f, "Chi-square value (SSR): {}", self.chi2)?;
        write!(
            f,
            "Expected chi-square range: [{}, {}]",
            self.expected_chi2.0, self.expected_chi2.1
        )
    }
}
