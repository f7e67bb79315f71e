//! Writer for the statements that run the engine algorithms and save their results
use std::path::{self, Path};

use derive_builder::Builder;

use crate::results::monte_carlo::monte_carlo_path;
use crate::script::matlab::quote;
use crate::script::ScriptError;

/// Which algorithms to run on the model
#[derive(Builder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runner {
    /// Estimate fluxes, produces `f`
    #[builder(default = "true")]
    pub run_estimate: bool,
    /// Simulate labelling, produces `s`
    #[builder(default = "true")]
    pub run_simulation: bool,
    /// Compute continuation confidence intervals, refines `f`
    #[builder(default = "false")]
    pub run_continuation: bool,
    /// Monte Carlo confidence intervals, saved to a second file
    #[builder(default = "false")]
    pub run_montecarlo: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Runner {
            run_estimate: true,
            run_simulation: true,
            run_continuation: false,
            run_montecarlo: false,
        }
    }
}

/// Run the requested algorithms and save what they produce to `output_filename`
///
/// Monte Carlo results go to a sibling file named `<stem>_mc.<ext>`. Continuation and Monte
/// Carlo both start from the fit, so requesting either without an estimate is an error.
pub fn define_runner(output_filename: &Path, runner: &Runner) -> Result<String, ScriptError> {
    if runner.run_montecarlo && !runner.run_estimate {
        return Err(ScriptError::Precondition(
            "Monte Carlo needs a flux estimate, set run_estimate as well".to_string(),
        ));
    }
    if runner.run_continuation && !runner.run_estimate {
        return Err(ScriptError::Precondition(
            "continuation refines a flux estimate, set run_estimate as well".to_string(),
        ));
    }
    let output_filename = path::absolute(output_filename)?;

    let mut script = String::new();
    let mut saved = Vec::new();
    if runner.run_estimate {
        script.push_str("f = estimate(m);\n");
        saved.push("'f'");
    }
    if runner.run_continuation {
        script.push_str("f = continuate(f,m);\n");
    }
    if runner.run_simulation {
        script.push_str("s = simulate(m);\n");
        saved.push("'s'");
    }
    saved.push("'m'");
    script.push_str(&format!(
        "filename = {};\n",
        quote(&output_filename.to_string_lossy())
    ));
    script.push_str(&format!("save(filename, {});\n", saved.join(", ")));

    if runner.run_montecarlo {
        let mc_filename = monte_carlo_path(&output_filename);
        script.push_str(&format!(
            "mc_filename = {};\n",
            quote(&mc_filename.to_string_lossy())
        ));
        script.push_str("m = fit2mod(m,f);\n");
        script.push_str("[K,CI] = montecarlo(f,m);\n");
        script.push_str("save(mc_filename, 'K', 'CI');\n");
    }
    Ok(script)
}
