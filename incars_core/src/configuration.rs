//! Process wide defaults used when writing scripts and running the engine
use std::env;
use std::path::PathBuf;
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Environment variable read for the default INCA installation directory
pub const INCA_DIRECTORY_VAR: &str = "INCA_BASE_DIRECTORY";

#[derive(Clone, Debug)]
pub struct Configuration {
    /// Executable used to start an engine session
    pub engine_executable: PathBuf,
    /// Arguments for a session without a desktop, reading statements from stdin
    pub engine_arguments: Vec<String>,
    /// Directory of the INCA installation, used when no directory is passed explicitly
    pub inca_directory: Option<PathBuf>,
    /// File name the generated script is saved under before execution
    pub script_filename: String,
    /// File name of the optional second runner script
    pub runner_filename: String,
    /// Appended to the output file stem to name the Monte Carlo result file
    pub monte_carlo_suffix: String,
    /// Extension used for result files when the output path has none
    pub result_extension: String,
    /// First line of every rendered script
    pub script_preamble: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            engine_executable: PathBuf::from("matlab"),
            engine_arguments: vec![
                "-nodesktop".to_string(),
                "-nosplash".to_string(),
                "-nodisplay".to_string(),
            ],
            inca_directory: env::var_os(INCA_DIRECTORY_VAR).map(PathBuf::from),
            script_filename: "inca_script.m".to_string(),
            runner_filename: "inca_runner.m".to_string(),
            monte_carlo_suffix: "_mc".to_string(),
            result_extension: "mat".to_string(),
            script_preamble: "clear functions".to_string(),
        }
    }
}

/// Take a snapshot of the current configuration
///
/// A poisoned lock still holds valid defaults, so the inner value is used in that case.
pub fn current() -> Configuration {
    match CONFIGURATION.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[cfg(test)]
mod configuration_tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(config.script_filename, "inca_script.m");
        assert_eq!(config.monte_carlo_suffix, "_mc");
        assert_eq!(config.script_preamble, "clear functions");
        assert_eq!(config.engine_executable, PathBuf::from("matlab"));
    }
}
