//! Running a generated script in the engine
//!
//! A session is started rooted at the INCA installation, INCA is put on the path, and the
//! script (and optionally a runner script) is called from the execution directory. Result files
//! are whatever the script saves; nothing is returned.
use std::io::Write;
use std::path::{self, Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Instant;

use log::{debug, info, warn};
use thiserror::Error;

use crate::configuration;
use crate::script::document::ScriptDocument;
use crate::script::matlab::quote;
use crate::script::ScriptError;

/// A session of the engine that executes statements in order
pub trait EngineSession {
    /// Execute one statement
    fn eval(&mut self, statement: &str) -> Result<(), EngineError>;

    /// End the session, waiting for all statements to finish
    fn quit(&mut self) -> Result<(), EngineError>;

    fn cd(&mut self, directory: &Path) -> Result<(), EngineError> {
        self.eval(&format!("cd({});", quote(&directory.to_string_lossy())))
    }

    /// Call a script or function without arguments, ending the session with an error if it fails
    fn call(&mut self, name: &str) -> Result<(), EngineError> {
        self.eval(&format!(
            "try, {}; catch err, disp(getReport(err)); exit(1); end",
            name
        ))
    }
}

/// An engine process reading statements from its standard input
///
/// The process is killed if the session is dropped before [`EngineSession::quit`] returns.
#[derive(Debug)]
pub struct MatlabSession {
    child: Child,
    stdin: Option<ChildStdin>,
    finished: bool,
}

impl MatlabSession {
    pub fn start(
        executable: &Path,
        arguments: &[String],
        working_directory: &Path,
    ) -> Result<MatlabSession, EngineError> {
        info!("Starting engine session with {}", executable.display());
        let mut child = Command::new(executable)
            .args(arguments)
            .current_dir(working_directory)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                executable: executable.to_path_buf(),
                source,
            })?;
        let stdin = child.stdin.take();
        Ok(MatlabSession {
            child,
            stdin,
            finished: false,
        })
    }
}

impl EngineSession for MatlabSession {
    fn eval(&mut self, statement: &str) -> Result<(), EngineError> {
        debug!("Engine statement: {}", statement);
        let stdin = self.stdin.as_mut().ok_or(EngineError::Closed)?;
        writeln!(stdin, "{}", statement)?;
        stdin.flush()?;
        Ok(())
    }

    fn quit(&mut self) -> Result<(), EngineError> {
        if let Some(mut stdin) = self.stdin.take() {
            writeln!(stdin, "exit")?;
        }
        let status = self.child.wait()?;
        self.finished = true;
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::ExitStatus(status.code()))
        }
    }
}

impl Drop for MatlabSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Engine session dropped while running, killing the engine");
        self.stdin.take();
        if let Err(err) = self.child.kill() {
            warn!("Unable to kill engine process: {}", err);
        }
        let _ = self.child.wait();
    }
}

/// Save the script (and runner) in `execution_directory` and run them in `session`
///
/// The session is closed afterwards.
pub fn execute_in<S: EngineSession>(
    session: &mut S,
    script: &ScriptDocument,
    runner_script: Option<&str>,
    inca_directory: &Path,
    execution_directory: &Path,
) -> Result<(), EngineError> {
    let config = configuration::current();
    let script_path = execution_directory.join(&config.script_filename);
    script.save(&script_path)?;
    info!("INCA script saved to {}", script_path.display());
    let runner_path = execution_directory.join(&config.runner_filename);
    if let Some(runner_script) = runner_script {
        std::fs::write(&runner_path, runner_script)?;
    }

    let start = Instant::now();
    session.cd(&path::absolute(inca_directory)?)?;
    session.call("startup")?;
    session.call("setpath")?;
    session.cd(&path::absolute(execution_directory)?)?;
    session.call(&function_name(&script_path))?;
    if runner_script.is_some() {
        session.call(&function_name(&runner_path))?;
    }
    session.quit()?;
    info!("INCA finished in {:.1} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

/// Run a script with INCA
///
/// Without `inca_directory` the configured installation is used. Without
/// `execution_directory` the script runs in a temporary directory that is removed afterwards,
/// so the script should save its results elsewhere.
pub fn run_inca(
    script: &ScriptDocument,
    runner_script: Option<&str>,
    inca_directory: Option<&Path>,
    execution_directory: Option<&Path>,
) -> Result<(), EngineError> {
    let config = configuration::current();
    let inca_directory = match inca_directory {
        Some(directory) => directory.to_path_buf(),
        None => config
            .inca_directory
            .clone()
            .ok_or(EngineError::MissingInstallation)?,
    };
    if !inca_directory.is_dir() {
        return Err(EngineError::InstallationNotFound(inca_directory));
    }

    let temporary;
    let execution_directory = match execution_directory {
        Some(directory) => directory,
        None => {
            temporary = tempfile::tempdir()?;
            temporary.path()
        }
    };
    let mut session = MatlabSession::start(
        &config.engine_executable,
        &config.engine_arguments,
        execution_directory,
    )?;
    execute_in(
        &mut session,
        script,
        runner_script,
        &inca_directory,
        execution_directory,
    )
}

fn function_name(script_path: &Path) -> String {
    script_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unable to start engine {executable}")]
    Spawn {
        executable: PathBuf,
        source: std::io::Error,
    },
    #[error("Engine session failed")]
    Io(#[from] std::io::Error),
    #[error("Engine exited with status {0:?}")]
    ExitStatus(Option<i32>),
    #[error("Engine session is already closed")]
    Closed,
    #[error("No INCA installation given and INCA_BASE_DIRECTORY is not set")]
    MissingInstallation,
    #[error("INCA installation {0} does not exist")]
    InstallationNotFound(PathBuf),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

#[cfg(test)]
mod engine_tests {
    use super::*;
    use crate::script::document::Block;

    #[derive(Default)]
    struct RecordingSession {
        statements: Vec<String>,
        quit: bool,
    }

    impl EngineSession for RecordingSession {
        fn eval(&mut self, statement: &str) -> Result<(), EngineError> {
            if self.quit {
                return Err(EngineError::Closed);
            }
            self.statements.push(statement.to_string());
            Ok(())
        }

        fn quit(&mut self) -> Result<(), EngineError> {
            self.quit = true;
            Ok(())
        }
    }

    #[test]
    fn session_statement_order() {
        let inca = tempfile::tempdir().unwrap();
        let run = tempfile::tempdir().unwrap();
        let mut script = ScriptDocument::new();
        script.add_to_block(Block::Model, "m = model(r, 'expts', [e_exp1]);\n");
        let mut session = RecordingSession::default();
        execute_in(
            &mut session,
            &script,
            Some("f = estimate(m);\n"),
            inca.path(),
            run.path(),
        )
        .unwrap();

        assert!(session.quit);
        assert_eq!(session.statements.len(), 6);
        assert_eq!(
            session.statements[0],
            format!("cd('{}');", inca.path().display())
        );
        assert!(session.statements[1].contains("startup;"));
        assert!(session.statements[2].contains("setpath;"));
        assert_eq!(session.statements[3], format!("cd('{}');", run.path().display()));
        assert!(session.statements[4].starts_with("try, inca_script;"));
        assert!(session.statements[5].starts_with("try, inca_runner;"));

        let saved = std::fs::read_to_string(run.path().join("inca_script.m")).unwrap();
        assert_eq!(saved, script.render());
        assert!(run.path().join("inca_runner.m").exists());
    }

    #[test]
    fn without_runner() {
        let inca = tempfile::tempdir().unwrap();
        let run = tempfile::tempdir().unwrap();
        let mut session = RecordingSession::default();
        execute_in(&mut session, &ScriptDocument::new(), None, inca.path(), run.path()).unwrap();
        assert_eq!(session.statements.len(), 5);
        assert!(!run.path().join("inca_runner.m").exists());
    }

    #[test]
    fn missing_installation_directory() {
        let err = run_inca(
            &ScriptDocument::new(),
            None,
            Some(Path::new("/definitely/not/an/inca/install")),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InstallationNotFound(_)));
    }

    #[test]
    fn unknown_executable() {
        let dir = tempfile::tempdir().unwrap();
        let err = MatlabSession::start(Path::new("no-such-engine-binary"), &[], dir.path())
            .unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn process_session_reads_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = MatlabSession::start(Path::new("cat"), &[], dir.path()).unwrap();
        session.eval("disp(1);").unwrap();
        session.quit().unwrap();
        assert!(matches!(session.eval("disp(2);"), Err(EngineError::Closed)));
    }
}
