//! The query engine under test.

use crate::{HarnessError, case_dir::CaseDir};
use std::{
    fs::File,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

///
/// EngineOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineOutcome {
    /// `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

///
/// Engine
///
/// Runs one case: reads `csv` and `in` from the case directory and leaves
/// its streams in `user.out` and `user.err`.
///

pub trait Engine {
    fn name(&self) -> String;

    fn run(&self, case: &CaseDir) -> Result<EngineOutcome, HarnessError>;
}

///
/// ProcessEngine
///
/// `engine <csv> < in > user.out 2> user.err`
///

#[derive(Clone, Debug)]
pub struct ProcessEngine {
    path: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessEngine {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn spawn(&self, case: &CaseDir) -> Result<Child, HarnessError> {
        let stdin = open(&case.queries())?;
        let stdout = create(&case.user_out())?;
        let stderr = create(&case.user_err())?;

        Command::new(&self.path)
            .arg(case.dataset())
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                engine: self.path.clone(),
                source,
            })
    }

    fn wait(&self, child: &mut Child, started: Instant) -> Result<ExitStatus, HarnessError> {
        let Some(timeout) = self.timeout else {
            return child
                .wait()
                .map_err(|err| HarnessError::io(&self.path, err));
        };

        loop {
            if let Some(status) = child
                .try_wait()
                .map_err(|err| HarnessError::io(&self.path, err))?
            {
                return Ok(status);
            }

            if started.elapsed() >= timeout {
                warn!(
                    engine = %self.path.display(),
                    timeout_ms = timeout.as_millis(),
                    "killing engine"
                );
                if let Err(err) = child.kill() {
                    warn!(error = %err, "kill failed");
                }
                let _ = child.wait();

                return Err(HarnessError::Timeout {
                    engine: self.path.clone(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Engine for ProcessEngine {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn run(&self, case: &CaseDir) -> Result<EngineOutcome, HarnessError> {
        debug!(engine = %self.path.display(), case = %case.path().display(), "starting engine");

        let started = Instant::now();
        let mut child = self.spawn(case)?;
        let status = self.wait(&mut child, started)?;
        let elapsed = started.elapsed();

        info!(
            engine = %self.path.display(),
            exit = ?status.code(),
            elapsed_ms = elapsed.as_millis(),
            "engine finished"
        );

        Ok(EngineOutcome {
            exit_code: status.code(),
            elapsed,
        })
    }
}

fn open(path: &Path) -> Result<File, HarnessError> {
    File::open(path).map_err(|err| HarnessError::io(path, err))
}

fn create(path: &Path) -> Result<File, HarnessError> {
    File::create(path).map_err(|err| HarnessError::io(path, err))
}

///
/// TESTS
///
