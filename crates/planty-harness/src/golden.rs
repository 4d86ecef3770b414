//! Golden-directory runs.
//!
//! A golden directory holds `csv` and `in` plus reference streams. The
//! engine runs on it in place; its streams are either diffed against the
//! references or, in apply mode, copied over them. A directory that does not
//! exist but whose name parses as a [`FixtureName`] is generated first.

use crate::{
    HarnessError,
    case_dir::{CaseDir, OUTPUT_FILE, PLAN_FILE, join_lines, read_lines, write},
    engine::Engine,
    recorder::{InvocationRecord, OutcomeRecord, RunRecorder, Verdict},
};
use planty_oracle::{extract::DiagnosticFamily, generate::FixtureName};
use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

/// Streams compared against their references; the rest are only applied.
pub const CHECKED_STREAMS: [&str; 2] = [PLAN_FILE, OUTPUT_FILE];

///
/// GoldenMode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GoldenMode {
    #[default]
    Compare,

    /// Accept the engine output as the new reference.
    Apply,
}

///
/// GoldenReport
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GoldenReport {
    pub dir: PathBuf,
    pub generated: bool,
    pub exit_code: Option<i32>,
    pub compared: Vec<String>,
    pub skipped: Vec<String>,
    pub mismatched: Vec<String>,
    pub applied: Vec<String>,
}

impl GoldenReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatched.is_empty()
    }
}

/// Every stream name a golden run touches: each diagnostic family, then
/// the result stream.
#[must_use]
pub fn stream_names() -> Vec<String> {
    DiagnosticFamily::ALL
        .iter()
        .map(ToString::to_string)
        .chain([OUTPUT_FILE.to_string()])
        .collect()
}

/// Run one golden directory.
pub fn run_golden<E: Engine>(
    engine: &E,
    recorder: &dyn RunRecorder,
    dir: &Path,
    mode: GoldenMode,
) -> Result<GoldenReport, HarnessError> {
    let generated = ensure_case(dir)?;
    let case = CaseDir::open(dir)?;
    let name = case_name(dir);

    recorder.record_invocation(&InvocationRecord {
        case: name.clone(),
        engine: engine.name(),
        dataset: case.dataset(),
        queries: read_lines(&case.queries())?.len(),
    });

    let outcome = engine.run(&case)?;
    case.write_family_splits()?;

    let mut report = GoldenReport {
        dir: dir.to_path_buf(),
        generated,
        exit_code: outcome.exit_code,
        ..GoldenReport::default()
    };

    for stream in stream_names() {
        let user = case.user(&stream);
        let reference = case.reference(&stream);

        match mode {
            GoldenMode::Apply => {
                copy(&user, &reference)?;
                report.applied.push(stream);
            }
            GoldenMode::Compare if CHECKED_STREAMS.contains(&stream.as_str()) => {
                if !reference.is_file() {
                    info!(
                        case = %name,
                        stream = %stream,
                        "skipping, reference file does not exist"
                    );
                    report.skipped.push(stream);
                    continue;
                }

                info!(case = %name, stream = %stream, "comparing");
                let diff = line_diff(&read_lines(&reference)?, &read_lines(&user)?);
                let diff_path = case.diff(&stream);
                if diff.is_empty() {
                    remove_stale(&diff_path)?;
                } else {
                    warn!(
                        case = %name,
                        stream = %stream,
                        diff = %diff_path.display(),
                        "golden mismatch"
                    );
                    write(&diff_path, &diff)?;
                    report.mismatched.push(stream.clone());
                }
                report.compared.push(stream);
            }
            GoldenMode::Compare => {}
        }
    }

    recorder.record_outcome(&OutcomeRecord {
        case: name,
        exit_code: outcome.exit_code,
        elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
        verdict: match mode {
            GoldenMode::Apply => Verdict::Applied,
            GoldenMode::Compare if report.is_clean() => Verdict::Passed,
            GoldenMode::Compare => Verdict::Failed {
                reason: format!("streams differ: {}", report.mismatched.join(", ")),
            },
        },
    });

    Ok(report)
}

/// Run several golden directories. A directory that neither exists nor
/// names a generator is logged and skipped; other errors stop the run.
pub fn run_golden_dirs<E: Engine>(
    engine: &E,
    recorder: &dyn RunRecorder,
    dirs: &[PathBuf],
    mode: GoldenMode,
) -> Result<Vec<GoldenReport>, HarnessError> {
    let mut reports = Vec::with_capacity(dirs.len());

    for dir in dirs {
        match run_golden(engine, recorder, dir, mode) {
            Ok(report) => reports.push(report),
            Err(HarnessError::NoCase(missing)) => {
                error!(dir = %missing.display(), "no dir");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(reports)
}

// generate a missing directory from its name; true when generated
fn ensure_case(dir: &Path) -> Result<bool, HarnessError> {
    if dir.is_dir() {
        return Ok(false);
    }

    let Ok(name) = FixtureName::parse(&case_name(dir)) else {
        return Err(HarnessError::NoCase(dir.to_path_buf()));
    };

    info!(dir = %dir.display(), fixture = %name, "generating");
    let fixture = name.generate()?;
    CaseDir::create_at(dir)?.write_fixture(&fixture)?;

    Ok(true)
}

fn case_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn copy(from: &Path, to: &Path) -> Result<(), HarnessError> {
    let lines = read_lines(from)?;

    write(to, &join_lines(&lines))
}

fn remove_stale(path: &Path) -> Result<(), HarnessError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(HarnessError::io(path, err)),
    }
}

/// Positional line diff: `-N` reference line, `+N` engine line, numbered
/// from 1. Empty when both sides match.
#[must_use]
pub fn line_diff(reference: &[String], actual: &[String]) -> String {
    let mut out = String::new();

    for index in 0..reference.len().max(actual.len()) {
        let want = reference.get(index);
        let got = actual.get(index);
        if want == got {
            continue;
        }

        let number = index + 1;
        if let Some(line) = want {
            let _ = writeln!(out, "-{number}: {line}");
        }
        if let Some(line) = got {
            let _ = writeln!(out, "+{number}: {line}");
        }
    }

    out
}

///
/// TESTS
///
