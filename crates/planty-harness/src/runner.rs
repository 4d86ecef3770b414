//! Fixture → engine → extractor → comparator.

use crate::{
    HarnessError,
    case_dir::{CaseDir, read_lines},
    config::{HarnessConfig, PlanCheck},
    engine::{Engine, EngineOutcome, ProcessEngine},
    recorder::{
        InvocationRecord, JsonlRecorder, OutcomeRecord, RunRecorder, TracingRecorder, Verdict,
    },
};
use planty_oracle::{
    compare::{CompareError, compare_errors, compare_plan_markers, compare_results, compare_trace},
    extract::{DiagnosticFamily, extract_table_error},
    generate::Fixture,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

///
/// CaseReport
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseReport {
    pub case: String,
    pub outcome: EngineOutcome,

    /// Case directory, when it outlives the run.
    pub kept: Option<PathBuf>,
}

///
/// RunSummary
///

#[derive(Debug, Default)]
pub struct RunSummary {
    pub passed: Vec<CaseReport>,
    pub failed: Vec<(String, HarnessError)>,
}

impl RunSummary {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Ok when every case passed, else the first failure.
    pub fn into_result(self) -> Result<Vec<CaseReport>, HarnessError> {
        match self.failed.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(self.passed),
        }
    }
}

///
/// Runner
///

pub struct Runner<E> {
    engine: E,
    recorder: Box<dyn RunRecorder>,
    plan_check: PlanCheck,
    keep_case_dirs: bool,
    case_root: Option<PathBuf>,
}

impl Runner<ProcessEngine> {
    /// Process engine and recorder as configured. A diary path selects the
    /// JSON-lines recorder; otherwise records go to `tracing`.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let engine = ProcessEngine::new(config.engine()?).with_timeout(config.timeout());
        let recorder: Box<dyn RunRecorder> = match &config.diary {
            Some(path) => {
                let diary = JsonlRecorder::open(path).map_err(|err| HarnessError::io(path, err))?;
                Box::new(diary)
            }
            None => Box::new(TracingRecorder),
        };

        Ok(Self::new(engine)
            .with_recorder(recorder)
            .with_plan_check(config.plan_check)
            .with_case_root(config.case_root.clone())
            .keep_case_dirs(config.keep_case_dirs))
    }
}

impl<E: Engine> Runner<E> {
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            recorder: Box::new(TracingRecorder),
            plan_check: PlanCheck::default(),
            keep_case_dirs: false,
            case_root: None,
        }
    }

    #[must_use]
    pub fn with_recorder(mut self, recorder: Box<dyn RunRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    #[must_use]
    pub const fn with_plan_check(mut self, plan_check: PlanCheck) -> Self {
        self.plan_check = plan_check;
        self
    }

    #[must_use]
    pub fn with_case_root(mut self, case_root: Option<PathBuf>) -> Self {
        self.case_root = case_root;
        self
    }

    #[must_use]
    pub const fn keep_case_dirs(mut self, keep: bool) -> Self {
        self.keep_case_dirs = keep;
        self
    }

    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Write the fixture into a fresh case directory, run the engine on it
    /// and check both streams.
    pub fn run_fixture(&self, fixture: &Fixture) -> Result<CaseReport, HarnessError> {
        let case = CaseDir::temporary(fixture.name(), self.case_root.as_deref())?;
        case.write_fixture(fixture)?;

        self.recorder.record_invocation(&InvocationRecord {
            case: fixture.name().to_string(),
            engine: self.engine.name(),
            dataset: case.dataset(),
            queries: fixture.cases().len(),
        });

        let outcome = match self.engine.run(&case) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.finish(fixture, case, None, Some(&err));
                return Err(err);
            }
        };

        let result = check(fixture, &case, outcome, self.plan_check);
        let kept = self.finish(fixture, case, Some(outcome), result.as_ref().err());

        result.map(|()| CaseReport {
            case: fixture.name().to_string(),
            outcome,
            kept,
        })
    }

    // record the verdict, then keep or drop the case directory
    fn finish(
        &self,
        fixture: &Fixture,
        case: CaseDir,
        outcome: Option<EngineOutcome>,
        failure: Option<&HarnessError>,
    ) -> Option<PathBuf> {
        self.recorder.record_outcome(&OutcomeRecord {
            case: fixture.name().to_string(),
            exit_code: outcome.and_then(|outcome| outcome.exit_code),
            elapsed_ms: outcome.map_or(0, |outcome| {
                u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX)
            }),
            verdict: failure.map_or(Verdict::Passed, |err| Verdict::Failed {
                reason: err.to_string(),
            }),
        });

        if !(self.keep_case_dirs && case.is_temporary()) {
            return None;
        }

        let path = case.keep();
        info!(case = %fixture.name(), dir = %path.display(), "case directory kept");

        Some(path)
    }

    /// Run every fixture; a failing case does not stop the others.
    pub fn run_all<'a>(&self, fixtures: impl IntoIterator<Item = &'a Fixture>) -> RunSummary {
        let mut summary = RunSummary::default();

        for fixture in fixtures {
            match self.run_fixture(fixture) {
                Ok(report) => summary.passed.push(report),
                Err(err) => {
                    warn!(case = %fixture.name(), error = %err, "case failed");
                    summary.failed.push((fixture.name().to_string(), err));
                }
            }
        }

        info!(
            passed = summary.passed.len(),
            failed = summary.failed.len(),
            "run finished"
        );

        summary
    }
}

// exit code first, then the table failure or the result stream, then plan lines
fn check(
    fixture: &Fixture,
    case: &CaseDir,
    outcome: EngineOutcome,
    plan_check: PlanCheck,
) -> Result<(), HarnessError> {
    let name = fixture.name();
    let expected_exit = fixture.expected_exit_code();
    if outcome.exit_code != Some(expected_exit) {
        return Err(HarnessError::ExitCode {
            case: name.to_string(),
            expected: expected_exit,
            actual: outcome.exit_code,
        });
    }

    let out = read_lines(&case.user_out())?;

    if let Some(failure) = fixture.expected_failure() {
        let actual = extract_table_error(&out);
        if actual.as_deref() != Some(failure.line.trim_end()) {
            return Err(HarnessError::TableFailure {
                case: name.to_string(),
                expected: failure.line.clone(),
                actual,
            });
        }

        return Ok(());
    }

    let compared = |result: Result<(), CompareError>| {
        result.map_err(|source| HarnessError::Compare {
            case: name.to_string(),
            source,
        })
    };

    compared(compare_results(&fixture.expected_blocks(), &out))?;
    compared(compare_errors(&fixture.expected_errors(), &out))?;

    match plan_check {
        PlanCheck::Off => {}
        PlanCheck::Markers => {
            if let Some(markers) = fixture.expected_markers() {
                let plan = case.family_lines(DiagnosticFamily::Plan)?;
                compared(compare_plan_markers(&markers, &plan))?;
            }
        }
        PlanCheck::Trace => {
            let plan = case.family_lines(DiagnosticFamily::Plan)?;
            if let Some(trace) = fixture.expected_trace() {
                compared(compare_trace(&trace, &plan))?;
            } else if let Some(markers) = fixture.expected_markers() {
                debug!(case = %name, "no full trace predicted, checking markers");
                compared(compare_plan_markers(&markers, &plan))?;
            }
        }
    }

    Ok(())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{case_dir::write, recorder::NoopRecorder};
    use planty_oracle::generate::{projection, unknown_column, unsorted_key};
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    ///
    /// ScriptedEngine
    ///
    /// Answers with the fixture's own reference text, optionally rewritten.
    ///

    struct ScriptedEngine {
        fixture: Fixture,
        rewrite: fn(String) -> String,
    }

    impl ScriptedEngine {
        fn faithful(fixture: Fixture) -> Self {
            Self {
                fixture,
                rewrite: |text| text,
            }
        }
    }

    impl Engine for ScriptedEngine {
        fn name(&self) -> String {
            "scripted".to_string()
        }

        fn run(&self, case: &CaseDir) -> Result<EngineOutcome, HarnessError> {
            write(
                &case.user_out(),
                &(self.rewrite)(self.fixture.expected_output_text()),
            )?;
            write(
                &case.user_err(),
                &format!("info: started\n{}", self.fixture.expected_plan_text()),
            )?;

            Ok(EngineOutcome {
                exit_code: Some(self.fixture.expected_exit_code()),
                elapsed: Duration::from_millis(1),
            })
        }
    }

    #[derive(Default)]
    struct CollectingRecorder {
        outcomes: Arc<Mutex<Vec<OutcomeRecord>>>,
    }

    impl RunRecorder for CollectingRecorder {
        fn record_invocation(&self, _: &InvocationRecord) {}

        fn record_outcome(&self, record: &OutcomeRecord) {
            self.outcomes.lock().expect("lock").push(record.clone());
        }
    }

    #[test]
    fn faithful_engine_passes() {
        let fixture = projection().expect("fixture");
        let runner = Runner::new(ScriptedEngine::faithful(fixture.clone()))
            .with_recorder(Box::new(NoopRecorder));

        let report = runner.run_fixture(&fixture).expect("pass");

        assert_eq!(report.case, "golden.projection");
        assert_eq!(report.kept, None);
    }

    #[test]
    fn query_errors_are_checked() {
        let fixture = unknown_column().expect("fixture");
        let engine = ScriptedEngine {
            fixture: fixture.clone(),
            rewrite: |text| text.replace("unknown column name", "no such column"),
        };

        let err = Runner::new(engine)
            .with_recorder(Box::new(NoopRecorder))
            .run_fixture(&fixture)
            .expect_err("error text differs");

        assert!(matches!(
            err,
            HarnessError::Compare {
                source: CompareError::Errors { .. },
                ..
            }
        ));
    }

    #[test]
    fn wrong_rows_fail_and_are_recorded() {
        let fixture = projection().expect("fixture");
        let engine = ScriptedEngine {
            fixture: fixture.clone(),
            rewrite: |text| text.replacen("\n1\n", "\n9\n", 1),
        };
        let recorder = CollectingRecorder::default();
        let outcomes = Arc::clone(&recorder.outcomes);

        let err = Runner::new(engine)
            .with_recorder(Box::new(recorder))
            .run_fixture(&fixture)
            .expect_err("rows differ");

        assert!(matches!(
            err,
            HarnessError::Compare {
                source: CompareError::Rows { block: 1, .. },
                ..
            }
        ));
        let outcomes = outcomes.lock().expect("lock");
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].verdict.is_failure());
    }

    #[test]
    fn table_failure_needs_code_and_line() {
        let fixture = unsorted_key().expect("fixture");

        Runner::new(ScriptedEngine::faithful(fixture.clone()))
            .with_recorder(Box::new(NoopRecorder))
            .run_fixture(&fixture)
            .expect("faithful table failure passes");

        let silent = ScriptedEngine {
            fixture: fixture.clone(),
            rewrite: |_| String::new(),
        };
        let err = Runner::new(silent)
            .with_recorder(Box::new(NoopRecorder))
            .run_fixture(&fixture)
            .expect_err("missing line");
        assert!(matches!(err, HarnessError::TableFailure { actual: None, .. }));
    }

    #[test]
    fn exit_code_mismatch_is_reported() {
        struct Crashing;

        impl Engine for Crashing {
            fn name(&self) -> String {
                "crashing".to_string()
            }

            fn run(&self, _: &CaseDir) -> Result<EngineOutcome, HarnessError> {
                Ok(EngineOutcome {
                    exit_code: None,
                    elapsed: Duration::ZERO,
                })
            }
        }

        let fixture = projection().expect("fixture");
        let err = Runner::new(Crashing)
            .with_recorder(Box::new(NoopRecorder))
            .run_fixture(&fixture)
            .expect_err("signal");

        assert!(matches!(
            err,
            HarnessError::ExitCode {
                expected: 0,
                actual: None,
                ..
            }
        ));
    }

    #[test]
    fn wrong_plan_marker_fails_unless_plan_check_is_off() {
        let fixture = planty_oracle::generate::plan_catalog()
            .expect("catalog")
            .remove(0);
        let lying = |fixture: &Fixture| ScriptedEngineWithPlan {
            inner: ScriptedEngine::faithful(fixture.clone()),
            plan: "plan: Range scan result: (first_remaining_column=9)\n",
        };

        Runner::new(ScriptedEngine::faithful(fixture.clone()))
            .with_recorder(Box::new(NoopRecorder))
            .run_fixture(&fixture)
            .expect("faithful plan passes");

        let err = Runner::new(lying(&fixture))
            .with_recorder(Box::new(NoopRecorder))
            .run_fixture(&fixture)
            .expect_err("marker differs");
        assert!(matches!(
            err,
            HarnessError::Compare {
                source: CompareError::PlanMarkers { .. },
                ..
            }
        ));

        Runner::new(lying(&fixture))
            .with_recorder(Box::new(NoopRecorder))
            .with_plan_check(PlanCheck::Off)
            .run_fixture(&fixture)
            .expect("plan not checked");
    }

    struct ScriptedEngineWithPlan {
        inner: ScriptedEngine,
        plan: &'static str,
    }

    impl Engine for ScriptedEngineWithPlan {
        fn name(&self) -> String {
            self.inner.name()
        }

        fn run(&self, case: &CaseDir) -> Result<EngineOutcome, HarnessError> {
            let outcome = self.inner.run(case)?;
            write(&case.user_err(), self.plan)?;

            Ok(outcome)
        }
    }

    #[test]
    fn kept_case_dir_survives() {
        let root = tempfile::tempdir().expect("root");
        let fixture = projection().expect("fixture");

        let report = Runner::new(ScriptedEngine::faithful(fixture.clone()))
            .with_recorder(Box::new(NoopRecorder))
            .with_case_root(Some(root.path().to_path_buf()))
            .keep_case_dirs(true)
            .run_fixture(&fixture)
            .expect("pass");

        let kept = report.kept.expect("kept dir");
        assert!(kept.starts_with(root.path()));
        assert!(kept.join("user.out").is_file());
    }

    #[test]
    fn run_all_collects_failures() {
        let good = projection().expect("fixture");
        let other = unknown_column().expect("fixture");

        let summary = Runner::new(ScriptedEngine::faithful(good.clone()))
            .with_recorder(Box::new(NoopRecorder))
            .run_all([&good, &other]);

        assert_eq!(summary.passed.len(), 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, other.name());
        assert!(!summary.is_success());
        assert!(summary.into_result().is_err());
    }
}
