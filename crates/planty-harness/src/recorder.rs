//! Run bookkeeping boundary.
//!
//! Recording is optional, injected by the caller, and must not affect
//! verdicts. A recorder that fails to write logs a warning and carries on.

use serde::Serialize;
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{info, warn};

///
/// RunRecorder
///

pub trait RunRecorder: Send + Sync {
    fn record_invocation(&self, record: &InvocationRecord);

    fn record_outcome(&self, record: &OutcomeRecord);
}

///
/// InvocationRecord
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InvocationRecord {
    pub case: String,
    pub engine: String,
    pub dataset: PathBuf,
    pub queries: usize,
}

///
/// Verdict
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed { reason: String },

    /// Golden mode accepted the engine output as the new reference.
    Applied,
}

impl Verdict {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

///
/// OutcomeRecord
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OutcomeRecord {
    pub case: String,
    pub exit_code: Option<i32>,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub verdict: Verdict,
}

///
/// NoopRecorder
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRecorder;

impl RunRecorder for NoopRecorder {
    fn record_invocation(&self, _: &InvocationRecord) {}

    fn record_outcome(&self, _: &OutcomeRecord) {}
}

///
/// TracingRecorder
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingRecorder;

impl RunRecorder for TracingRecorder {
    fn record_invocation(&self, record: &InvocationRecord) {
        info!(
            case = %record.case,
            engine = %record.engine,
            dataset = %record.dataset.display(),
            queries = record.queries,
            "invoking engine"
        );
    }

    fn record_outcome(&self, record: &OutcomeRecord) {
        match &record.verdict {
            Verdict::Failed { reason } => warn!(
                case = %record.case,
                exit = ?record.exit_code,
                elapsed_ms = record.elapsed_ms,
                reason = %reason,
                "case failed"
            ),
            verdict => info!(
                case = %record.case,
                exit = ?record.exit_code,
                elapsed_ms = record.elapsed_ms,
                verdict = ?verdict,
                "case finished"
            ),
        }
    }
}

///
/// JsonlRecorder
///
/// Appends one JSON object per record to a diary file. Each object carries
/// an `event` tag of `invocation` or `outcome`.
///

#[derive(Debug)]
pub struct JsonlRecorder {
    path: PathBuf,
    file: Mutex<File>,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum DiaryLine<'a> {
    Invocation(&'a InvocationRecord),
    Outcome(&'a OutcomeRecord),
}

impl JsonlRecorder {
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &DiaryLine<'_>) {
        let mut text = match serde_json::to_string(line) {
            Ok(text) => text,
            Err(err) => {
                warn!(diary = %self.path.display(), error = %err, "diary record not serializable");
                return;
            }
        };
        text.push('\n');

        let Ok(mut file) = self.file.lock() else {
            warn!(diary = %self.path.display(), "diary lock poisoned");
            return;
        };
        if let Err(err) = file.write_all(text.as_bytes()) {
            warn!(diary = %self.path.display(), error = %err, "diary write failed");
        }
    }
}

impl RunRecorder for JsonlRecorder {
    fn record_invocation(&self, record: &InvocationRecord) {
        self.append(&DiaryLine::Invocation(record));
    }

    fn record_outcome(&self, record: &OutcomeRecord) {
        self.append(&DiaryLine::Outcome(record));
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn invocation() -> InvocationRecord {
        InvocationRecord {
            case: "projection".to_string(),
            engine: "/opt/planty/debug.e".to_string(),
            dataset: PathBuf::from("/tmp/case/csv"),
            queries: 4,
        }
    }

    #[test]
    fn diary_holds_one_tagged_object_per_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let recorder = JsonlRecorder::open(dir.path().join("diary.jsonl")).expect("open");

        recorder.record_invocation(&invocation());
        recorder.record_outcome(&OutcomeRecord {
            case: "projection".to_string(),
            exit_code: Some(0),
            elapsed_ms: 7,
            verdict: Verdict::Failed {
                reason: "block 1 differs".to_string(),
            },
        });

        let text = std::fs::read_to_string(recorder.path()).expect("diary");
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();

        assert_eq!(
            lines,
            vec![
                json!({
                    "event": "invocation",
                    "case": "projection",
                    "engine": "/opt/planty/debug.e",
                    "dataset": "/tmp/case/csv",
                    "queries": 4,
                }),
                json!({
                    "event": "outcome",
                    "case": "projection",
                    "exit_code": 0,
                    "elapsed_ms": 7,
                    "verdict": "failed",
                    "reason": "block 1 differs",
                }),
            ]
        );
    }

    #[test]
    fn diary_appends_across_opens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("diary.jsonl");

        JsonlRecorder::open(&path)
            .expect("open")
            .record_invocation(&invocation());
        JsonlRecorder::open(&path)
            .expect("open")
            .record_invocation(&invocation());

        let diary = std::fs::read_to_string(&path).expect("diary");
        assert_eq!(diary.lines().count(), 2);
    }

    #[test]
    fn verdict_failure_flag() {
        assert!(!Verdict::Passed.is_failure());
        assert!(!Verdict::Applied.is_failure());
        assert!(
            Verdict::Failed {
                reason: String::new()
            }
            .is_failure()
        );
    }
}
