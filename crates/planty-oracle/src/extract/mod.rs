//! Parsing of the engine's two output streams.
//!
//! The result stream carries `query number:` delimited blocks and
//! `query error:` lines; the diagnostic stream carries prefixed lines, of
//! which the `plan:` family is parsed into [`PlanTrace`] events.


use crate::{
    QUERY_ERROR_PREFIX, QUERY_NUMBER_MARKER,
    generate::TABLE_ERROR_PREFIX,
    plan::{FullScanExtent, PLAN_PREFIX, PlanEvent, PlanTrace, RowSpan},
    query::ResultBlock,
};
use derive_more::Display;
use regex::{Captures, Regex};
use std::{collections::BTreeMap, sync::LazyLock};
use thiserror::Error as ThisError;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^plan: Range scan result: \(first_remaining_column=(\d+)")
        .expect("marker pattern is valid")
});

static RANGE_SCAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^plan: Range scan for column: (\S+) rows: <(-?\d+)\.\.(-?\d+)>$")
        .expect("range scan pattern is valid")
});

static RANGE_SCAN_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^plan: Range scan result: \(first_remaining_column=(\d+), rows=<(-?\d+)\.\.(-?\d+)>\)$",
    )
    .expect("range scan result pattern is valid")
});

static FULL_SCAN_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^plan: Full scan result: (?:<(-?\d+)\.\.(-?\d+)>|(\d+))$")
        .expect("full scan result pattern is valid")
});

///
/// ExtractError
///
/// Structural problems in engine output. Line numbers are 1-based within
/// the stream handed to the extractor.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExtractError {
    #[error("line {line}: expected {expected} values, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: '{field}' is not an integer")]
    NotAnInteger { line: usize, field: String },

    #[error("line {line}: malformed plan line '{text}'")]
    MalformedPlan { line: usize, text: String },
}

///
/// DiagnosticFamily
///
/// Line prefixes of the diagnostic stream.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum DiagnosticFamily {
    #[display("debug")]
    Debug,
    #[display("info")]
    Info,
    #[display("perf")]
    Perf,
    #[display("plan")]
    Plan,
    #[display("query")]
    Query,
}

impl DiagnosticFamily {
    /// Every family, in the order the engine documents them.
    pub const ALL: [Self; 5] = [Self::Info, Self::Plan, Self::Debug, Self::Perf, Self::Query];

    fn matches(self, line: &str) -> bool {
        line.strip_prefix(&self.to_string())
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

/// Result blocks in stream order.
///
/// Lines are right-trimmed and blank lines skipped. `query error:` and
/// `table error:` lines never belong to a block. A `query number:` line
/// closes the current block (when it has a header) and opens the next; the
/// first line of a block is its header, every later line an integer row of
/// header width.
pub fn extract_results<I, S>(lines: I) -> Result<Vec<ResultBlock>, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut blocks = Vec::new();
    let mut current: Option<ResultBlock> = None;

    for (index, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim_end();
        if line.trim_start().is_empty()
            || line.starts_with(QUERY_ERROR_PREFIX)
            || line.starts_with(TABLE_ERROR_PREFIX)
        {
            continue;
        }
        if line.starts_with(QUERY_NUMBER_MARKER) {
            blocks.extend(current.take());
            continue;
        }

        match current.as_mut() {
            None => {
                let header = line.split_whitespace().map(ToString::to_string).collect();
                current = Some(ResultBlock::new(header, Vec::new()));
            }
            Some(block) => {
                let row = parse_row(index + 1, line)?;
                if row.len() != block.header.len() {
                    return Err(ExtractError::RaggedRow {
                        line: index + 1,
                        expected: block.header.len(),
                        found: row.len(),
                    });
                }
                block.rows.push(row);
            }
        }
    }
    blocks.extend(current);

    Ok(blocks)
}

/// Right-trimmed `query error:` lines in stream order.
pub fn extract_query_errors<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim_end().to_string())
        .filter(|line| line.starts_with(QUERY_ERROR_PREFIX))
        .collect()
}

/// First `table error:` line, if the engine refused the dataset.
pub fn extract_table_error<I, S>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim_end().to_string())
        .find(|line| line.starts_with(TABLE_ERROR_PREFIX))
}

/// `first_remaining_column` of every range-scan-result line, in order.
/// Other lines, including other `plan:` lines, are ignored.
pub fn extract_plan_markers<I, S>(lines: I) -> Vec<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            MARKER
                .captures(line.as_ref())
                .and_then(|captures| captures[1].parse().ok())
        })
        .collect()
}

/// Parse the `plan:` lines of a diagnostic stream into trace events.
///
/// Recognised line kinds must be well formed; unrecognised `plan:` lines
/// are skipped.
pub fn extract_plan_trace<I, S>(lines: I) -> Result<PlanTrace, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut events = Vec::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim_end();
        let Some(body) = line.strip_prefix(PLAN_PREFIX) else {
            continue;
        };
        let malformed = || ExtractError::MalformedPlan {
            line: index + 1,
            text: line.to_string(),
        };

        let body = body.trim_start();
        if body.starts_with("Range scan for column:") {
            let captures = RANGE_SCAN.captures(line).ok_or_else(malformed)?;
            events.push(PlanEvent::RangeScan {
                column: captures[1].to_string(),
                rows: span(&captures, 2).ok_or_else(malformed)?,
            });
        } else if body.starts_with("Range scan result:") {
            let captures = RANGE_SCAN_RESULT.captures(line).ok_or_else(malformed)?;
            events.push(PlanEvent::RangeScanResult {
                first_remaining_column: captures[1].parse().map_err(|_| malformed())?,
                rows: span(&captures, 2).ok_or_else(malformed)?,
            });
        } else if body.starts_with("Full scan result:") {
            let captures = FULL_SCAN_RESULT.captures(line).ok_or_else(malformed)?;
            let extent = match captures.get(3) {
                Some(count) => {
                    FullScanExtent::Count(count.as_str().parse().map_err(|_| malformed())?)
                }
                None => FullScanExtent::Range(span(&captures, 1).ok_or_else(malformed)?),
            };
            events.push(PlanEvent::FullScanResult(extent));
        }
    }

    Ok(PlanTrace::new(events))
}

/// Group diagnostic lines by family prefix, like `grep ^<family>:`.
///
/// Every family is present in the result, possibly empty. Lines keep
/// their prefix and lose trailing whitespace.
pub fn split_families<I, S>(lines: I) -> BTreeMap<DiagnosticFamily, Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut families: BTreeMap<_, Vec<String>> = DiagnosticFamily::ALL
        .into_iter()
        .map(|family| (family, Vec::new()))
        .collect();

    for raw in lines {
        let line = raw.as_ref().trim_end();
        if let Some(family) = DiagnosticFamily::ALL
            .into_iter()
            .find(|family| family.matches(line))
        {
            families.entry(family).or_default().push(line.to_string());
        }
    }

    families
}

fn parse_row(line: usize, text: &str) -> Result<Vec<i64>, ExtractError> {
    text.split_whitespace()
        .map(|field| {
            field.parse().map_err(|_| ExtractError::NotAnInteger {
                line,
                field: field.to_string(),
            })
        })
        .collect()
}

// `<lo..hi>` from two consecutive capture groups
fn span(captures: &Captures<'_>, first: usize) -> Option<RowSpan> {
    let lo = captures.get(first)?.as_str().parse().ok()?;
    let hi = captures.get(first + 1)?.as_str().parse().ok()?;

    Some(RowSpan::new(lo, hi))
}
