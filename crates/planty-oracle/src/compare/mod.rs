//! Expected-vs-actual comparison of engine output.
//!
//! Comparison is ordered and exact. A stream that cannot be parsed is a
//! structural failure, kept distinct from a well-formed stream holding the
//! wrong values.


use crate::{
    extract::{
        ExtractError, extract_plan_markers, extract_plan_trace, extract_query_errors,
        extract_results,
    },
    plan::PlanTrace,
    query::ResultBlock,
};
use thiserror::Error as ThisError;

///
/// CompareError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompareError {
    #[error("malformed engine output: {0}")]
    Structural(#[from] ExtractError),

    #[error("expected {expected} result blocks, found {actual}")]
    BlockCount { expected: usize, actual: usize },

    #[error("block {block}: expected header {expected:?}, found {actual:?}")]
    Header {
        block: usize,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("block {block}: expected rows {expected:?}, found {actual:?}")]
    Rows {
        block: usize,
        expected: Vec<Vec<i64>>,
        actual: Vec<Vec<i64>>,
    },

    #[error("expected query errors {expected:?}, found {actual:?}")]
    Errors {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("expected plan markers {expected:?}, found {actual:?}")]
    PlanMarkers {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("plan trace differs at event {index}: expected {expected:?}, found {actual:?}")]
    Trace {
        index: usize,
        expected: Option<String>,
        actual: Option<String>,
    },
}

impl CompareError {
    /// True when the engine output could not be parsed at all.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}

/// Compare the result stream against the expected blocks, in order.
///
/// Blocks are numbered from 1 in error reports.
pub fn compare_results<I, S>(expected: &[ResultBlock], actual_lines: I) -> Result<(), CompareError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let actual = extract_results(actual_lines)?;
    if actual.len() != expected.len() {
        return Err(CompareError::BlockCount {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    for (index, (want, got)) in expected.iter().zip(actual).enumerate() {
        if want.header != got.header {
            return Err(CompareError::Header {
                block: index + 1,
                expected: want.header.clone(),
                actual: got.header,
            });
        }
        if want.rows != got.rows {
            return Err(CompareError::Rows {
                block: index + 1,
                expected: want.rows.clone(),
                actual: got.rows,
            });
        }
    }

    Ok(())
}

/// Compare the `query error:` lines of the result stream, in order.
pub fn compare_errors<I, S>(expected: &[String], actual_lines: I) -> Result<(), CompareError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let actual = extract_query_errors(actual_lines);
    let expected: Vec<String> = expected
        .iter()
        .map(|line| line.trim_end().to_string())
        .collect();

    if actual == expected {
        Ok(())
    } else {
        Err(CompareError::Errors { expected, actual })
    }
}

/// Compare `first_remaining_column` markers of the diagnostic stream.
pub fn compare_plan_markers<I, S>(
    expected: &[usize],
    diagnostic_lines: I,
) -> Result<(), CompareError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let actual = extract_plan_markers(diagnostic_lines);
    if actual == expected {
        Ok(())
    } else {
        Err(CompareError::PlanMarkers {
            expected: expected.to_vec(),
            actual,
        })
    }
}

/// Compare the full plan trace event by event.
///
/// The report names the first differing position; a missing event on
/// either side shows as `None`.
pub fn compare_trace<I, S>(expected: &PlanTrace, diagnostic_lines: I) -> Result<(), CompareError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let actual = extract_plan_trace(diagnostic_lines)?;
    if actual == *expected {
        return Ok(());
    }

    let want = expected.render();
    let got = actual.render();
    let index = want
        .iter()
        .zip(&got)
        .position(|(w, g)| w != g)
        .unwrap_or_else(|| want.len().min(got.len()));

    Err(CompareError::Trace {
        index,
        expected: want.get(index).cloned(),
        actual: got.get(index).cloned(),
    })
}
