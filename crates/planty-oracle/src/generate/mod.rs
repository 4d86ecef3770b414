//! Fixture generation: datasets, query text, and the expected output for
//! every family the engine is exercised with.
//!
//! All generators are pure. The only randomness is the fullscan shuffle,
//! driven by a fixed-seed ChaCha stream, so the same arguments always
//! produce byte-identical files.

mod catalog;
mod fullscan;
mod intervals;
mod multicolumn;
mod name;
mod ordering;
mod suites;

#[cfg(test)]
mod tests;

pub use catalog::plan_catalog;
pub use fullscan::{FULLSCAN_SEED, fullscan};
pub use intervals::interval_battery;
pub use multicolumn::{ColumnSpec, multicolumn};
pub use name::{FixtureName, FixtureNameError};
pub use ordering::output_ordering;
pub use suites::{
    TABLE_ERROR_EXIT_CODE, TABLE_ERROR_PREFIX, empty_dataset, no_where, projection, syntax_errors,
    unknown_column, unsorted_key,
};

use crate::{
    QUERY_NUMBER_MARKER,
    plan::{PlanTrace, ScanPlan},
    predicate::PredicateError,
    query::{Query, QueryError, ResultBlock},
    table::{Table, TableError, join_values},
};
use std::fmt::Write as _;
use thiserror::Error as ThisError;

///
/// FixtureError
///

#[derive(Debug, ThisError)]
pub enum FixtureError {
    #[error("fixture needs at least one column")]
    NoColumns,

    #[error("value range must be non-empty")]
    EmptyValueRange,

    #[error("table meant to break key order is already ordered")]
    KeyAlreadyOrdered,

    #[error("key length {key_len} exceeds column count {columns}")]
    KeyTooLong { key_len: usize, columns: usize },

    #[error("row count overflows for {columns} columns over {values} values")]
    TooManyRows { columns: usize, values: usize },

    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Table(#[from] TableError),
}

///
/// Expectation
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expectation {
    /// A result block, optionally with the predicted plan and trace.
    Rows {
        block: ResultBlock,
        plan: Option<ScanPlan>,
        trace: Option<PlanTrace>,
    },

    /// A literal `query error: ...` line.
    Error(String),
}

///
/// QueryCase
///
/// One line of the query file plus what the engine must answer.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryCase {
    pub label: String,
    pub text: String,
    pub expectation: Expectation,
}

impl QueryCase {
    /// Evaluate `query` against `table` by brute force and predict its plan.
    ///
    /// The trace is attached only when the range-scanned columns form an
    /// unbroken key prefix; past an unconstrained key column the block is
    /// no longer sorted and the brute-force narrowing does not apply.
    pub fn evaluate(
        label: impl Into<String>,
        table: &Table,
        query: &Query,
    ) -> Result<Self, FixtureError> {
        let block = query.evaluate(table)?;

        Self::literal(label, table, query, block)
    }

    /// Like [`Self::evaluate`], but with the expected rows given literally.
    pub fn literal(
        label: impl Into<String>,
        table: &Table,
        query: &Query,
        block: ResultBlock,
    ) -> Result<Self, FixtureError> {
        let plan = ScanPlan::for_query(table, query)?;
        let trace = if plan.narrows_prefix() {
            Some(PlanTrace::predict(table, query)?)
        } else {
            None
        };

        Ok(Self {
            label: label.into(),
            text: query.render(),
            expectation: Expectation::Rows {
                block,
                plan: Some(plan),
                trace,
            },
        })
    }

    /// Case with literal expected rows and no plan expectation.
    #[must_use]
    pub fn rows(label: impl Into<String>, text: impl Into<String>, block: ResultBlock) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            expectation: Expectation::Rows {
                block,
                plan: None,
                trace: None,
            },
        }
    }

    /// Case whose only expected output is one `query error:` line.
    #[must_use]
    pub fn error(
        label: impl Into<String>,
        text: impl Into<String>,
        line: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            expectation: Expectation::Error(line.into()),
        }
    }

    /// Replace the plan expectation, dropping any predicted trace.
    #[must_use]
    pub fn with_plan(mut self, expected: ScanPlan) -> Self {
        if let Expectation::Rows { plan, trace, .. } = &mut self.expectation {
            *plan = Some(expected);
            *trace = None;
        }

        self
    }

    #[must_use]
    pub const fn block(&self) -> Option<&ResultBlock> {
        match &self.expectation {
            Expectation::Rows { block, .. } => Some(block),
            Expectation::Error(_) => None,
        }
    }
}

///
/// TableFailure
///
/// Fatal table-level error the engine must report instead of answering.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableFailure {
    pub exit_code: i32,
    pub line: String,
}

///
/// Fixture
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fixture {
    name: String,
    table: Table,
    cases: Vec<QueryCase>,
    failure: Option<TableFailure>,
}

impl Fixture {
    #[must_use]
    pub fn new(name: impl Into<String>, table: Table, cases: Vec<QueryCase>) -> Self {
        Self {
            name: name.into(),
            table,
            cases,
            failure: None,
        }
    }

    #[must_use]
    pub fn with_failure(mut self, exit_code: i32, line: impl Into<String>) -> Self {
        self.failure = Some(TableFailure {
            exit_code,
            line: line.into(),
        });

        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    #[must_use]
    pub fn cases(&self) -> &[QueryCase] {
        &self.cases
    }

    #[must_use]
    pub const fn expected_failure(&self) -> Option<&TableFailure> {
        self.failure.as_ref()
    }

    /// Exit code the engine must return.
    #[must_use]
    pub fn expected_exit_code(&self) -> i32 {
        self.failure.as_ref().map_or(0, |failure| failure.exit_code)
    }

    /// Result blocks in query order, skipping error cases.
    #[must_use]
    pub fn expected_blocks(&self) -> Vec<ResultBlock> {
        self.cases
            .iter()
            .filter_map(QueryCase::block)
            .cloned()
            .collect()
    }

    /// Expected `query error:` lines in query order.
    #[must_use]
    pub fn expected_errors(&self) -> Vec<String> {
        self.cases
            .iter()
            .filter_map(|case| match &case.expectation {
                Expectation::Error(line) => Some(line.clone()),
                Expectation::Rows { .. } => None,
            })
            .collect()
    }

    /// `first_remaining_column` per row-producing query, or `None` when any
    /// such query carries no plan expectation.
    #[must_use]
    pub fn expected_markers(&self) -> Option<Vec<usize>> {
        self.cases
            .iter()
            .filter_map(|case| match &case.expectation {
                Expectation::Rows { plan, .. } => {
                    Some(plan.as_ref().map(|plan| plan.first_remaining_column))
                }
                Expectation::Error(_) => None,
            })
            .collect()
    }

    /// Concatenated trace of every row-producing query, or `None` when any
    /// of them has no predicted trace.
    #[must_use]
    pub fn expected_trace(&self) -> Option<PlanTrace> {
        let traces = self
            .cases
            .iter()
            .filter_map(|case| match &case.expectation {
                Expectation::Rows { trace, .. } => Some(trace.clone()),
                Expectation::Error(_) => None,
            })
            .collect::<Option<Vec<_>>>()?;

        Some(PlanTrace::concat(traces))
    }

    /// Dataset file contents.
    #[must_use]
    pub fn dataset_text(&self) -> String {
        self.table.render()
    }

    /// Query file contents, one query per line.
    #[must_use]
    pub fn query_text(&self) -> String {
        self.cases
            .iter()
            .map(|case| format!("{}\n", case.text))
            .collect()
    }

    /// Reference result stream.
    ///
    /// Row-producing queries are numbered from 1 in order; error cases emit
    /// their line without consuming a number. A table failure replaces the
    /// whole stream with its single line.
    #[must_use]
    pub fn expected_output_text(&self) -> String {
        if let Some(failure) = &self.failure {
            return format!("{}\n", failure.line);
        }

        let mut out = String::new();
        let mut number = 0;
        for case in &self.cases {
            match &case.expectation {
                Expectation::Error(line) => {
                    out.push_str(line);
                    out.push('\n');
                }
                Expectation::Rows { block, .. } => {
                    number += 1;
                    let _ = writeln!(out, "{QUERY_NUMBER_MARKER} {number}");
                    let _ = writeln!(out, "{}", block.header.join(" "));
                    for row in &block.rows {
                        let _ = writeln!(out, "{}", join_values(row));
                    }
                }
            }
        }

        out
    }

    /// Reference `plan:` diagnostic lines.
    ///
    /// Uses the full predicted trace when every query has one; otherwise
    /// falls back to one range-scan-result marker per known plan.
    #[must_use]
    pub fn expected_plan_text(&self) -> String {
        let lines = match self.expected_trace() {
            Some(trace) => trace.render(),
            None => self
                .cases
                .iter()
                .filter_map(|case| match &case.expectation {
                    Expectation::Rows {
                        plan: Some(plan), ..
                    } => Some(plan.marker_line()),
                    _ => None,
                })
                .collect(),
        };

        lines.iter().map(|line| format!("{line}\n")).collect()
    }
}

// validate the shared generator arguments
fn check_shape(columns: usize, key_len: usize) -> Result<(), FixtureError> {
    if columns == 0 {
        return Err(FixtureError::NoColumns);
    }
    if key_len > columns {
        return Err(FixtureError::KeyTooLong { key_len, columns });
    }

    Ok(())
}

// total row count of the Cartesian product of `domains`
fn product_len(domains: &[Vec<i64>]) -> Result<usize, FixtureError> {
    domains
        .iter()
        .try_fold(1usize, |total, domain| total.checked_mul(domain.len()))
        .ok_or_else(|| FixtureError::TooManyRows {
            columns: domains.len(),
            values: domains.iter().map(Vec::len).max().unwrap_or_default(),
        })
}

/// Cartesian product of per-column domains, last column varying fastest.
fn cartesian(domains: &[Vec<i64>]) -> Result<Vec<Vec<i64>>, FixtureError> {
    let mut rows = Vec::with_capacity(product_len(domains)?);
    if domains.iter().any(Vec::is_empty) {
        return Ok(rows);
    }

    let mut cursor = vec![0usize; domains.len()];
    loop {
        rows.push(
            cursor
                .iter()
                .zip(domains)
                .map(|(at, domain)| domain[*at])
                .collect(),
        );

        // advance the odometer from the last column
        let mut column = domains.len();
        loop {
            if column == 0 {
                return Ok(rows);
            }
            column -= 1;
            cursor[column] += 1;
            if cursor[column] < domains[column].len() {
                break;
            }
            cursor[column] = 0;
        }
    }
}
