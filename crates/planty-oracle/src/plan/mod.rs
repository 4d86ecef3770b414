//! Scan-plan prediction for key-prefix tables.
//!
//! Rows are sorted by the full key tuple, so a sorted-order narrowing scan
//! is valid on column `i` only while every key column before it was pinned
//! to a single value. The first non-exact key column is still range-scanned
//! once; past it, rows in the candidate block interleave orderings of the
//! next column and only a linear scan is sound.

mod trace;


pub use trace::{FullScanExtent, PLAN_PREFIX, PlanEvent, PlanTrace, RowSpan};

use crate::{
    predicate::Predicate,
    query::{Query, QueryError},
    table::Table,
};
use serde::Serialize;

///
/// ScanPlan
///
/// Expected planner decision for one query: which key columns are
/// range-scanned, and the first column left to the linear scan.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ScanPlan {
    pub range_columns: Vec<usize>,
    pub first_remaining_column: usize,
}

impl ScanPlan {
    /// Predict the plan from per-column predicates (index = column).
    ///
    /// A key column without a predicate is passed through: it neither
    /// narrows the block nor ends eligibility. Slots missing from
    /// `predicates` count as unconstrained.
    #[must_use]
    pub fn predict(key_len: usize, predicates: &[Option<&Predicate>]) -> Self {
        let mut range_columns = Vec::new();

        for column in 0..key_len {
            let Some(predicate) = predicates.get(column).copied().flatten() else {
                continue;
            };

            range_columns.push(column);
            if !predicate.is_exact() {
                return Self {
                    range_columns,
                    first_remaining_column: column + 1,
                };
            }
        }

        Self {
            range_columns,
            first_remaining_column: key_len,
        }
    }

    /// Resolve the query's predicates against `table` and predict.
    pub fn for_query(table: &Table, query: &Query) -> Result<Self, QueryError> {
        let slots = query.column_predicates(table)?;

        Ok(Self::predict(table.key_len(), &slots))
    }

    /// True when the range-scanned columns are exactly `0..n` for some `n`.
    #[must_use]
    pub fn narrows_prefix(&self) -> bool {
        self.range_columns
            .iter()
            .enumerate()
            .all(|(position, column)| position == *column)
    }

    /// Range-scan-result line without the row span, enough for marker
    /// extraction when no trace is known.
    #[must_use]
    pub fn marker_line(&self) -> String {
        format!(
            "{PLAN_PREFIX} Range scan result: (first_remaining_column={})",
            self.first_remaining_column
        )
    }
}
