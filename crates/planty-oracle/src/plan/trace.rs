//! Fine-grained plan trace: the `plan:` diagnostic lines of one query as an
//! immutable list of tagged events.

use crate::{
    plan::ScanPlan,
    predicate::Predicate,
    query::{Query, QueryError},
    table::Table,
};
use derive_more::Deref;
use serde::Serialize;
use std::fmt;

/// Prefix of every plan diagnostic line.
pub const PLAN_PREFIX: &str = "plan:";

///
/// RowSpan
///
/// Inclusive row-index span `<lo..hi>`. Empty spans have `hi == lo - 1`,
/// so signed indexes are used.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct RowSpan {
    pub lo: i64,
    pub hi: i64,
}

impl RowSpan {
    #[must_use]
    pub const fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    /// Empty span positioned at `at`.
    #[must_use]
    pub const fn empty_at(at: i64) -> Self {
        Self { lo: at, hi: at - 1 }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.hi < self.lo
    }
}

impl fmt::Display for RowSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}..{}>", self.lo, self.hi)
    }
}

///
/// FullScanExtent
///
/// What the engine reports after the linear scan: either the final row
/// span or a surviving-row count.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum FullScanExtent {
    Range(RowSpan),
    Count(usize),
}

///
/// PlanEvent
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PlanEvent {
    RangeScan {
        column: String,
        rows: RowSpan,
    },
    RangeScanResult {
        first_remaining_column: usize,
        rows: RowSpan,
    },
    FullScanResult(FullScanExtent),
}

impl PlanEvent {
    /// Diagnostic line for this event, `plan:` prefix included.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::RangeScan { column, rows } => {
                format!("{PLAN_PREFIX} Range scan for column: {column} rows: {rows}")
            }
            Self::RangeScanResult {
                first_remaining_column,
                rows,
            } => format!(
                "{PLAN_PREFIX} Range scan result: \
                 (first_remaining_column={first_remaining_column}, rows={rows})"
            ),
            Self::FullScanResult(FullScanExtent::Range(rows)) => {
                format!("{PLAN_PREFIX} Full scan result: {rows}")
            }
            Self::FullScanResult(FullScanExtent::Count(count)) => {
                format!("{PLAN_PREFIX} Full scan result: {count}")
            }
        }
    }
}

///
/// PlanTrace
///
/// Ordered plan events for one or more queries. Compared structurally
/// against the trace parsed from the engine's diagnostic stream.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq, Serialize)]
pub struct PlanTrace {
    events: Vec<PlanEvent>,
}

impl PlanTrace {
    #[must_use]
    pub const fn new(events: Vec<PlanEvent>) -> Self {
        Self { events }
    }

    #[must_use]
    pub fn events(&self) -> &[PlanEvent] {
        &self.events
    }

    /// Concatenate traces of consecutive queries.
    #[must_use]
    pub fn concat(traces: impl IntoIterator<Item = Self>) -> Self {
        Self {
            events: traces.into_iter().flat_map(|trace| trace.events).collect(),
        }
    }

    /// `first_remaining_column` of every range-scan result, in order.
    #[must_use]
    pub fn markers(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                PlanEvent::RangeScanResult {
                    first_remaining_column,
                    ..
                } => Some(*first_remaining_column),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.events.iter().map(PlanEvent::render).collect()
    }

    /// Predict the trace of `query` against `table` by brute force.
    ///
    /// Starting from the whole table, each range-scanned column narrows
    /// the block to the rows whose value falls in the predicate hull. The
    /// block is assumed sorted by that column, which holds while every
    /// earlier key column was pinned. An empty narrowing lands on the
    /// lower-bound insertion point.
    pub fn predict(table: &Table, query: &Query) -> Result<Self, QueryError> {
        let plan = ScanPlan::for_query(table, query)?;
        let slots = query.column_predicates(table)?;
        let rows = table.rows();
        let mut events = Vec::with_capacity(plan.range_columns.len() + 2);
        let mut block = RowSpan::new(0, to_index(table.row_count()) - 1);

        for &column in &plan.range_columns {
            let hull = slots[column].and_then(Predicate::hull);
            let mut first = None;
            let mut last = None;
            let mut below = 0;

            for index in block.lo..=block.hi {
                let value = rows[from_index(index)].values()[column];
                match hull {
                    Some(range) if range.contains(value) => {
                        first = first.or(Some(index));
                        last = Some(index);
                    }
                    Some(range) if value < range.low => below += 1,
                    _ => {}
                }
            }

            block = match (first, last) {
                (Some(lo), Some(hi)) => RowSpan::new(lo, hi),
                _ => RowSpan::empty_at(block.lo + below),
            };
            events.push(PlanEvent::RangeScan {
                column: table.columns()[column].clone(),
                rows: block,
            });
        }

        events.push(PlanEvent::RangeScanResult {
            first_remaining_column: plan.first_remaining_column,
            rows: block,
        });
        events.push(PlanEvent::FullScanResult(FullScanExtent::Count(
            query.matching_rows(table)?.len(),
        )));

        Ok(Self { events })
    }
}

fn to_index(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_index(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}
