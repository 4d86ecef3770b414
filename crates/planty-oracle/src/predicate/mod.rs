//! Per-column filter: an ordered OR of intervals.


use crate::interval::{InclusiveRange, Interval, IntervalParseError};
use derive_more::Deref;
use thiserror::Error as ThisError;

///
/// PredicateError
///

#[derive(Debug, ThisError)]
pub enum PredicateError {
    #[error("predicate needs at least one interval")]
    NoIntervals,

    #[error(transparent)]
    Interval(#[from] IntervalParseError),
}

///
/// Predicate
///
/// Non-empty, ordered list of alternative intervals attached to one column.
/// A value matches when any alternative contains it. Alternative order is
/// kept because it is part of the rendered query text.
///

#[derive(Clone, Debug, Deref, Eq, Hash, PartialEq)]
pub struct Predicate {
    intervals: Vec<Interval>,
}

impl Predicate {
    pub fn new(intervals: Vec<Interval>) -> Result<Self, PredicateError> {
        if intervals.is_empty() {
            return Err(PredicateError::NoIntervals);
        }

        Ok(Self { intervals })
    }

    #[must_use]
    pub fn single(interval: Interval) -> Self {
        Self {
            intervals: vec![interval],
        }
    }

    /// Parse every literal and keep them in the given order.
    pub fn parse_all<S: AsRef<str>>(literals: &[S]) -> Result<Self, PredicateError> {
        let intervals = literals
            .iter()
            .map(|literal| Interval::parse(literal.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(intervals)
    }

    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// True when the predicate pins the column to exactly one value.
    ///
    /// Multi-interval predicates are never exact, even when every
    /// alternative names the same value.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        match self.intervals.as_slice() {
            [only] => only.single_value().is_some(),
            _ => false,
        }
    }

    #[must_use]
    pub fn matches(&self, value: i64) -> bool {
        self.intervals
            .iter()
            .any(|interval| interval.contains(value))
    }

    /// Smallest inclusive span that covers every non-empty alternative.
    #[must_use]
    pub fn hull(&self) -> Option<InclusiveRange> {
        self.intervals
            .iter()
            .filter_map(Interval::normalize)
            .reduce(InclusiveRange::hull)
    }

    /// Query-language fragment for this predicate on `column`.
    ///
    /// OR within a column repeats the `column=` clause:
    /// `c=[1..2), c=3`.
    #[must_use]
    pub fn render(&self, column: &str) -> String {
        self.intervals
            .iter()
            .map(|interval| format!("{column}={interval}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Interval> for Predicate {
    fn from(interval: Interval) -> Self {
        Self::single(interval)
    }
}
