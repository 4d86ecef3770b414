//! Integer interval algebra shared by every generator and by the plan model.
//!
//! Grammar (single source of truth for both rendering and parsing):
//!
//! ```text
//! interval := value | open lower? ".." upper? close
//! open     := "[" | "("
//! close    := "]" | ")"
//! value    := i64
//! ```
//!
//! A bare `value` is an exact interval `[v..v]`. An omitted side is
//! unbounded regardless of the bracket written next to it.


use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Bound,
    str::FromStr,
};
use thiserror::Error as ThisError;

///
/// SyntaxError
///
/// Reason an interval literal was rejected.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum SyntaxError {
    #[error("empty interval")]
    Empty,

    #[error("bad range close")]
    MissingClose,

    #[error("bad range open")]
    MissingOpen,

    #[error("missing '..' separator")]
    MissingSeparator,

    #[error("not an integer: '{0}'")]
    NotAnInteger(String),
}

///
/// IntervalParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("invalid interval '{text}': {kind}")]
pub struct IntervalParseError {
    pub text: String,
    pub kind: SyntaxError,
}

impl IntervalParseError {
    fn new(text: &str, kind: SyntaxError) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }
}

///
/// InclusiveRange
///
/// Normalized, non-empty `[low..=high]` span of integers.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct InclusiveRange {
    pub low: i64,
    pub high: i64,
}

impl InclusiveRange {
    /// Build a span, returning `None` when `low > high`.
    #[must_use]
    pub const fn new(low: i64, high: i64) -> Option<Self> {
        if low > high {
            None
        } else {
            Some(Self { low, high })
        }
    }

    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }

    #[must_use]
    pub const fn is_single(self) -> bool {
        self.low == self.high
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn hull(self, other: Self) -> Self {
        Self {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Overlapping part of two spans, if any.
    #[must_use]
    pub fn intersection(self, other: Self) -> Option<Self> {
        Self::new(self.low.max(other.low), self.high.min(other.high))
    }
}

///
/// Interval
///
/// One bound pair over `i64`. Empty intervals are representable; emptiness
/// is a property of the normalized form, not of construction.
///
/// Equality and hashing look at the bounds only. Whether an exact interval
/// was written as `3` or `[3..3]` affects rendering, nothing else.
///

#[derive(Clone, Copy, Debug)]
pub struct Interval {
    lower: Bound<i64>,
    upper: Bound<i64>,
    bare: bool,
}

impl Interval {
    #[must_use]
    pub const fn new(lower: Bound<i64>, upper: Bound<i64>) -> Self {
        Self {
            lower,
            upper,
            bare: false,
        }
    }

    /// Degenerate interval `[value..value]`.
    #[must_use]
    pub const fn exact(value: i64) -> Self {
        Self::new(Bound::Included(value), Bound::Included(value))
    }

    /// Exact interval rendered as the bare literal `value`.
    #[must_use]
    pub const fn value(value: i64) -> Self {
        Self {
            lower: Bound::Included(value),
            upper: Bound::Included(value),
            bare: true,
        }
    }

    /// `[low..high]`
    #[must_use]
    pub const fn closed(low: i64, high: i64) -> Self {
        Self::new(Bound::Included(low), Bound::Included(high))
    }

    /// `[low..high)`
    #[must_use]
    pub const fn half_open(low: i64, high: i64) -> Self {
        Self::new(Bound::Included(low), Bound::Excluded(high))
    }

    /// `(..high]`
    #[must_use]
    pub const fn at_most(high: i64) -> Self {
        Self::new(Bound::Unbounded, Bound::Included(high))
    }

    /// `[low..)`
    #[must_use]
    pub const fn at_least(low: i64) -> Self {
        Self::new(Bound::Included(low), Bound::Unbounded)
    }

    /// `(..)`
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    #[must_use]
    pub const fn lower(&self) -> Bound<i64> {
        self.lower
    }

    #[must_use]
    pub const fn upper(&self) -> Bound<i64> {
        self.upper
    }

    /// Parse one interval literal.
    pub fn parse(text: &str) -> Result<Self, IntervalParseError> {
        parse_interval(text)
    }

    /// Resolve both bounds to inclusive endpoints.
    ///
    /// `open(v)` lower becomes `v + 1`, `open(v)` upper becomes `v - 1`,
    /// unbounded sides become the `i64` extremes. Returns `None` when the
    /// resolved span is empty.
    #[must_use]
    pub fn normalize(&self) -> Option<InclusiveRange> {
        let low = match self.lower {
            Bound::Unbounded => i64::MIN,
            Bound::Included(value) => value,
            Bound::Excluded(value) => value.checked_add(1)?,
        };
        let high = match self.upper {
            Bound::Unbounded => i64::MAX,
            Bound::Included(value) => value,
            Bound::Excluded(value) => value.checked_sub(1)?,
        };

        InclusiveRange::new(low, high)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalize().is_none()
    }

    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        self.normalize().is_some_and(|range| range.contains(value))
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self.normalize(), other.normalize()) {
            (Some(left), Some(right)) => left.intersection(right).is_some(),
            _ => false,
        }
    }

    /// The only member of this interval, if it has exactly one.
    #[must_use]
    pub fn single_value(&self) -> Option<i64> {
        self.normalize()
            .filter(|range| range.is_single())
            .map(|range| range.low)
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
        self.upper.hash(state);
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_interval(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bare
            && let Bound::Included(value) = self.lower
        {
            return write!(f, "{value}");
        }

        match self.lower {
            Bound::Included(value) => write!(f, "[{value}")?,
            Bound::Excluded(value) => write!(f, "({value}")?,
            Bound::Unbounded => f.write_str("(")?,
        }
        f.write_str("..")?;
        match self.upper {
            Bound::Included(value) => write!(f, "{value}]"),
            Bound::Excluded(value) => write!(f, "{value})"),
            Bound::Unbounded => f.write_str(")"),
        }
    }
}

fn parse_interval(raw: &str) -> Result<Interval, IntervalParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(IntervalParseError::new(raw, SyntaxError::Empty));
    }

    let Some(open) = text.chars().next() else {
        return Err(IntervalParseError::new(raw, SyntaxError::Empty));
    };
    if !matches!(open, '[' | '(') {
        if text.ends_with([']', ')']) || text.contains("..") {
            return Err(IntervalParseError::new(raw, SyntaxError::MissingOpen));
        }
        let value = parse_value(raw, text)?;

        return Ok(Interval::value(value));
    }

    let close = text[1..].chars().last();
    let Some(close @ (']' | ')')) = close else {
        return Err(IntervalParseError::new(raw, SyntaxError::MissingClose));
    };

    let inner = &text[1..text.len() - 1];
    let Some((lower, upper)) = inner.split_once("..") else {
        return Err(IntervalParseError::new(raw, SyntaxError::MissingSeparator));
    };

    let lower = if lower.is_empty() {
        Bound::Unbounded
    } else {
        let value = parse_value(raw, lower)?;
        if open == '[' {
            Bound::Included(value)
        } else {
            Bound::Excluded(value)
        }
    };
    let upper = if upper.is_empty() {
        Bound::Unbounded
    } else {
        let value = parse_value(raw, upper)?;
        if close == ']' {
            Bound::Included(value)
        } else {
            Bound::Excluded(value)
        }
    };

    Ok(Interval::new(lower, upper))
}

fn parse_value(raw: &str, token: &str) -> Result<i64, IntervalParseError> {
    token
        .parse::<i64>()
        .map_err(|_| IntervalParseError::new(raw, SyntaxError::NotAnInteger(token.to_string())))
}
