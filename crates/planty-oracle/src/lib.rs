//! Reference oracle for planty-db: interval algebra, fixture generation,
//! scan-plan prediction, and extraction/comparison of engine output.
//!
//! The crate is pure. Nothing here touches the filesystem, spawns processes,
//! or holds global state; the harness crate owns all of that.
#![warn(unreachable_pub)]

pub mod compare;
pub mod extract;
pub mod generate;
pub mod interval;
pub mod plan;
pub mod predicate;
pub mod query;
pub mod table;

///
/// CONSTANTS
///

/// Marker that opens one query's block in the engine result stream.
pub const QUERY_NUMBER_MARKER: &str = "query number:";

/// Prefix of every query-level error line in the engine result stream.
pub const QUERY_ERROR_PREFIX: &str = "query error:";

///
/// Prelude
///
/// Domain vocabulary only; errors and helpers stay in their modules.
///

pub mod prelude {
    pub use crate::{
        generate::{Expectation, Fixture, QueryCase},
        interval::{InclusiveRange, Interval},
        plan::{PlanEvent, PlanTrace, RowSpan, ScanPlan},
        predicate::Predicate,
        query::{Projection, Query, ResultBlock},
        table::{Row, Table},
    };
}
