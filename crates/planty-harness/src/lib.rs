//! Runs the planty-db engine against oracle fixtures.
//!
//! Owns every side effect the oracle crate avoids: case directories,
//! subprocesses, configuration, logging and run bookkeeping.
#![warn(unreachable_pub)]

pub mod case_dir;
pub mod config;
pub mod engine;
pub mod error;
pub mod golden;
pub mod logging;
pub mod recorder;
pub mod runner;

pub use error::HarnessError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        HarnessError,
        case_dir::CaseDir,
        config::{HarnessConfig, PlanCheck},
        engine::{Engine, EngineOutcome, ProcessEngine},
        golden::{GoldenMode, GoldenReport, run_golden, run_golden_dirs},
        recorder::{JsonlRecorder, NoopRecorder, RunRecorder, TracingRecorder, Verdict},
        runner::{CaseReport, RunSummary, Runner},
    };
}
