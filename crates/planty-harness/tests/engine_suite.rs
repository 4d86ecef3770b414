//! Every fixture family against a real engine.
//!
//! Runs only when `PLANTY_ENGINE` (or a `PLANTY_CONFIG` file) names an
//! engine binary; otherwise each test logs and returns.

use planty_harness::{
    HarnessError, config::HarnessConfig, engine::ProcessEngine, logging, runner::Runner,
};
use planty_oracle::generate::{
    ColumnSpec, Fixture, empty_dataset, fullscan, interval_battery, multicolumn, no_where,
    output_ordering, plan_catalog, projection, syntax_errors, unknown_column, unsorted_key,
};

fn runner(suite: &str) -> Option<Runner<ProcessEngine>> {
    logging::init();

    let config = HarnessConfig::from_env().expect("harness config");
    match Runner::from_config(&config) {
        Ok(runner) => Some(runner),
        Err(HarnessError::MissingEngine) => {
            tracing::info!(suite, "no engine configured, skipping");
            None
        }
        Err(err) => panic!("harness setup failed: {err}"),
    }
}

fn run(suite: &str, fixtures: &[Fixture]) {
    let Some(runner) = runner(suite) else {
        return;
    };

    let summary = runner.run_all(fixtures);
    for (case, err) in &summary.failed {
        eprintln!("{suite}/{case}: {err}");
    }
    assert!(
        summary.is_success(),
        "{suite}: {} case(s) failed",
        summary.failed.len()
    );
}

#[test]
fn fullscan_suite() {
    let mut fixtures = Vec::new();
    for columns in 1..=3 {
        for max_value in [1, 3, 5] {
            for key_len in 0..=columns {
                fixtures.push(fullscan(columns, max_value, key_len).expect("fullscan"));
            }
        }
    }

    run("fullscan", &fixtures);
}

#[test]
fn interval_suite() {
    let fixtures: Vec<Fixture> = [(0, false), (1, false), (1, true)]
        .into_iter()
        .map(|(key_len, reversed)| interval_battery(key_len, reversed).expect("intervals"))
        .collect();

    run("intervals", &fixtures);
}

#[test]
fn multicolumn_suite() {
    let layouts = [
        vec![ColumnSpec::new(1, 0), ColumnSpec::new(0, 1)],
        vec![
            ColumnSpec::new(1, 0),
            ColumnSpec::new(1, 0),
            ColumnSpec::new(0, 2),
        ],
        vec![
            ColumnSpec::new(2, 0),
            ColumnSpec::new(0, 0),
            ColumnSpec::new(1, 1),
        ],
    ];

    let mut fixtures = Vec::new();
    for specs in &layouts {
        for key_len in 0..=specs.len() {
            fixtures.push(multicolumn(specs, key_len).expect("multicolumn"));
        }
    }

    run("multicolumn", &fixtures);
}

#[test]
fn ordering_and_plan_suite() {
    let mut fixtures = output_ordering().expect("ordering");
    fixtures.extend(plan_catalog().expect("catalog"));

    run("plans", &fixtures);
}

#[test]
fn golden_literal_suite() {
    let fixtures = vec![
        projection().expect("projection"),
        no_where().expect("no where"),
        empty_dataset(0).expect("empty"),
        empty_dataset(1).expect("empty keyed"),
        unknown_column().expect("unknown column"),
        syntax_errors().expect("syntax errors"),
        unsorted_key().expect("unsorted key"),
    ];

    run("golden", &fixtures);
}
