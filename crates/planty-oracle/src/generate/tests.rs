use super::*;
use crate::{interval::Interval, plan::PlanEvent, predicate::Predicate};
use proptest::prelude::*;

fn single_block(fixture: &Fixture) -> ResultBlock {
    let blocks = fixture.expected_blocks();
    assert_eq!(
        blocks.len(),
        1,
        "fixture {} should hold one block",
        fixture.name()
    );

    blocks[0].clone()
}

// rebuild the query from its rendered text
fn query_of(fixture: &Fixture) -> Query {
    let mut grouped: Vec<(String, Vec<Interval>)> = Vec::new();
    if let Some((_, clauses)) = fixture.cases()[0].text.split_once(" where ") {
        for clause in clauses.split(", ") {
            let (column, literal) = clause.split_once('=').expect("clause should have '='");
            let interval: Interval = literal.parse().expect("interval should parse");
            match grouped.iter_mut().find(|(name, _)| name == column) {
                Some((_, intervals)) => intervals.push(interval),
                None => grouped.push((column.to_string(), vec![interval])),
            }
        }
    }

    grouped.into_iter().fold(
        Query::select(fixture.table().columns()),
        |query, (column, intervals)| {
            query
                .with_predicate(column, Predicate::new(intervals).expect("predicate"))
                .expect("query")
        },
    )
}

#[test]
fn fullscan_matches_brute_force() {
    let fixture = fullscan(3, 4, 2).expect("fullscan");
    let table = fixture.table();

    assert_eq!(fixture.name(), "fullscan.3.4.2");
    assert_eq!(table.row_count(), 64);
    assert_eq!(table.check_key_order(), Ok(()));
    assert_eq!(
        fixture.cases()[0].text,
        "select c0, c1, c2 where c0=(..2], c1=(..3], c2=(..0]"
    );

    let block = single_block(&fixture);
    let expected: Vec<Vec<i64>> = table
        .rows()
        .iter()
        .map(|row| row.values().to_vec())
        .filter(|row| row[0] <= 2 && row[1] <= 3 && row[2] <= 0)
        .collect();
    assert_eq!(block.rows, expected);
    assert_eq!(block.header, vec!["c0", "c1", "c2"]);
}

#[test]
fn fullscan_plan_stops_at_first_non_exact_column() {
    let fixture = fullscan(2, 3, 2).expect("fullscan");

    assert_eq!(fixture.expected_markers(), Some(vec![1]));
}

#[test]
fn fullscan_without_key_is_only_shuffled() {
    let fixture = fullscan(2, 3, 0).expect("fullscan");
    let mut values: Vec<Vec<i64>> = fixture
        .table()
        .rows()
        .iter()
        .map(|row| row.values().to_vec())
        .collect();
    values.sort();

    assert_eq!(values.len(), 9);
    assert_eq!(values[0], vec![0, 0]);
    assert_eq!(values[8], vec![2, 2]);
    assert_eq!(fixture.expected_markers(), Some(vec![0]));
}

#[test]
fn fullscan_rejects_bad_arguments() {
    assert!(matches!(fullscan(0, 3, 0), Err(FixtureError::NoColumns)));
    assert!(matches!(fullscan(2, 0, 0), Err(FixtureError::EmptyValueRange)));
    assert!(matches!(
        fullscan(2, 3, 3),
        Err(FixtureError::KeyTooLong {
            key_len: 3,
            columns: 2
        })
    ));
}

#[test]
fn interval_battery_literals_agree_with_algebra() {
    for key_len in [0, 1] {
        for reversed in [false, true] {
            let fixture = interval_battery(key_len, reversed).expect("battery");
            assert_eq!(fixture.cases().len(), 23);

            for case in fixture.cases() {
                let Expectation::Rows { block, .. } = &case.expectation else {
                    panic!("interval case {} should produce rows", case.label);
                };
                let literals: Vec<&str> = case
                    .text
                    .trim_start_matches("select c where ")
                    .split(", ")
                    .map(|clause| clause.trim_start_matches("c="))
                    .collect();
                let predicate = Predicate::parse_all(&literals).expect("predicate");
                let derived: Vec<Vec<i64>> = (2..=9)
                    .filter(|value| predicate.matches(*value))
                    .map(|value| vec![value])
                    .collect();

                assert_eq!(block.rows, derived, "case {}", case.label);
            }
        }
    }
}

#[test]
fn interval_battery_keeps_literal_forms() {
    let fixture = interval_battery(1, true).expect("battery");
    let texts: Vec<&str> = fixture.cases().iter().map(|c| c.text.as_str()).collect();

    assert!(texts.contains(&"select c where c=3"));
    assert!(texts.contains(&"select c where c=[3..3]"));
    assert!(texts.contains(&"select c where c=[7..9], c=[3..5]"));
    assert_eq!(fixture.name(), "intervals.1.reversed");
}

#[test]
fn multicolumn_layout_and_expectation() {
    let fixture = multicolumn(&[ColumnSpec::new(1, 0), ColumnSpec::new(0, 1)], 2)
        .expect("multicolumn");

    assert_eq!(fixture.name(), "multicolumn.1-0_0-1.2");
    assert_eq!(fixture.table().row_count(), 6);
    assert_eq!(
        fixture.cases()[0].text,
        "select c0, c1 where c0=[0..0], c1=[0..1]"
    );

    let block = single_block(&fixture);
    assert_eq!(block.rows, vec![vec![0, 0], vec![0, 1]]);
    assert_eq!(fixture.expected_markers(), Some(vec![2]));
}

#[test]
fn multicolumn_expectation_matches_brute_force() {
    let specs = [
        ColumnSpec::new(2, 1),
        ColumnSpec::new(0, 0),
        ColumnSpec::new(1, 2),
    ];

    for key_len in 0..=specs.len() {
        let fixture = multicolumn(&specs, key_len).expect("multicolumn");
        let brute = query_of(&fixture)
            .evaluate(fixture.table())
            .expect("evaluate");

        assert_eq!(single_block(&fixture), brute, "key_len {key_len}");
        assert_eq!(fixture.table().check_key_order(), Ok(()));
    }
}

#[test]
fn multicolumn_skips_trace_after_unconstrained_key_column() {
    let fixture = multicolumn(&[ColumnSpec::new(0, 0), ColumnSpec::new(1, 0)], 2)
        .expect("multicolumn");

    assert_eq!(fixture.expected_markers(), Some(vec![2]));
    assert_eq!(fixture.expected_trace(), None);
    assert_eq!(
        fixture.expected_plan_text(),
        "plan: Range scan result: (first_remaining_column=2)\n"
    );
}

#[test]
fn output_ordering_expectations_match_brute_force() {
    for fixture in output_ordering().expect("ordering") {
        let brute = query_of(&fixture)
            .evaluate(fixture.table())
            .expect("evaluate");

        assert_eq!(single_block(&fixture), brute, "{}", fixture.name());
    }
}

#[test]
fn plan_catalog_literals_agree_with_prediction() {
    let fixtures = plan_catalog().expect("catalog");
    assert_eq!(fixtures.len(), 8);

    let markers: Vec<Vec<usize>> = fixtures
        .iter()
        .map(|f| f.expected_markers().expect("catalog plans are known"))
        .collect();
    assert_eq!(
        markers,
        vec![
            vec![1],
            vec![1],
            vec![2],
            vec![0],
            vec![1],
            vec![2],
            vec![2],
            vec![1]
        ]
    );

    for fixture in &fixtures {
        let query = query_of(fixture);
        let predicted = ScanPlan::for_query(fixture.table(), &query).expect("plan");
        let Expectation::Rows { block, plan, .. } = &fixture.cases()[0].expectation else {
            panic!("catalog case should produce rows");
        };

        assert_eq!(plan.as_ref(), Some(&predicted), "{}", fixture.name());
        assert_eq!(
            *block,
            query.evaluate(fixture.table()).expect("evaluate"),
            "{}",
            fixture.name()
        );
    }
}

#[test]
fn projection_suite_output_text() {
    let fixture = projection().expect("projection");

    assert_eq!(
        fixture.query_text(),
        "select a\nselect b, a\nselect *\nselect *, a\n"
    );
    assert_eq!(
        fixture.expected_output_text(),
        "query number: 1\na\n1\n\
         query number: 2\nb a\n2 1\n\
         query number: 3\na b c\n1 2 3\n\
         query number: 4\na b c a\n1 2 3 1\n"
    );
    assert_eq!(fixture.expected_markers(), None);
}

#[test]
fn syntax_suite_interleaves_errors_and_numbering() {
    let fixture = syntax_errors().expect("syntax");
    let output = fixture.expected_output_text();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 20);
    assert_eq!(lines[0], "query error: no select at the beginning");
    assert_eq!(lines[13], "query error: bad range close:  [1..1");
    assert_eq!(&lines[17..], &["query number: 1", "a", "1"]);
    assert_eq!(fixture.expected_errors().len(), 17);
    assert!(fixture.query_text().starts_with('\n'));
}

#[test]
fn unsorted_key_suite_expects_table_failure() {
    let fixture = unsorted_key().expect("unsorted");

    assert_eq!(fixture.expected_exit_code(), TABLE_ERROR_EXIT_CODE);
    assert_eq!(
        fixture.expected_output_text(),
        "table error: key of row 1 is lesser than previous row\n"
    );
    assert_eq!(fixture.dataset_text(), "a b; 2\n1 2\n1 1\n");
    assert_eq!(fixture.query_text(), "");
    assert_eq!(
        fixture.table().check_key_order(),
        Err(TableError::KeyOrder { row: 1 })
    );
}

#[test]
fn empty_dataset_and_unknown_column_suites() {
    let empty = empty_dataset(1).expect("empty");
    assert_eq!(
        empty.cases()[0].text,
        "select c0, c1 where c0=0, c0=[1..), c1=(..1], c1=2"
    );
    assert_eq!(empty.dataset_text(), "c0 c1; 1\n");
    assert_eq!(empty.expected_output_text(), "query number: 1\nc0 c1\n");

    let unknown = unknown_column().expect("unknown");
    assert_eq!(
        unknown.expected_output_text(),
        "query error: unknown column name: b\n"
    );
}

#[test]
fn plan_text_renders_full_trace_when_known() {
    let fixture = multicolumn(&[ColumnSpec::new(1, 0), ColumnSpec::new(0, 1)], 2)
        .expect("multicolumn");
    let trace = fixture.expected_trace().expect("trace");

    assert!(matches!(trace.events()[0], PlanEvent::RangeScan { .. }));
    assert_eq!(
        fixture.expected_plan_text(),
        "plan: Range scan for column: c0 rows: <0..2>\n\
         plan: Range scan for column: c1 rows: <0..1>\n\
         plan: Range scan result: (first_remaining_column=2, rows=<0..1>)\n\
         plan: Full scan result: 2\n"
    );
}

#[test]
fn fixture_names_round_trip_to_generators() {
    for raw in ["fullscan.3.4.2", "intervals.0", "intervals.1.reversed"] {
        let name = FixtureName::parse(raw).expect("name");
        assert_eq!(name.to_string(), raw);
        assert_eq!(name.generate().expect("fixture").name(), raw);
    }
}

#[test]
fn fixture_name_errors() {
    assert_eq!(
        FixtureName::parse("fullscan.3.4"),
        Err(FixtureNameError::Arity {
            name: "fullscan.3.4".to_string(),
            expected: 3,
            found: 2
        })
    );
    assert_eq!(
        FixtureName::parse("fullscan.3.x.1"),
        Err(FixtureNameError::BadArgument {
            name: "fullscan.3.x.1".to_string(),
            argument: "x".to_string()
        })
    );
    assert_eq!(
        FixtureName::parse("my_case"),
        Err(FixtureNameError::UnknownGenerator("my_case".to_string()))
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fullscan_is_reproducible(columns in 1usize..4, max_value in 1i64..5, key_len in 0usize..4) {
        prop_assume!(key_len <= columns);
        let first = fullscan(columns, max_value, key_len).expect("fullscan");
        let second = fullscan(columns, max_value, key_len).expect("fullscan");

        prop_assert_eq!(first.dataset_text(), second.dataset_text());
        prop_assert_eq!(first.query_text(), second.query_text());
        prop_assert_eq!(first.expected_output_text(), second.expected_output_text());
        prop_assert_eq!(first.expected_plan_text(), second.expected_plan_text());
    }

    #[test]
    fn multicolumn_plan_matches_exactness(
        specs in prop::collection::vec((0usize..3, 0usize..2), 1..4),
        key_len in 0usize..4,
    ) {
        let specs: Vec<ColumnSpec> = specs
            .into_iter()
            .map(|(e, n)| ColumnSpec::new(e, n))
            .collect();
        prop_assume!(key_len <= specs.len());
        let fixture = multicolumn(&specs, key_len).expect("multicolumn");

        let expected = specs[..key_len]
            .iter()
            .position(|spec| spec.exact + spec.nonexact > 1 || spec.nonexact == 1)
            .map_or(key_len, |column| column + 1);

        prop_assert_eq!(fixture.expected_markers(), Some(vec![expected]));
    }
}
