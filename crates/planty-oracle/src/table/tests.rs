use super::*;

#[test]
fn new_rejects_shape_errors() {
    assert_eq!(
        Table::from_values::<&str>(&[], 0, Vec::new()),
        Err(TableError::NoColumns)
    );
    assert_eq!(
        Table::from_values(&["a"], 2, Vec::new()),
        Err(TableError::KeyTooLong {
            key_len: 2,
            columns: 1
        })
    );
    assert_eq!(
        Table::from_values(&["a", "b"], 0, vec![vec![1, 2], vec![3]]),
        Err(TableError::RowWidth {
            row: 1,
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn render_matches_dataset_file_format() {
    let table = Table::from_values(&["a"], 1, vec![vec![1], vec![2]]).expect("table");

    assert_eq!(table.render(), "a; 1\n1\n2\n");
}

#[test]
fn render_of_empty_table_is_header_only() {
    let table = Table::from_values(&["c0", "c1"], 0, Vec::new()).expect("table");

    assert_eq!(table.render(), "c0 c1; 0\n");
}

#[test]
fn key_order_violation_names_the_offending_row() {
    let table = Table::from_values(&["a", "b"], 2, vec![vec![1, 2], vec![1, 1]]).expect("table");

    assert_eq!(
        table.check_key_order(),
        Err(TableError::KeyOrder { row: 1 })
    );
    assert_eq!(
        TableError::KeyOrder { row: 1 }.to_string(),
        "key of row 1 is lesser than previous row"
    );
}

#[test]
fn key_order_only_considers_the_prefix() {
    let table = Table::from_values(&["a", "b"], 1, vec![vec![1, 2], vec![1, 1], vec![2, 0]])
        .expect("table");

    assert_eq!(table.check_key_order(), Ok(()));
}

#[test]
fn sorted_by_key_is_stable_for_equal_prefixes() {
    let table = Table::from_values(
        &["a", "b"],
        1,
        vec![vec![2, 9], vec![1, 5], vec![2, 1], vec![1, 3]],
    )
    .expect("table")
    .sorted_by_key();

    let rows: Vec<Vec<i64>> = table.rows().iter().map(|r| r.values().to_vec()).collect();

    assert_eq!(rows, vec![vec![1, 5], vec![1, 3], vec![2, 9], vec![2, 1]]);
    assert_eq!(table.check_key_order(), Ok(()));
}

#[test]
fn sorted_by_key_without_key_keeps_order() {
    let rows = vec![vec![3], vec![1], vec![2]];
    let table = Table::from_values(&["a"], 0, rows.clone())
        .expect("table")
        .sorted_by_key();

    let got: Vec<Vec<i64>> = table.rows().iter().map(|r| r.values().to_vec()).collect();
    assert_eq!(got, rows);
}

#[test]
fn generated_column_names_are_indexed() {
    assert_eq!(column_names(3), vec!["c0", "c1", "c2"]);
}
