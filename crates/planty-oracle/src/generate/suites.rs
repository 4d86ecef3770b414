//! Literal regression suites: hand-written datasets and queries whose
//! expected output is stated verbatim, including the engine's exact error
//! texts.

use crate::{
    QUERY_ERROR_PREFIX,
    generate::{Fixture, FixtureError, QueryCase, check_shape},
    predicate::Predicate,
    query::{Query, ResultBlock},
    table::Table,
};

/// Exit code of a fatal table-level error.
pub const TABLE_ERROR_EXIT_CODE: i32 = 26;

/// Prefix of the single line printed for a table-level error.
pub const TABLE_ERROR_PREFIX: &str = "table error:";

// query text -> expected error reason
const SYNTAX_ERRORS: [(&str, &str); 17] = [
    ("", "no select at the beginning"),
    ("select a, where b=1", "unknown column name: where"),
    ("select a,", "no comma after select list"),
    (
        "select a b where a=1",
        "something else than 'where' after select list: b",
    ),
    (
        "select a b",
        "something else than 'where' after select list: b",
    ),
    ("select where a=1", "unknown column name: where"),
    ("select", "select list empty"),
    ("select a where a=1,", "no comma after where list"),
    (
        "select a where a=1 b=1",
        "there's something after 'where': b=1",
    ),
    ("select a where", "where list empty"),
    ("select a where a=", "Error during converting to integer:"),
    (
        "select a where a=b",
        "Error during converting to integer: b",
    ),
    ("select a where =[..1)", "unknown column name:"),
    ("select a where a=[1..1", "bad range close:  [1..1"),
    ("select a where a=1..1]", "bad range open:  1..1]"),
    (
        "select a where a=[1-1]",
        "Error during converting to integer: [1-1]",
    ),
    (
        "select a where a=[a..2]",
        "Error during converting to integer: a",
    ),
];

const SPACED_QUERY: &str = "select   a     where        a=1     ";

fn rows_case(label: &str, text: &str, header: &[&str], rows: &[&[i64]]) -> QueryCase {
    let block = ResultBlock::new(
        header.iter().map(ToString::to_string).collect(),
        rows.iter().map(|row| row.to_vec()).collect(),
    );

    QueryCase::rows(label, text, block)
}

/// `select a`, `select b, a`, `select *`, `select *, a` over one row.
pub fn projection() -> Result<Fixture, FixtureError> {
    let table = Table::from_values(&["a", "b", "c"], 0, vec![vec![1, 2, 3]])?;
    let cases = vec![
        rows_case("single column", "select a", &["a"], &[&[1]]),
        rows_case("reordered", "select b, a", &["b", "a"], &[&[2, 1]]),
        rows_case("star", "select *", &["a", "b", "c"], &[&[1, 2, 3]]),
        rows_case(
            "star and repeat",
            "select *, a",
            &["a", "b", "c", "a"],
            &[&[1, 2, 3, 1]],
        ),
    ];

    Ok(Fixture::new("golden.projection", table, cases))
}

/// A query without a where clause returns every row.
pub fn no_where() -> Result<Fixture, FixtureError> {
    let table = Table::from_values(&["a"], 0, vec![vec![1]])?;
    let cases = vec![rows_case("no where", "select a", &["a"], &[&[1]])];

    Ok(Fixture::new("golden.no_where", table, cases))
}

/// Header-only dataset queried with OR predicates on both columns.
pub fn empty_dataset(key_len: usize) -> Result<Fixture, FixtureError> {
    check_shape(2, key_len)?;
    let table = Table::from_values(&["c0", "c1"], key_len, Vec::new())?;
    let query = Query::select(&["c0", "c1"])
        .with_predicate("c0", Predicate::parse_all(&["0", "[1..)"])?)?
        .with_predicate("c1", Predicate::parse_all(&["(..1]", "2"])?)?;
    let block = ResultBlock::new(vec!["c0".to_string(), "c1".to_string()], Vec::new());
    let case = QueryCase::literal("empty dataset", &table, &query, block)?;

    Ok(Fixture::new(format!("golden.empty_dataset.{key_len}"), table, vec![case]))
}

/// Selecting a column the table does not have.
pub fn unknown_column() -> Result<Fixture, FixtureError> {
    let table = Table::from_values(&["a"], 0, Vec::new())?;
    let cases = vec![QueryCase::error(
        "unknown column",
        "select b",
        format!("{QUERY_ERROR_PREFIX} unknown column name: b"),
    )];

    Ok(Fixture::new("golden.unknown_column", table, cases))
}

/// Every malformed query the parser rejects, then one valid query with
/// irregular spacing.
pub fn syntax_errors() -> Result<Fixture, FixtureError> {
    let table = Table::from_values(&["a", "b"], 2, vec![vec![1, 2]])?;
    let mut cases: Vec<QueryCase> = SYNTAX_ERRORS
        .iter()
        .map(|(text, reason)| {
            QueryCase::error(*text, *text, format!("{QUERY_ERROR_PREFIX} {reason}"))
        })
        .collect();
    cases.push(rows_case("irregular spacing", SPACED_QUERY, &["a"], &[&[1]]));

    Ok(Fixture::new("golden.syntax_errors", table, cases))
}

/// Key-ordered table whose second row breaks the ordering. The engine must
/// refuse the dataset before reading any query.
pub fn unsorted_key() -> Result<Fixture, FixtureError> {
    let table = Table::from_values(&["a", "b"], 2, vec![vec![1, 2], vec![1, 1]])?;
    let Err(violation) = table.check_key_order() else {
        return Err(FixtureError::KeyAlreadyOrdered);
    };
    let line = format!("{TABLE_ERROR_PREFIX} {violation}");

    Ok(Fixture::new("golden.unsorted_key", table, Vec::new())
        .with_failure(TABLE_ERROR_EXIT_CODE, line))
}
