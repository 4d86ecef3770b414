use crate::{
    generate::{Fixture, FixtureError, QueryCase, check_shape},
    predicate::Predicate,
    query::{Query, ResultBlock},
    table::Table,
};

const COLUMN: &str = "c";

// single-column data set: 2..=9
const DATA: [i64; 8] = [2, 3, 4, 5, 6, 7, 8, 9];

const SINGLES: [(&str, &[i64], &str); 11] = [
    (
        "[3..)",
        &[3, 4, 5, 6, 7, 8, 9],
        "left closed, right unbounded",
    ),
    ("(..7]", &[2, 3, 4, 5, 6, 7], "right closed, left unbounded"),
    ("(3..7]", &[4, 5, 6, 7], "left open, right closed"),
    ("[3..7)", &[3, 4, 5, 6], "left closed, right open"),
    ("(3..7)", &[4, 5, 6], "both open"),
    ("[3..7]", &[3, 4, 5, 6, 7], "both closed"),
    ("[3..3]", &[3], "degenerate point"),
    ("3", &[3], "bare value"),
    ("(..)", &[2, 3, 4, 5, 6, 7, 8, 9], "unbounded"),
    ("[2..2)", &[], "empty after normalization"),
    ("[5..2]", &[], "reversed bounds"),
];

const DATA_RELATIVE: [(&str, &[i64], &str); 5] = [
    ("[5..12)", &[5, 6, 7, 8, 9], "past the upper data bound"),
    ("[0..5)", &[2, 3, 4], "below the lower data bound"),
    (
        "[0..12)",
        &[2, 3, 4, 5, 6, 7, 8, 9],
        "past both data bounds",
    ),
    ("[10..12)", &[], "entirely above the data"),
    ("[0..2)", &[], "entirely below the data"),
];

const PAIRS: [([&str; 2], &[i64], &str); 7] = [
    (["[3..5]", "[7..9]"], &[3, 4, 5, 7, 8, 9], "disjoint"),
    (["[3..5]", "[4..6]"], &[3, 4, 5, 6], "overlap of two"),
    (["[3..4]", "[4..6]"], &[3, 4, 5, 6], "overlap of one"),
    (["[3..7)", "(4..6]"], &[3, 4, 5, 6], "nested"),
    (
        ["[3..5]", "(5..7]"],
        &[3, 4, 5, 6, 7],
        "shared edge, closed then open",
    ),
    (
        ["[3..5)", "[5..7]"],
        &[3, 4, 5, 6, 7],
        "shared edge, open then closed",
    ),
    (
        ["[3..5)", "(5..7]"],
        &[3, 4, 6, 7],
        "shared edge, both open",
    ),
];

/// Curated single-interval and two-interval queries over `c = 2..=9`.
///
/// Expected values are the literals above, never re-derived from the
/// interval algebra. With `reversed_pairs` every OR pair is written in the
/// opposite order, which must not change the answer.
pub fn interval_battery(key_len: usize, reversed_pairs: bool) -> Result<Fixture, FixtureError> {
    check_shape(1, key_len)?;
    let table = Table::from_values(&[COLUMN], key_len, DATA.map(|value| vec![value]))?;

    let singles = SINGLES
        .iter()
        .chain(DATA_RELATIVE.iter())
        .map(|(literal, expected, label)| case(&table, label, &[*literal], expected));
    let pairs = PAIRS.iter().map(|(literals, expected, label)| {
        let mut literals = *literals;
        if reversed_pairs {
            literals.reverse();
        }
        case(&table, label, &literals, expected)
    });
    let cases = singles.chain(pairs).collect::<Result<Vec<_>, _>>()?;

    let name = if reversed_pairs {
        format!("intervals.{key_len}.reversed")
    } else {
        format!("intervals.{key_len}")
    };

    Ok(Fixture::new(name, table, cases))
}

fn case(
    table: &Table,
    label: &str,
    literals: &[&str],
    expected: &[i64],
) -> Result<QueryCase, FixtureError> {
    let query = Query::select(&[COLUMN]).with_predicate(COLUMN, Predicate::parse_all(literals)?)?;
    let block = ResultBlock::new(
        vec![COLUMN.to_string()],
        expected.iter().map(|value| vec![*value]).collect(),
    );

    QueryCase::literal(label, table, &query, block)
}
