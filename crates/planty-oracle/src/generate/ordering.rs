use crate::{
    generate::{Fixture, FixtureError, QueryCase, cartesian},
    predicate::Predicate,
    query::{Query, ResultBlock},
    table::{Table, column_names},
};

/// Unkeyed tables whose rows are out of value order. The engine must answer
/// in table order, never in value order.
pub fn output_ordering() -> Result<Vec<Fixture>, FixtureError> {
    let single = fixture(
        "ordering.single_column",
        [7, 3, 5, 1, 2, 6, 4].map(|value| vec![value]).to_vec(),
        &["[2..6]"],
        vec![vec![3], vec![5], vec![2], vec![6], vec![4]],
    )?;
    let double = fixture(
        "ordering.two_columns",
        cartesian(&[vec![3, 1, 4, 2], vec![1, 3, 2, 4]])?,
        &["[2..3]", "[1..3]"],
        vec![
            vec![3, 1],
            vec![3, 3],
            vec![3, 2],
            vec![2, 1],
            vec![2, 3],
            vec![2, 2],
        ],
    )?;

    Ok(vec![single, double])
}

fn fixture(
    name: &str,
    rows: Vec<Vec<i64>>,
    literals: &[&str],
    expected: Vec<Vec<i64>>,
) -> Result<Fixture, FixtureError> {
    let names = column_names(literals.len());
    let table = Table::from_values(&names, 0, rows)?;

    let mut query = Query::select(&names);
    for (name, literal) in names.iter().zip(literals) {
        query = query.with_predicate(name, Predicate::parse_all(&[*literal])?)?;
    }

    let block = ResultBlock::new(names.clone(), expected);
    let case = QueryCase::literal(name, &table, &query, block)?;

    Ok(Fixture::new(name, table, vec![case]))
}
