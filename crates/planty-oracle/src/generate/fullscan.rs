use crate::{
    generate::{Fixture, FixtureError, QueryCase, cartesian, check_shape},
    interval::Interval,
    query::Query,
    table::{Table, column_names},
};
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

/// Seed of the row shuffle; fixed so fixtures are reproducible.
pub const FULLSCAN_SEED: u64 = 13;

/// Every combination of `columns` values over `[0, max_value)`, shuffled,
/// then stable-sorted by the key prefix.
///
/// The single query selects all columns with `c{i}=(..limit]`, where
/// `limit = (max_value / 2 + i) mod max_value`.
pub fn fullscan(columns: usize, max_value: i64, key_len: usize) -> Result<Fixture, FixtureError> {
    check_shape(columns, key_len)?;
    if max_value <= 0 {
        return Err(FixtureError::EmptyValueRange);
    }

    let domains = vec![(0..max_value).collect::<Vec<_>>(); columns];
    let mut rows = cartesian(&domains)?;
    let mut rng = ChaCha8Rng::seed_from_u64(FULLSCAN_SEED);
    rows.shuffle(&mut rng);

    let names = column_names(columns);
    let table = Table::from_values(&names, key_len, rows)?.sorted_by_key();

    let mut query = Query::select(&names);
    for (offset, name) in (0_i64..).zip(&names) {
        let limit = (max_value / 2 + offset) % max_value;
        query = query.with_predicate(name, Interval::at_most(limit).into())?;
    }

    let case = QueryCase::evaluate("fullscan", &table, &query)?;

    Ok(Fixture::new(
        format!("fullscan.{columns}.{max_value}.{key_len}"),
        table,
        vec![case],
    ))
}
