use crate::{
    generate::{Fixture, FixtureError, QueryCase, cartesian},
    plan::ScanPlan,
    predicate::Predicate,
    query::{Query, ResultBlock},
    table::{Table, column_names},
};

///
/// CatalogEntry
///
/// One literal case: column domains, key length, per-column predicate
/// literals (empty = unconstrained).
///

struct CatalogEntry {
    name: &'static str,
    key_len: usize,
    domains: &'static [&'static [i64]],
    predicates: &'static [&'static [&'static str]],
}

impl CatalogEntry {
    fn table(&self) -> Result<Table, FixtureError> {
        let domains: Vec<Vec<i64>> = self.domains.iter().map(|d| d.to_vec()).collect();
        let names = column_names(domains.len());

        Ok(Table::from_values(&names, self.key_len, cartesian(&domains)?)?)
    }

    fn query(&self, table: &Table) -> Result<Query, FixtureError> {
        let mut query = Query::select(table.columns());
        for (name, literals) in table.columns().iter().zip(self.predicates) {
            if !literals.is_empty() {
                query = query.with_predicate(name, Predicate::parse_all(*literals)?)?;
            }
        }

        Ok(query)
    }
}

// plans are asserted literally
const PLAN_CASES: [(CatalogEntry, &[usize], usize); 3] = [
    (
        CatalogEntry {
            name: "plan.no_rangescan_after_nonexact",
            key_len: 2,
            domains: &[&[0, 1, 2, 3], &[0, 1, 2]],
            predicates: &[&["[1..2]"], &["[1..1]"]],
        },
        &[0],
        1,
    ),
    (
        CatalogEntry {
            name: "plan.no_rangescan_on_non_key_column",
            key_len: 1,
            domains: &[&[0, 1, 2], &[0, 1, 2]],
            predicates: &[&["[1..1]"], &["[1..1]"]],
        },
        &[0],
        1,
    ),
    (
        CatalogEntry {
            name: "plan.rangescan_nonexact_column",
            key_len: 2,
            domains: &[&[0, 1, 2], &[0, 1, 2, 3]],
            predicates: &[&["[1..1]"], &["[1..2]"]],
        },
        &[0, 1],
        2,
    ),
];

// rows are asserted literally, plans are predicted
const RESULT_CASES: [(CatalogEntry, &[&[i64]]); 5] = [
    (
        CatalogEntry {
            name: "result.fullscan_three_levels",
            key_len: 0,
            domains: &[&[2, 0, 1], &[4, 3, 5], &[8, 7, 6]],
            predicates: &[
                &["[0..0]", "[2..2]"],
                &["[3..3]", "[5..5]"],
                &["[6..6]", "[8..8]"],
            ],
        },
        &[
            &[2, 3, 8],
            &[2, 3, 6],
            &[2, 5, 8],
            &[2, 5, 6],
            &[0, 3, 8],
            &[0, 3, 6],
            &[0, 5, 8],
            &[0, 5, 6],
        ],
    ),
    (
        CatalogEntry {
            name: "result.rangescan_three_levels",
            key_len: 3,
            domains: &[&[0, 1, 2], &[3, 4, 5], &[6, 7, 8]],
            predicates: &[
                &["[0..0]", "[2..2]"],
                &["[3..3]", "[5..5]"],
                &["[6..6]", "[8..8]"],
            ],
        },
        &[
            &[0, 3, 6],
            &[0, 3, 8],
            &[0, 5, 6],
            &[0, 5, 8],
            &[2, 3, 6],
            &[2, 3, 8],
            &[2, 5, 6],
            &[2, 5, 8],
        ],
    ),
    (
        CatalogEntry {
            name: "result.rangescan_then_fullscan",
            key_len: 2,
            domains: &[&[0, 1], &[2, 3, 4]],
            predicates: &[&["[0..0]"], &["[3..4]"]],
        },
        &[&[0, 3], &[0, 4]],
    ),
    (
        CatalogEntry {
            name: "result.rangescan_then_rangescan",
            key_len: 2,
            domains: &[&[0, 1], &[2, 3]],
            predicates: &[&["[0..0]"], &["[3..3]"]],
        },
        &[&[0, 3]],
    ),
    (
        CatalogEntry {
            name: "result.rangescan_and_fullscan_in_one_column",
            key_len: 2,
            domains: &[&[0, 1, 2, 3], &[4, 5, 6]],
            predicates: &[&["[0..1]", "[3..3]"], &["[5..6]"]],
        },
        &[&[0, 5], &[0, 6], &[1, 5], &[1, 6], &[3, 5], &[3, 6]],
    ),
];

/// Known-plan cases with literal `first_remaining_column` expectations,
/// followed by the multi-column cases with literal result rows.
pub fn plan_catalog() -> Result<Vec<Fixture>, FixtureError> {
    let mut fixtures = Vec::with_capacity(PLAN_CASES.len() + RESULT_CASES.len());

    for (entry, range_columns, first_remaining_column) in &PLAN_CASES {
        let table = entry.table()?;
        let query = entry.query(&table)?;
        let case = QueryCase::evaluate(entry.name, &table, &query)?.with_plan(ScanPlan {
            range_columns: range_columns.to_vec(),
            first_remaining_column: *first_remaining_column,
        });
        fixtures.push(Fixture::new(entry.name, table, vec![case]));
    }

    for (entry, rows) in &RESULT_CASES {
        let table = entry.table()?;
        let query = entry.query(&table)?;
        let block = ResultBlock::new(
            table.columns().to_vec(),
            rows.iter().map(|row| row.to_vec()).collect(),
        );
        let case = QueryCase::literal(entry.name, &table, &query, block)?;
        fixtures.push(Fixture::new(entry.name, table, vec![case]));
    }

    Ok(fixtures)
}
