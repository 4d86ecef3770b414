use crate::{
    generate::{Fixture, FixtureError, QueryCase, cartesian, check_shape},
    interval::Interval,
    predicate::Predicate,
    query::{Query, ResultBlock},
    table::{Table, column_names},
};

///
/// ColumnSpec
///
/// Number of exact (`[v..v]`) and non-exact (`[v..v+1]`) OR alternatives
/// placed on one column.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ColumnSpec {
    pub exact: usize,
    pub nonexact: usize,
}

impl ColumnSpec {
    #[must_use]
    pub const fn new(exact: usize, nonexact: usize) -> Self {
        Self { exact, nonexact }
    }

    const fn is_unconstrained(self) -> bool {
        self.exact == 0 && self.nonexact == 0
    }
}

///
/// ColumnLayout
///
/// Generated domain of one column: every value in order, the subset the
/// predicate selects, and the predicate alternatives.
///

struct ColumnLayout {
    domain: Vec<i64>,
    matched: Vec<i64>,
    intervals: Vec<Interval>,
}

impl ColumnLayout {
    // exact segments first, then non-exact; each is followed by one gap value
    fn build(spec: ColumnSpec) -> Self {
        if spec.is_unconstrained() {
            return Self {
                domain: vec![0, 1],
                matched: vec![0, 1],
                intervals: Vec::new(),
            };
        }

        let mut next = 0_i64;
        let mut matched = Vec::new();
        let mut intervals = Vec::new();
        for _ in 0..spec.exact {
            matched.push(next);
            intervals.push(Interval::exact(next));
            next += 2;
        }
        for _ in 0..spec.nonexact {
            matched.extend([next, next + 1]);
            intervals.push(Interval::closed(next, next + 1));
            next += 3;
        }

        Self {
            domain: (0..next).collect(),
            matched,
            intervals,
        }
    }
}

/// Key-prefix-respecting table whose rows are the Cartesian product of the
/// per-column layouts, queried with one OR-predicate per constrained column.
///
/// Expected rows are the Cartesian product of the matched values of each
/// column, derived from the layout rather than by filtering the table.
pub fn multicolumn(columns: &[ColumnSpec], key_len: usize) -> Result<Fixture, FixtureError> {
    check_shape(columns.len(), key_len)?;

    let layouts: Vec<ColumnLayout> = columns.iter().copied().map(ColumnLayout::build).collect();
    let domains: Vec<Vec<i64>> = layouts.iter().map(|l| l.domain.clone()).collect();
    let matched: Vec<Vec<i64>> = layouts.iter().map(|l| l.matched.clone()).collect();

    let names = column_names(columns.len());
    let table = Table::from_values(&names, key_len, cartesian(&domains)?)?;

    let mut query = Query::select(&names);
    for (name, layout) in names.iter().zip(layouts) {
        if !layout.intervals.is_empty() {
            query = query.with_predicate(name, Predicate::new(layout.intervals)?)?;
        }
    }

    let block = ResultBlock::new(names.clone(), cartesian(&matched)?);
    let case = QueryCase::literal("multicolumn", &table, &query, block)?;

    Ok(Fixture::new(fixture_name(columns, key_len), table, vec![case]))
}

// multicolumn.<exact>-<nonexact>_<exact>-<nonexact>.<key_len>
fn fixture_name(columns: &[ColumnSpec], key_len: usize) -> String {
    let specs: Vec<String> = columns
        .iter()
        .map(|spec| format!("{}-{}", spec.exact, spec.nonexact))
        .collect();

    format!("multicolumn.{}.{key_len}", specs.join("_"))
}
