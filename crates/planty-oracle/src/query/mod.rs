//! Query value object: projection plus a conjunction of column predicates.
//!
//! Evaluation is brute force on purpose. Every row is checked against every
//! predicate and survivors keep table order; this is the ground truth the
//! engine's narrowing scans are checked against.


use crate::{predicate::Predicate, table::Table};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// QueryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("column '{0}' has more than one predicate")]
    DuplicatePredicate(String),

    #[error("unknown column name: {0}")]
    UnknownColumn(String),
}

///
/// Projection
///
/// One item of the select list. `All` expands to every table column in
/// declaration order.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Projection {
    Column(String),
    All,
}

impl Projection {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    fn render(&self) -> &str {
        match self {
            Self::Column(name) => name,
            Self::All => "*",
        }
    }
}

///
/// ResultBlock
///
/// Header plus rows for one query, as the engine prints them.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<i64>>,
}

impl ResultBlock {
    #[must_use]
    pub const fn new(header: Vec<String>, rows: Vec<Vec<i64>>) -> Self {
        Self { header, rows }
    }
}

///
/// Query
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Query {
    projection: Vec<Projection>,
    predicates: Vec<(String, Predicate)>,
}

impl Query {
    /// Build a query, rejecting a column that carries two predicates.
    pub fn new(
        projection: Vec<Projection>,
        predicates: Vec<(String, Predicate)>,
    ) -> Result<Self, QueryError> {
        let mut seen = BTreeSet::new();
        for (column, _) in &predicates {
            if !seen.insert(column.as_str()) {
                return Err(QueryError::DuplicatePredicate(column.clone()));
            }
        }

        Ok(Self {
            projection,
            predicates,
        })
    }

    /// Select the named columns with no filter.
    #[must_use]
    pub fn select<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            projection: columns
                .iter()
                .map(|c| Projection::column(c.as_ref()))
                .collect(),
            predicates: Vec::new(),
        }
    }

    /// Add one predicate to the conjunction.
    pub fn with_predicate(
        mut self,
        column: impl Into<String>,
        predicate: Predicate,
    ) -> Result<Self, QueryError> {
        let column = column.into();
        if self.predicate(&column).is_some() {
            return Err(QueryError::DuplicatePredicate(column));
        }
        self.predicates.push((column, predicate));

        Ok(self)
    }

    #[must_use]
    pub fn projection(&self) -> &[Projection] {
        &self.projection
    }

    #[must_use]
    pub fn predicates(&self) -> &[(String, Predicate)] {
        &self.predicates
    }

    #[must_use]
    pub fn predicate(&self, column: &str) -> Option<&Predicate> {
        self.predicates
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, predicate)| predicate)
    }

    /// Query-language text, one line without terminator.
    ///
    /// `select a, b where a=[1..2), a=5, b=(..3]`; an empty projection
    /// renders as a bare `select`.
    #[must_use]
    pub fn render(&self) -> String {
        if self.projection.is_empty() {
            return "select".to_string();
        }

        let columns: Vec<&str> = self.projection.iter().map(Projection::render).collect();
        let mut text = format!("select {}", columns.join(", "));
        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self
                .predicates
                .iter()
                .map(|(column, predicate)| predicate.render(column))
                .collect();
            text.push_str(" where ");
            text.push_str(&clauses.join(", "));
        }

        text
    }

    /// Per-column predicates in table column order; `None` = unconstrained.
    pub fn column_predicates<'a>(
        &'a self,
        table: &Table,
    ) -> Result<Vec<Option<&'a Predicate>>, QueryError> {
        let mut slots = vec![None; table.columns().len()];
        for (column, predicate) in &self.predicates {
            let index = table
                .column_index(column)
                .ok_or_else(|| QueryError::UnknownColumn(column.clone()))?;
            slots[index] = Some(predicate);
        }

        Ok(slots)
    }

    /// Resolve the projection to column indexes, expanding `*`.
    pub fn projected_columns(&self, table: &Table) -> Result<Vec<usize>, QueryError> {
        let mut indexes = Vec::new();
        for item in &self.projection {
            match item {
                Projection::All => indexes.extend(0..table.columns().len()),
                Projection::Column(name) => indexes.push(
                    table
                        .column_index(name)
                        .ok_or_else(|| QueryError::UnknownColumn(name.clone()))?,
                ),
            }
        }

        Ok(indexes)
    }

    /// Indexes of the rows that satisfy every predicate, in table order.
    pub fn matching_rows(&self, table: &Table) -> Result<Vec<usize>, QueryError> {
        let slots = self.column_predicates(table)?;
        let matching = table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                slots
                    .iter()
                    .zip(row.values())
                    .all(|(slot, value)| slot.is_none_or(|p| p.matches(*value)))
            })
            .map(|(index, _)| index)
            .collect();

        Ok(matching)
    }

    /// Brute-force expected output for this query.
    pub fn evaluate(&self, table: &Table) -> Result<ResultBlock, QueryError> {
        let columns = self.projected_columns(table)?;
        let header = columns
            .iter()
            .map(|index| table.columns()[*index].clone())
            .collect();
        let rows = self
            .matching_rows(table)?
            .into_iter()
            .map(|row| {
                let values = table.rows()[row].values();
                columns.iter().map(|index| values[*index]).collect()
            })
            .collect();

        Ok(ResultBlock::new(header, rows))
    }
}
