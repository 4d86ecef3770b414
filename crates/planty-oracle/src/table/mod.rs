//! In-memory dataset: column names, key prefix length, and ordered rows.
//!
//! Tables are built unchecked with respect to key ordering so that
//! deliberately broken datasets can still be rendered for the engine.
//! Generators restore the ordering with [`Table::sorted_by_key`].

#[cfg(test)]
mod tests;

use derive_more::Deref;
use std::fmt::Write as _;
use thiserror::Error as ThisError;

///
/// TableError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TableError {
    #[error("table needs at least one column")]
    NoColumns,

    #[error("key length {key_len} exceeds column count {columns}")]
    KeyTooLong { key_len: usize, columns: usize },

    #[error("row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("key of row {row} is lesser than previous row")]
    KeyOrder { row: usize },
}

///
/// Row
///
/// One tuple of column values in declaration order.
///

#[derive(Clone, Debug, Deref, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Row(Vec<i64>);

impl Row {
    #[must_use]
    pub const fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[i64] {
        &self.0
    }

    /// First `key_len` values; the whole row when `key_len` exceeds it.
    #[must_use]
    pub fn key(&self, key_len: usize) -> &[i64] {
        &self.0[..key_len.min(self.0.len())]
    }
}

impl From<Vec<i64>> for Row {
    fn from(values: Vec<i64>) -> Self {
        Self(values)
    }
}

///
/// Table
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    key_len: usize,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, checking shape but not key ordering.
    pub fn new(columns: Vec<String>, key_len: usize, rows: Vec<Row>) -> Result<Self, TableError> {
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }
        if key_len > columns.len() {
            return Err(TableError::KeyTooLong {
                key_len,
                columns: columns.len(),
            });
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns.len() {
                return Err(TableError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
        }

        Ok(Self {
            columns,
            key_len,
            rows,
        })
    }

    /// Convenience constructor over raw value tuples.
    pub fn from_values<S: AsRef<str>>(
        columns: &[S],
        key_len: usize,
        rows: impl IntoIterator<Item = Vec<i64>>,
    ) -> Result<Self, TableError> {
        let columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let rows = rows.into_iter().map(Row::new).collect();

        Self::new(columns, key_len, rows)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub const fn key_len(&self) -> usize {
        self.key_len
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Stable-sort rows by the key prefix; rows with equal keys keep their
    /// current relative order.
    #[must_use]
    pub fn sorted_by_key(mut self) -> Self {
        if self.key_len > 0 {
            let key_len = self.key_len;
            self.rows.sort_by(|a, b| a.key(key_len).cmp(b.key(key_len)));
        }

        self
    }

    /// Verify the key-prefix ordering invariant.
    ///
    /// Reports the first row (zero-based) whose key is lesser than its
    /// predecessor's, matching the engine's table-level error.
    pub fn check_key_order(&self) -> Result<(), TableError> {
        if self.key_len == 0 {
            return Ok(());
        }

        let violation = self
            .rows
            .windows(2)
            .position(|pair| pair[1].key(self.key_len) < pair[0].key(self.key_len));

        match violation {
            Some(previous) => Err(TableError::KeyOrder { row: previous + 1 }),
            None => Ok(()),
        }
    }

    /// Dataset file text: `c0 c1; <key_len>` then one line per row.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{}; {}\n", self.columns.join(" "), self.key_len);
        for row in &self.rows {
            out.push_str(&join_values(row.values()));
            out.push('\n');
        }

        out
    }
}

/// Space-separated integers, the row format shared by datasets and results.
#[must_use]
pub fn join_values(values: &[i64]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{value}");
    }

    out
}

/// Names `c0..c{n-1}` used by every generated table.
#[must_use]
pub fn column_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("c{i}")).collect()
}
