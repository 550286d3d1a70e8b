// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Data-table value handed to step handlers.

use std::{collections::HashMap, fmt};

use derive_more::{Deref, From};

/// Data table of a step, wrapping its row-major string grid.
///
/// Derived views never mutate the grid: [`Table::col_major()`] is the
/// transpose, [`Table::hashes()`] keys the remaining rows by the header row,
/// and [`Table::columns_hash()`] keys by the first column instead.
#[derive(Clone, Debug, Default, Deref, Eq, From, PartialEq)]
pub struct Table(Vec<Vec<String>>);

impl Table {
    /// Creates a new [`Table`] from the given row-major `grid`.
    #[must_use]
    pub fn new(grid: Vec<Vec<String>>) -> Self {
        Self(grid)
    }

    /// Row-major grid of this [`Table`], as parsed.
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] {
        &self.0
    }

    /// Rows of this [`Table`] without the header row.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.0.split_first().map_or(&[], |(_, rest)| rest)
    }

    /// Column-major view: the transpose of the grid.
    ///
    /// Ragged rows shorter than the first one contribute nothing to the
    /// missing columns.
    #[must_use]
    pub fn col_major(&self) -> Vec<Vec<String>> {
        let width = self.0.first().map_or(0, Vec::len);
        (0..width)
            .map(|i| {
                self.0
                    .iter()
                    .filter_map(|row| row.get(i))
                    .cloned()
                    .collect()
            })
            .collect()
    }

    /// Keys every non-header row by the header row, one record per row.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        Self::objectify(&self.0)
    }

    /// Keys every non-header column by the first column, one record per
    /// column.
    #[must_use]
    pub fn columns_hash(&self) -> Vec<HashMap<String, String>> {
        Self::objectify(&self.col_major())
    }

    /// Converts a two-column grid into a single key → value map.
    ///
    /// `None` if some row doesn't have exactly two cells.
    #[must_use]
    pub fn rows_hash(&self) -> Option<HashMap<String, String>> {
        self.0
            .iter()
            .map(|row| match row.as_slice() {
                [key, value] => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Keys `grid`'s remaining rows by its first row.
    fn objectify(grid: &[Vec<String>]) -> Vec<HashMap<String, String>> {
        let Some((header, rows)) = grid.split_first() else {
            return Vec::new();
        };
        rows.iter()
            .map(|row| {
                header.iter().cloned().zip(row.iter().cloned()).collect()
            })
            .collect()
    }
}

impl From<Vec<Vec<&str>>> for Table {
    fn from(grid: Vec<Vec<&str>>) -> Self {
        Self(
            grid.into_iter()
                .map(|row| row.into_iter().map(String::from).collect())
                .collect(),
        )
    }
}

impl From<&gherkin::Table> for Table {
    fn from(table: &gherkin::Table) -> Self {
        Self(table.rows.clone())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = (0..self.0.first().map_or(0, Vec::len))
            .map(|i| {
                self.0
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(String::len)
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for row in &self.0 {
            f.write_str("|")?;
            for (cell, width) in row.iter().zip(widths.iter().copied()) {
                write!(f, " {cell:width$} |")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
