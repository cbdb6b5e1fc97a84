//! The sparse, unbounded tape of an a-machine.

use crate::types::BLANK_SYMBOL;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cells indexed by signed integers. A missing cell is blank; the blank symbol is
/// never stored, so writing it removes the cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tape {
    cells: BTreeMap<i64, String>,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tape from contiguous symbols starting at index 0, skipping blanks.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_cells((0..).zip(symbols))
    }

    /// Builds a tape from explicit `(index, symbol)` cells, skipping blanks.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let mut tape = Self::new();
        for (index, symbol) in cells {
            tape.write(index, symbol);
        }
        tape
    }

    /// The symbol at `index`, or `"None"` when the cell is blank.
    pub fn get(&self, index: i64) -> &str {
        self.cells.get(&index).map_or(BLANK_SYMBOL, String::as_str)
    }

    /// Prints `symbol` at `index`. Printing `"None"` erases the cell.
    pub fn write(&mut self, index: i64, symbol: impl Into<String>) {
        let symbol = symbol.into();
        if symbol == BLANK_SYMBOL {
            self.erase(index);
        } else {
            self.cells.insert(index, symbol);
        }
    }

    pub fn erase(&mut self, index: i64) {
        self.cells.remove(&index);
    }

    /// Lowest and highest written indices.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let (&first, _) = self.cells.first_key_value()?;
        let (&last, _) = self.cells.last_key_value()?;
        Some((first, last))
    }

    pub fn cells(&self) -> &BTreeMap<i64, String> {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl fmt::Display for Tape {
    /// Symbols from the lowest to the highest written index, blanks shown as `None`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, last)) = self.bounds() else {
            return Ok(());
        };
        for index in first..=last {
            if index > first {
                f.write_str(" ")?;
            }
            f.write_str(self.get(index))?;
        }
        Ok(())
    }
}

impl From<BTreeMap<i64, String>> for Tape {
    fn from(cells: BTreeMap<i64, String>) -> Self {
        Self::from_cells(cells)
    }
}

impl From<Tape> for BTreeMap<i64, String> {
    fn from(tape: Tape) -> Self {
        tape.cells
    }
}
