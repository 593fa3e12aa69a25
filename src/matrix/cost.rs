//! Square cost matrices with explicit missing-data cells

use serde::{Deserialize, Serialize};
use std::fmt;

/// One matrix cell
///
/// A failed call leaves its cells `Pending` instead of zero, so a missing
/// value can never be mistaken for two adjacent locations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Cost {
    /// Measured cost (seconds or meters)
    Known(f64),
    /// The service answered but has no route for the pair
    Unreachable,
    /// Not measured yet, or the call failed
    #[default]
    Pending,
}

impl Cost {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Known(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(v) => write!(f, "{}", v),
            Self::Unreachable => write!(f, "x"),
            Self::Pending => write!(f, "?"),
        }
    }
}

/// Row-major square matrix of [`Cost`] cells with a zero diagonal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMatrix {
    size: usize,
    cells: Vec<Cost>,
}

impl CostMatrix {
    /// A `size` x `size` matrix, all off-diagonal cells pending
    pub fn new(size: usize) -> Self {
        let mut cells = vec![Cost::Pending; size * size];
        for i in 0..size {
            cells[i * size + i] = Cost::Known(0.0);
        }
        Self { size, cells }
    }

    /// Build from dense rows; `None` unless the rows form a square
    pub fn from_rows(rows: Vec<Vec<Cost>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> Cost {
        self.cells[i * self.size + j]
    }

    /// Write `cost` to `[i][j]` and its mirror `[j][i]`
    pub fn set_symmetric(&mut self, i: usize, j: usize, cost: Cost) {
        self.cells[i * self.size + j] = cost;
        self.cells[j * self.size + i] = cost;
    }

    /// Grow to `new_size`, keeping the existing block in the top-left corner
    pub fn grow(&mut self, new_size: usize) {
        if new_size <= self.size {
            return;
        }
        let mut grown = Self::new(new_size);
        for i in 0..self.size {
            let src = &self.cells[i * self.size..(i + 1) * self.size];
            grown.cells[i * new_size..i * new_size + self.size].copy_from_slice(src);
        }
        *self = grown;
    }

    /// Sub-matrix selecting `indices` for both rows and columns, in order
    pub fn gather(&self, indices: &[usize]) -> Self {
        let size = indices.len();
        let mut cells = Vec::with_capacity(size * size);
        for &i in indices {
            for &j in indices {
                cells.push(self.get(i, j));
            }
        }
        Self { size, cells }
    }

    pub fn row(&self, i: usize) -> &[Cost] {
        &self.cells[i * self.size..(i + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cost]> {
        self.cells.chunks(self.size.max(1)).take(self.size)
    }

    /// Numeric rows; non-known cells become `None`
    pub fn to_values(&self) -> Vec<Vec<Option<f64>>> {
        self.rows()
            .map(|row| row.iter().map(Cost::value).collect())
            .collect()
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i + 1..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }

    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.size).all(|i| self.get(i, i) == Cost::Known(0.0))
    }

    /// Upper-triangle pairs whose cell is still pending
    pub fn pending_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.size {
            for j in i + 1..self.size {
                if self.get(i, j).is_pending() {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.cells.len() == self.size * self.size
    }
}
