use std::fmt::Display;

use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// A dense matrix of reals, stored row by row.
///
/// The only way to build one is [`Matrix::from_rows`], which guarantees that
/// `data.len() == rows` and that every row has `columns` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows:    usize,
    columns: usize,
    data:    Vec<Vec<f64>>,
}

impl Matrix {
    /// Builds a matrix from its rows.
    ///
    /// # Errors
    /// Returns `MalformedMatrix` if the rows do not all have the same length.
    ///
    /// # Example
    /// ```
    /// use algebrist::{error::RuntimeError, interpreter::value::matrix::Matrix};
    ///
    /// let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 0).unwrap();
    /// assert_eq!((m.rows(), m.columns()), (2, 2));
    ///
    /// let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]], 7).unwrap_err();
    /// assert!(matches!(err, RuntimeError::MalformedMatrix { pos: 7, .. }));
    /// ```
    pub fn from_rows(data: Vec<Vec<f64>>, pos: usize) -> EvalResult<Self> {
        let rows = data.len();
        let columns = data.first().map_or(0, Vec::len);

        if let Some((index, row)) = data.iter().enumerate().find(|(_, row)| row.len() != columns) {
            return Err(RuntimeError::MalformedMatrix { details: format!("row {index} has {} entries but the first row has {columns}",
                                                                        row.len()),
                                                       pos });
        }

        Ok(Self { rows, columns, data })
    }
    /// The number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }
    /// The number of columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }
    /// The rows of the matrix.
    #[must_use]
    pub fn row_slices(&self) -> &[Vec<f64>] {
        &self.data
    }
    /// Iterates over all entries in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().flatten().copied()
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "matrix(")?;
        for (index, row) in self.data.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{x}")?;
            }
            write!(f, "]")?;
        }
        write!(f, ")")
    }
}
