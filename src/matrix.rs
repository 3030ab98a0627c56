use std::fmt;

use derive_more::{Display, Error};
use nalgebra::{DMatrix, RowDVector};

use crate::{ArithmeticError, Rational};

/// Augmented coefficient matrix: one row per equation, the last column holds
/// the right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: DMatrix<Rational>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display(
    fmt = "row {} has {} entries, expected {}",
    row,
    found,
    expected
)]
pub struct ShapeError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

impl Matrix {
    pub fn from_rows(rows: Vec<Vec<Rational>>) -> Result<Self, ShapeError> {
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != ncols)
        {
            return Err(ShapeError {
                row,
                expected: ncols,
                found,
            });
        }
        let nrows = rows.len();
        Ok(Self {
            data: DMatrix::from_row_iterator(nrows, ncols, rows.into_iter().flatten()),
        })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Number of variable columns, the right-hand side excluded.
    pub fn variable_count(&self) -> usize {
        self.ncols().saturating_sub(1)
    }

    #[inline]
    pub fn get(&self, row: usize, column: usize) -> &Rational {
        &self.data[(row, column)]
    }

    pub fn rhs(&self, row: usize) -> &Rational {
        self.get(row, self.variable_count())
    }

    pub fn row(&self, row: usize) -> RowDVector<Rational> {
        self.data.row(row).into_owned()
    }

    pub fn is_zero_row(&self, row: usize) -> bool {
        self.data.row(row).iter().all(Rational::is_zero)
    }

    /// Every coefficient is zero; the right-hand side may not be.
    pub fn has_zero_coefficients(&self, row: usize) -> bool {
        (0..self.variable_count()).all(|column| self.get(row, column).is_zero())
    }

    pub fn scale_row(&mut self, row: usize, factor: &Rational) -> Result<(), ArithmeticError> {
        if factor.is_zero() {
            return Err(ArithmeticError::InvalidOperand);
        }
        for column in 0..self.ncols() {
            self.data[(row, column)] = self.data[(row, column)].try_mul(factor)?;
        }
        Ok(())
    }

    /// `target += source * factor`
    pub fn add_scaled_row(
        &mut self,
        target: usize,
        source: usize,
        factor: &Rational,
    ) -> Result<(), ArithmeticError> {
        for column in 0..self.ncols() {
            let addend = self.data[(source, column)].try_mul(factor)?;
            self.data[(target, column)] = self.data[(target, column)].try_add(&addend)?;
        }
        Ok(())
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a != b {
            self.data.swap_rows(a, b);
        }
    }

    pub fn remove_row(&mut self, row: usize) {
        self.data = self.data.clone().remove_row(row);
    }

    /// Restriction to the given variable columns (0-based), followed by the
    /// right-hand side.
    pub fn select_columns(&self, columns: &[usize]) -> Matrix {
        let rhs = self.variable_count();
        Matrix {
            data: DMatrix::from_fn(self.nrows(), columns.len() + 1, |i, j| {
                self.data[(i, columns.get(j).copied().unwrap_or(rhs))].clone()
            }),
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.row_iter() {
            let line = row
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\t");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn integer_matrix(rows: &[&[i64]]) -> Matrix {
    Matrix::from_rows(
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|x| Rational::from_integer(*x).unwrap())
                    .collect()
            })
            .collect(),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::{assert_eq, assert_str_eq};

    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let one = Rational::one;
        assert_eq!(
            Matrix::from_rows(vec![vec![one(), one(), one()], vec![one(), one()]]),
            Err(ShapeError {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn row_operations() {
        let mut matrix = integer_matrix(&[&[2, 4, 6], &[1, 1, 1]]);
        matrix
            .scale_row(0, &Rational::new(1, 2).unwrap())
            .unwrap();
        matrix
            .add_scaled_row(1, 0, &Rational::from_integer(-1).unwrap())
            .unwrap();
        matrix.swap_rows(0, 1);
        assert_str_eq!(matrix.to_string(), "0\t-1\t-2\n1\t2\t3\n");
        assert_eq!(matrix.rhs(1), &Rational::from_integer(3).unwrap());
    }

    #[test]
    fn scaling_by_zero_is_rejected() {
        let mut matrix = integer_matrix(&[&[1, 2]]);
        assert_eq!(
            matrix.scale_row(0, &Rational::zero()),
            Err(ArithmeticError::InvalidOperand)
        );
    }

    #[test]
    fn zero_rows_and_false_equalities() {
        let matrix = integer_matrix(&[&[0, 0, 0], &[0, 0, 5], &[0, 1, 0]]);
        assert!(matrix.is_zero_row(0));
        assert!(!matrix.is_zero_row(1));
        assert!(matrix.has_zero_coefficients(1));
        assert!(!matrix.has_zero_coefficients(2));
    }

    #[test]
    fn column_selection_keeps_rhs() {
        let matrix = integer_matrix(&[&[1, 2, 3, 10], &[4, 5, 6, 20]]);
        assert_str_eq!(matrix.select_columns(&[2, 0]).to_string(), "3\t1\t10\n6\t4\t20\n");
    }

    #[test]
    fn remove_row_keeps_order() {
        let mut matrix = integer_matrix(&[&[1, 1], &[2, 2], &[3, 3]]);
        matrix.remove_row(1);
        assert_str_eq!(matrix.to_string(), "1\t1\n3\t3\n");
    }
}
