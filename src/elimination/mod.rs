//! Gauss-Jordan elimination over exact rationals.
//!
//! [`process`] reduces an augmented matrix and expresses every basic variable
//! through the free ones. [`find_basic_solutions`] enumerates all bases of a
//! given size by brute force and keeps the candidates that satisfy the
//! original system exactly.


use std::{
    collections::{btree_map, BTreeMap, BTreeSet},
    fmt,
};

use derive_more::{Display, Error};
use derive_new::new;
use itertools::Itertools;
use nalgebra::RowDVector;
use serde::Serialize;

use crate::{helpers::fmt_linear, matrix::Matrix, ArithmeticError, Rational};

/// `x_basic = c_0 + Σ c_j x_j` for every basic variable; free index 0 is the
/// constant term. Variable indices are 1-based.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BasicVariableExpression(BTreeMap<usize, BTreeMap<usize, Rational>>);

#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum EliminationError {
    /// `row` is the 0-based index of the equation in the input matrix.
    #[display(fmt = "the system is inconsistent: equation {} reduces to 0 = {}", row, rhs)]
    Infeasible { row: usize, rhs: Rational },
    #[display(
        fmt = "{} variables requested, but the matrix only has {}",
        found,
        expected
    )]
    VariableCount { expected: usize, found: usize },
    #[display(fmt = "{}", _0)]
    Arithmetic(#[error(source)] ArithmeticError),
}

impl From<ArithmeticError> for EliminationError {
    fn from(err: ArithmeticError) -> Self {
        Self::Arithmetic(err)
    }
}

/// Result of a full elimination pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Reduced matrix without the redundant rows.
    pub matrix: Matrix,
    /// Basic variable of every row of `matrix`.
    pub basis: Vec<usize>,
    /// Number of all-zero rows dropped.
    pub discarded: usize,
    pub expression: BasicVariableExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct BasicSolution {
    pub basis: Vec<usize>,
    pub values: RowDVector<Rational>,
}

pub fn process(
    matrix: &Matrix,
    variable_count: usize,
) -> Result<BasicVariableExpression, EliminationError> {
    reduce(matrix, variable_count).map(|reduction| reduction.expression)
}

/// Pivots on the first `variable_count` columns, largest magnitude first.
/// Rows left over afterwards are either dropped as redundant, rejected as
/// false equalities, or pivoted on their first non-zero trailing column.
pub fn reduce(matrix: &Matrix, variable_count: usize) -> Result<Reduction, EliminationError> {
    let n = matrix.variable_count();
    if variable_count > n {
        return Err(EliminationError::VariableCount {
            expected: n,
            found: variable_count,
        });
    }

    let mut matrix = matrix.clone();
    // input index of every current row
    let mut origin = (0..matrix.nrows()).collect::<Vec<_>>();
    let mut basis = Vec::with_capacity(matrix.nrows());
    for column in 0..variable_count {
        let next = basis.len();
        if next == matrix.nrows() {
            break;
        }
        let Some(pivot_row) = find_pivot_row(&matrix, next, column) else {
            log::debug!("x{} has no pivot and stays free", column + 1);
            continue;
        };
        matrix.swap_rows(next, pivot_row);
        origin.swap(next, pivot_row);
        eliminate(&mut matrix, next, column)?;
        basis.push(column + 1);
    }

    let discarded = delete_zero_rows(&mut matrix, &mut origin, basis.len());
    check_false_equalities(&matrix, &origin, basis.len())?;

    for row in basis.len()..matrix.nrows() {
        if let Some(column) = (variable_count..n).find(|&c| !matrix.get(row, c).is_zero()) {
            eliminate(&mut matrix, row, column)?;
            basis.push(column + 1);
        }
    }
    log::debug!("Reduced matrix:\n{matrix}");

    let basic = basis.iter().copied().collect::<BTreeSet<_>>();
    let expression: BTreeMap<_, _> = basis
        .iter()
        .enumerate()
        .map(|(row, &variable)| {
            let coefficients = std::iter::once((0, matrix.rhs(row).clone()))
                .chain(
                    (1..=n)
                        .filter(|free| !basic.contains(free))
                        .map(|free| (free, -matrix.get(row, free - 1))),
                )
                .collect::<BTreeMap<_, _>>();
            (variable, coefficients)
        })
        .collect();

    Ok(Reduction {
        matrix,
        basis,
        discarded,
        expression: BasicVariableExpression(expression),
    })
}

/// Number of basic variables of a consistent system.
pub fn rank(matrix: &Matrix) -> Result<usize, EliminationError> {
    reduce(matrix, matrix.variable_count()).map(|reduction| reduction.basis.len())
}

/// Every basis of `basis_size` variables whose basic solution satisfies the
/// original system. Cost grows as `C(n, basis_size)`.
pub fn find_basic_solutions(
    matrix: &Matrix,
    basis_size: usize,
) -> Result<Vec<BasicSolution>, EliminationError> {
    let n = matrix.variable_count();
    let mut solutions = Vec::new();
    for columns in (0..n).combinations(basis_size) {
        let reduction = match reduce(&matrix.select_columns(&columns), basis_size) {
            Ok(reduction) => reduction,
            Err(EliminationError::Infeasible { .. }) => continue,
            Err(err) => return Err(err),
        };
        if reduction.basis.len() != basis_size {
            continue;
        }

        let mut values = vec![Rational::zero(); n];
        for (row, &variable) in reduction.basis.iter().enumerate() {
            values[columns[variable - 1]] = reduction.matrix.rhs(row).clone();
        }
        let basis = columns.iter().map(|c| c + 1).collect::<Vec<_>>();
        // A full basis leaves only zero rows behind, so an exact reduction
        // always passes. Failing here means the reduction itself is wrong.
        if !satisfies(matrix, &values)? {
            log::error!("Basis {basis:?} fails verification");
            continue;
        }
        solutions.push(BasicSolution::new(basis, RowDVector::from_iterator(n, values)));
    }
    Ok(solutions)
}

/// Whether `values` solves every equation of `matrix` exactly.
fn satisfies(matrix: &Matrix, values: &[Rational]) -> Result<bool, ArithmeticError> {
    for row in 0..matrix.nrows() {
        let mut sum = Rational::zero();
        for (column, value) in values.iter().enumerate() {
            sum = sum.try_add(&matrix.get(row, column).try_mul(value)?)?;
        }
        if &sum != matrix.rhs(row) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn find_pivot_row(matrix: &Matrix, from: usize, column: usize) -> Option<usize> {
    // reversed so that the first of several equal maxima wins
    (from..matrix.nrows())
        .rev()
        .filter(|&row| !matrix.get(row, column).is_zero())
        .max_by_key(|&row| matrix.get(row, column).abs())
}

fn eliminate(matrix: &mut Matrix, pivot_row: usize, column: usize) -> Result<(), ArithmeticError> {
    let pivot = matrix.get(pivot_row, column).clone();
    matrix.scale_row(pivot_row, &Rational::one().try_div(&pivot)?)?;
    for row in (0..matrix.nrows()).filter(|&row| row != pivot_row) {
        let factor = matrix.get(row, column).clone();
        if !factor.is_zero() {
            matrix.add_scaled_row(row, pivot_row, &-factor)?;
        }
    }
    Ok(())
}

fn delete_zero_rows(matrix: &mut Matrix, origin: &mut Vec<usize>, from: usize) -> usize {
    let mut discarded = 0;
    let mut row = from;
    while row < matrix.nrows() {
        if matrix.is_zero_row(row) {
            log::warn!("Discarding redundant equation {}", origin[row]);
            matrix.remove_row(row);
            origin.remove(row);
            discarded += 1;
        } else {
            row += 1;
        }
    }
    discarded
}

fn check_false_equalities(
    matrix: &Matrix,
    origin: &[usize],
    from: usize,
) -> Result<(), EliminationError> {
    match (from..matrix.nrows()).find(|&row| matrix.has_zero_coefficients(row)) {
        Some(row) => Err(EliminationError::Infeasible {
            row: origin[row],
            rhs: matrix.rhs(row).clone(),
        }),
        None => Ok(()),
    }
}

impl BasicVariableExpression {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_basic(&self, variable: usize) -> bool {
        self.0.contains_key(&variable)
    }

    pub fn basis(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    /// Highest variable index mentioned, basic or free.
    pub fn variable_count(&self) -> usize {
        self.iter()
            .flat_map(|(&basic, coefficients)| {
                std::iter::once(basic).chain(coefficients.keys().copied())
            })
            .max()
            .unwrap_or(0)
    }

    pub fn get(&self, basic: usize) -> Option<&BTreeMap<usize, Rational>> {
        self.0.get(&basic)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, usize, BTreeMap<usize, Rational>> {
        self.0.iter()
    }

    /// Values of `x1..xn` with every free variable at zero.
    pub fn basic_solution(&self, variable_count: usize) -> RowDVector<Rational> {
        RowDVector::from_iterator(
            variable_count,
            (1..=variable_count).map(|variable| {
                self.get(variable)
                    .and_then(|coefficients| coefficients.get(&0))
                    .cloned()
                    .unwrap_or_default()
            }),
        )
    }
}

impl<'a> IntoIterator for &'a BasicVariableExpression {
    type Item = (&'a usize, &'a BTreeMap<usize, Rational>);
    type IntoIter = btree_map::Iter<'a, usize, BTreeMap<usize, Rational>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for BasicVariableExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (basic, coefficients) in self {
            write!(f, "x{basic} = ")?;
            fmt_linear(f, coefficients.iter().map(|(&i, c)| (i, c)))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl BasicSolution {
    pub fn is_feasible(&self) -> bool {
        self.values.iter().all(|value| !value.is_negative())
    }
}

impl fmt::Display for BasicSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let basis = self.basis.iter().map(|b| format!("x{b}")).join(", ");
        let values = self.values.iter().join(", ");
        write!(f, "{{{basis}}}: ({values})")?;
        if !self.is_feasible() {
            write!(f, " infeasible")?;
        }
        Ok(())
    }
}
