use std::{collections::BTreeMap, fmt};

use derive_more::Display;
use derive_new::new;
use nalgebra::RowDVector;
use serde::Serialize;

use crate::{dbg_display, elimination::BasicVariableExpression, ArithmeticError, Rational};

use super::{ObjectiveFunction, SimplexError, StallReason};

/// Simplex iteration table.
///
/// Every row holds the current value in column 0 followed by one coefficient
/// per variable. Data rows are keyed by their basic variable and iterate in
/// ascending order; the objective row is kept apart and is logically last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplexTable {
    rows: BTreeMap<usize, RowDVector<Rational>>,
    objective: RowDVector<Rational>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum RowLabel {
    #[display(fmt = "x{}", _0)]
    Basic(usize),
    #[display(fmt = "z")]
    Objective,
}

#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct Pivot {
    /// Basic variable leaving the basis.
    pub row: usize,
    /// Variable entering the basis.
    pub column: usize,
    pub element: Rational,
}

/// Ratios computed by one pivot search. The primary search keeps one value per
/// column, the alternate-optimum search one per data row. Sentinels mark
/// entries without a valid ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RatioTest {
    Columns(RowDVector<Rational>),
    Rows(Vec<(usize, Rational)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Optimality {
    pub optimal: bool,
    /// Last non-basic column with a zero objective coefficient in an optimal
    /// table.
    pub alternate_column: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    /// No basic variable is negative.
    pub rows_feasible: bool,
    /// No objective coefficient is negative.
    pub objective_feasible: bool,
}

impl Validity {
    pub fn is_valid(&self, alternate_search: bool) -> bool {
        (self.rows_feasible || alternate_search) && self.objective_feasible
    }
}

impl SimplexTable {
    /// Data rows carry the constant as is and the free coefficients negated;
    /// the objective row carries the expressed objective the same way.
    pub fn new(expression: &BasicVariableExpression, expressed: &ObjectiveFunction) -> Self {
        let n = expressed.variable_count();
        let rows = expression
            .iter()
            .map(|(&basic, coefficients)| {
                let row = RowDVector::from_iterator(
                    n + 1,
                    (0..=n).map(|column| match column {
                        0 => coefficients.get(&0).cloned().unwrap_or_default(),
                        _ if column == basic => Rational::one(),
                        _ => coefficients
                            .get(&column)
                            .map(|c| -c)
                            .unwrap_or_default(),
                    }),
                );
                (basic, row)
            })
            .collect();
        let objective = RowDVector::from_iterator(
            n + 1,
            expressed
                .coefficients()
                .iter()
                .enumerate()
                .map(|(column, c)| if column == 0 { c.clone() } else { -c }),
        );
        Self { rows, objective }
    }

    pub fn variable_count(&self) -> usize {
        self.objective.len() - 1
    }

    pub fn basis(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    pub fn is_basic(&self, variable: usize) -> bool {
        self.rows.contains_key(&variable)
    }

    pub fn row(&self, label: RowLabel) -> Option<&RowDVector<Rational>> {
        match label {
            RowLabel::Basic(basic) => self.rows.get(&basic),
            RowLabel::Objective => Some(&self.objective),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = (RowLabel, &RowDVector<Rational>)> {
        self.rows
            .iter()
            .map(|(&basic, row)| (RowLabel::Basic(basic), row))
            .chain([(RowLabel::Objective, &self.objective)])
    }

    /// Current value of the expressed objective.
    pub fn value(&self) -> &Rational {
        &self.objective[0]
    }

    /// Values of `x1..xn`; non-basic variables are zero.
    pub fn solution(&self) -> RowDVector<Rational> {
        RowDVector::from_iterator(
            self.variable_count(),
            (1..=self.variable_count()).map(|variable| {
                self.rows
                    .get(&variable)
                    .map(|row| row[0].clone())
                    .unwrap_or_default()
            }),
        )
    }

    pub fn validity(&self) -> Validity {
        Validity {
            rows_feasible: self.rows.values().all(|row| !row[0].is_negative()),
            objective_feasible: self.objective.iter().skip(1).all(|c| !c.is_negative()),
        }
    }

    pub fn is_valid(&self, alternate_search: bool) -> bool {
        self.validity().is_valid(alternate_search)
    }

    pub fn optimality(&self) -> Optimality {
        let Validity {
            rows_feasible,
            objective_feasible,
        } = self.validity();
        let optimal = rows_feasible && objective_feasible;
        Optimality {
            optimal,
            alternate_column: optimal
                .then(|| {
                    (1..=self.variable_count())
                        .rev()
                        .find(|&column| !self.is_basic(column) && self.objective[column].is_zero())
                })
                .flatten(),
        }
    }

    /// Pivot search while the table is not optimal.
    ///
    /// The row is the one with the smallest non-positive value among those
    /// with more than one negative entry. The column maximizes
    /// `z[i] / row[i]` over negative `row[i]` with non-zero `z[i]`.
    pub fn find_resolving_element(&self) -> Result<(Pivot, RatioTest), SimplexError> {
        let mut candidates = self
            .rows
            .iter()
            .filter(|(_, row)| !row[0].is_positive())
            .collect::<Vec<_>>();
        candidates.sort_by(|(_, lhs), (_, rhs)| lhs[0].cmp(&rhs[0]));
        let (&row, values) = candidates
            .into_iter()
            .find(|(_, row)| row.iter().filter(|x| x.is_negative()).count() > 1)
            .ok_or(SimplexError::Stalled {
                reason: StallReason::NoPivotRow,
            })?;

        let n = self.variable_count();
        let mut ratios = RowDVector::from_element(n + 1, Rational::MinusInf);
        for column in 1..=n {
            let coefficient = &values[column];
            let estimation = &self.objective[column];
            if coefficient.is_negative() && !estimation.is_zero() {
                ratios[column] = estimation.try_div(coefficient)?;
            }
        }

        let column = (1..=n)
            .rev()
            .filter(|&column| ratios[column].is_finite())
            .max_by_key(|&column| ratios[column].clone())
            .ok_or(SimplexError::Stalled {
                reason: StallReason::NoPivotColumn,
            })?;
        let pivot = Pivot::new(row, column, values[column].clone());
        Ok((pivot, RatioTest::Columns(ratios)))
    }

    /// Pivot search along a zero-cost column of an optimal table: the
    /// standard minimum-ratio test over strictly positive coefficients.
    pub fn find_next_solution_element(
        &self,
        column: usize,
    ) -> Result<(Pivot, RatioTest), SimplexError> {
        let ratios = self
            .rows
            .iter()
            .map(|(&basic, values)| {
                let ratio = if values[column].is_positive() {
                    values[0].try_div(&values[column])?
                } else {
                    Rational::Inf
                };
                Ok((basic, ratio))
            })
            .collect::<Result<Vec<_>, ArithmeticError>>()?;

        let row = ratios
            .iter()
            .filter(|(_, ratio)| ratio.is_finite())
            .min_by_key(|(_, ratio)| ratio.clone())
            .map(|(basic, _)| *basic)
            .ok_or(SimplexError::Stalled {
                reason: StallReason::NoPivotRow,
            })?;
        let pivot = Pivot::new(row, column, self.rows[&row][column].clone());
        Ok((pivot, RatioTest::Rows(ratios)))
    }

    /// One Gauss-Jordan step on the table: `pivot.column` enters the basis,
    /// `pivot.row` leaves it. `self` is left untouched.
    pub fn recalculate(&self, pivot: &Pivot) -> Result<SimplexTable, SimplexError> {
        let Pivot {
            row: leaving,
            column: entering,
            element,
        } = pivot;
        let invalid = || SimplexError::InvalidPivot {
            row: *leaving,
            column: *entering,
        };
        let pivot_row = self.rows.get(leaving).ok_or_else(invalid)?;
        if *entering == 0 || *entering > self.variable_count() || self.is_basic(*entering) {
            return Err(invalid());
        }
        if &pivot_row[*entering] != element {
            return Err(invalid());
        }

        let entering_row = try_map_row(pivot_row, |(_, x)| x.try_div(element))?;
        let eliminate = |row: &RowDVector<Rational>| {
            let factor = row[*entering].clone();
            try_map_row(row, |(i, x)| x.try_sub(&factor.try_mul(&entering_row[i])?))
        };

        let mut rows = BTreeMap::new();
        for (&basic, row) in self.rows.iter().filter(|(basic, _)| *basic != leaving) {
            rows.insert(basic, eliminate(row)?);
        }
        let mut objective = dbg_display!(eliminate(&self.objective)?);
        rows.insert(*entering, entering_row);

        let basis = rows.keys().copied().collect::<Vec<_>>();
        for basic in basis {
            objective[basic] = Rational::zero();
            for (&owner, row) in rows.iter_mut() {
                row[basic] = if owner == basic {
                    Rational::one()
                } else {
                    Rational::zero()
                };
            }
        }

        Ok(Self { rows, objective })
    }
}

fn try_map_row<F>(row: &RowDVector<Rational>, f: F) -> Result<RowDVector<Rational>, ArithmeticError>
where
    F: FnMut((usize, &Rational)) -> Result<Rational, ArithmeticError>,
{
    let values = row.iter().enumerate().map(f).collect::<Result<Vec<_>, _>>()?;
    Ok(RowDVector::from_iterator(values.len(), values))
}

impl fmt::Display for SimplexTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B.V.\t1")?;
        for variable in 1..=self.variable_count() {
            write!(f, "\tx{variable}")?;
        }
        writeln!(f)?;
        for (label, row) in self.rows() {
            write!(f, "{label}")?;
            for value in row.iter() {
                write!(f, "\t{value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for RatioTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |ratio: &Rational| match ratio.is_sentinel() {
            true => "-".to_owned(),
            false => ratio.to_string(),
        };
        write!(f, "S.D.")?;
        match self {
            RatioTest::Columns(ratios) => {
                for ratio in ratios.iter() {
                    write!(f, "\t{}", cell(ratio))?;
                }
            }
            RatioTest::Rows(ratios) => {
                for (basic, ratio) in ratios {
                    write!(f, "\tx{basic}: {}", cell(ratio))?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Pivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resolving element: row - x{} column - x{} element - {}",
            self.row, self.column, self.element
        )
    }
}
