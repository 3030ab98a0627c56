#[cfg(test)]
mod tests;

use std::{collections::BTreeSet, fmt};

use derive_more::Display;
use derive_new::new;
use nalgebra::RowDVector;
use serde::Serialize;

use crate::{
    elimination::{self, BasicSolution, BasicVariableExpression},
    helpers::fmt_linear,
    matrix::Matrix,
    ArithmeticError, Rational,
};

use super::{
    calculate, Outcome, Path, SimplexError, SimplexTable, SolutionRecord, SolutionReport,
    StallReason, State, Transition,
};

/// `Z = c0 + c1x1 + ... + cnxn`, maximized. Index 0 holds the constant term.
#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct ObjectiveFunction {
    coefficients: RowDVector<Rational>,
}

#[derive(Debug, Clone, PartialEq, Display, new)]
#[display(fmt = "Z = {}\n{}", objective, constraints)]
pub struct Problem {
    pub objective: ObjectiveFunction,
    pub constraints: Matrix,
}

impl ObjectiveFunction {
    /// Objective without a constant term.
    pub fn from_variables(coefficients: impl IntoIterator<Item = Rational>) -> Self {
        let coefficients = std::iter::once(Rational::zero())
            .chain(coefficients)
            .collect::<Vec<_>>();
        Self::new(RowDVector::from_iterator(coefficients.len(), coefficients))
    }

    pub fn variable_count(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn coefficients(&self) -> &RowDVector<Rational> {
        &self.coefficients
    }

    /// Zero past the last stored coefficient.
    #[inline]
    pub fn coefficient(&self, variable: usize) -> Rational {
        self.coefficients.get(variable).cloned().unwrap_or_default()
    }

    pub fn evaluate(&self, variables: &RowDVector<Rational>) -> Result<Rational, ArithmeticError> {
        self.coefficients
            .iter()
            .skip(1)
            .zip(variables.iter())
            .try_fold(self.coefficient(0), |sum, (c, x)| {
                sum.try_add(&c.try_mul(x)?)
            })
    }

    /// Substitutes every basic variable by its expression, leaving an
    /// objective in the free variables only. Variables of `expression` past
    /// the end of the objective get a zero coefficient.
    pub fn express(
        &self,
        expression: &BasicVariableExpression,
    ) -> Result<ObjectiveFunction, ArithmeticError> {
        let len = (expression.variable_count() + 1).max(self.coefficients.len());
        let mut expressed = RowDVector::from_fn(len, |_, i| {
            if i != 0 && expression.is_basic(i) {
                Rational::zero()
            } else {
                self.coefficient(i)
            }
        });
        for (&basic, coefficients) in expression {
            let weight = self.coefficient(basic);
            for (&free, coefficient) in coefficients {
                expressed[free] = expressed[free].try_add(&coefficient.try_mul(&weight)?)?;
            }
        }
        Ok(Self::new(expressed))
    }

    pub(crate) fn padded(self, variable_count: usize) -> Self {
        let missing = (variable_count + 1).saturating_sub(self.coefficients.len());
        if missing == 0 {
            return self;
        }
        let len = self.coefficients.len();
        Self::new(self.coefficients.insert_columns(len, missing, Rational::zero()))
    }
}

impl fmt::Display for ObjectiveFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_linear(f, self.coefficients.iter().enumerate())
    }
}

impl Problem {
    pub fn variable_count(&self) -> usize {
        self.constraints.variable_count()
    }

    pub fn solve(&self) -> Result<SolutionReport, SimplexError> {
        calculate(&self.objective, &self.constraints, self.variable_count())
    }

    /// Every verified basic solution of the constraints, feasible or not.
    pub fn basic_solutions(&self) -> Result<Vec<BasicSolution>, SimplexError> {
        let rank = elimination::rank(&self.constraints)?;
        Ok(elimination::find_basic_solutions(&self.constraints, rank)?)
    }
}

/// Pivot loop over simplex tables.
///
/// Each [`Simplex::step`] consumes the engine and performs exactly one state
/// transition. Pivots are kept as [`Transition`]s together with the table they
/// were applied to.
#[derive(Debug, Clone)]
pub struct Simplex {
    objective: ObjectiveFunction,
    expressed: ObjectiveFunction,
    table: SimplexTable,
    state: State,
    solutions: Vec<SolutionRecord>,
    transitions: Vec<Transition>,
    visited: BTreeSet<Vec<usize>>,
}

impl Simplex {
    pub fn new(
        objective: ObjectiveFunction,
        expression: &BasicVariableExpression,
    ) -> Result<Self, SimplexError> {
        let objective = objective.padded(expression.variable_count());
        let expressed = objective.express(expression)?;
        log::info!("Z = {objective}");
        log::info!("Exp. Z = {expressed}");

        let table = SimplexTable::new(expression, &expressed);
        log::debug!("Source table:\n{table}");
        Ok(Self {
            visited: BTreeSet::from([table.basis().collect()]),
            objective,
            expressed,
            table,
            state: State::Checking,
            solutions: Vec::with_capacity(2),
            transitions: Vec::new(),
        })
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn table(&self) -> &SimplexTable {
        &self.table
    }

    pub fn solutions(&self) -> &[SolutionRecord] {
        &self.solutions
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn step(mut self) -> Result<Self, SimplexError> {
        self.state = match self.state {
            State::Checking => self.check()?,
            State::Pivoting(path) => self.pivot(path)?,
            terminal => terminal,
        };
        Ok(self)
    }

    pub fn run(mut self) -> Result<SolutionReport, SimplexError> {
        let mut iteration = 1u32;
        while !self.state.is_terminal() {
            if self.state.is_checking() {
                log::info!("Iteration: {iteration}");
                iteration += 1;
            }
            self = self.step()?;
        }
        self.into_report()
    }

    fn check(&mut self) -> Result<State, SimplexError> {
        let alternate_search = !self.solutions.is_empty();
        log::debug!(
            "Table is {}",
            if self.table.is_valid(alternate_search) {
                "valid"
            } else {
                "invalid"
            }
        );

        let optimality = self.table.optimality();
        if !optimality.optimal {
            log::info!("Solution is not optimal");
            if !self.table.validity().objective_feasible {
                return Ok(State::Stalled(StallReason::ImprovingDirection));
            }
            return Ok(State::Pivoting(Path::Resolving));
        }

        self.record()?;
        Ok(match optimality.alternate_column {
            _ if self.solutions.len() == 2 => State::AlternateOptima,
            Some(column) => {
                log::info!("Solution is optimal, but not the only one");
                State::Pivoting(Path::NextSolution(column))
            }
            None => {
                log::info!("Solution is optimal and the only one");
                State::UniqueOptimum
            }
        })
    }

    fn pivot(&mut self, path: Path) -> Result<State, SimplexError> {
        let selection = match path {
            Path::Resolving => self.table.find_resolving_element(),
            Path::NextSolution(column) => self.table.find_next_solution_element(column),
        };
        let (pivot, ratios) = match (selection, path) {
            (Ok(selection), _) => selection,
            (Err(SimplexError::Stalled { .. }), Path::NextSolution(column)) => {
                log::warn!("x{column} grows without bound along the optimal face");
                return Ok(State::UniqueOptimum);
            }
            (Err(SimplexError::Stalled { reason }), Path::Resolving) => {
                return Ok(State::Stalled(reason))
            }
            (Err(err), _) => return Err(err),
        };
        log::info!("{ratios}");
        log::info!("{pivot}");

        let table = self.table.recalculate(&pivot)?;
        log::debug!("Recalculated table:\n{table}");
        let before = std::mem::replace(&mut self.table, table);
        self.transitions.push(Transition::new(before, ratios, pivot));

        if path == Path::Resolving && !self.visited.insert(self.table.basis().collect()) {
            return Ok(State::Stalled(StallReason::Cycle));
        }
        Ok(State::Checking)
    }

    fn record(&mut self) -> Result<(), SimplexError> {
        let variables = self.table.solution();
        let value = self.objective.evaluate(&variables)?;
        let record = SolutionRecord::new(variables, value);
        log::info!("{record}");
        self.solutions.push(record);
        Ok(())
    }

    /// Report of a finished run. Fails with the stall reason of a stalled
    /// engine and with [`SimplexError::Unfinished`] before a terminal state.
    pub fn into_report(self) -> Result<SolutionReport, SimplexError> {
        let Self {
            objective,
            expressed,
            table,
            state,
            solutions,
            transitions,
            ..
        } = self;
        if let State::Stalled(reason) = state {
            return Err(SimplexError::Stalled { reason });
        }

        let mut solutions = solutions.into_iter();
        let outcome = match (state, solutions.next(), solutions.next()) {
            (State::AlternateOptima, Some(first), Some(second)) => {
                Outcome::AlternateOptima { first, second }
            }
            (State::UniqueOptimum, Some(first), _) => Outcome::UniqueOptimum(first),
            _ => return Err(SimplexError::Unfinished { state }),
        };
        Ok(SolutionReport::new(
            objective,
            expressed,
            transitions,
            table,
            outcome,
        ))
    }
}
