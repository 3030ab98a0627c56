mod problem;
mod solution;
mod table;

pub use problem::*;
pub use solution::*;
pub use table::*;

use derive_more::{Display, Error, IsVariant};
use serde::Serialize;

use crate::{
    elimination::{self, EliminationError},
    matrix::Matrix,
    ArithmeticError, Rational,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IsVariant)]
pub enum State {
    #[display(fmt = "checking")]
    Checking,
    #[display(fmt = "pivoting ({})", _0)]
    Pivoting(Path),
    #[display(fmt = "unique optimum")]
    UniqueOptimum,
    #[display(fmt = "alternate optima")]
    AlternateOptima,
    #[display(fmt = "stalled: {}", _0)]
    Stalled(StallReason),
}

impl State {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, State::Checking | State::Pivoting(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Path {
    #[display(fmt = "resolving")]
    Resolving,
    /// Search for a second optimum along the given zero-cost column.
    #[display(fmt = "next solution along x{}", _0)]
    NextSolution(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum StallReason {
    #[display(fmt = "the objective can still be improved")]
    ImprovingDirection,
    #[display(fmt = "no row qualifies for pivoting")]
    NoPivotRow,
    #[display(fmt = "no column qualifies for pivoting")]
    NoPivotColumn,
    #[display(fmt = "a basis was visited twice")]
    Cycle,
}

#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum SimplexError {
    #[display(fmt = "no solution: equation {} reduces to 0 = {}", row, rhs)]
    Infeasible { row: usize, rhs: Rational },
    #[display(fmt = "no solution found: {}", reason)]
    Stalled { reason: StallReason },
    #[display(
        fmt = "objective has {} variables, the constraints only {}",
        objective,
        constraints
    )]
    DimensionMismatch { objective: usize, constraints: usize },
    #[display(fmt = "x{} cannot enter the basis in place of x{}", column, row)]
    InvalidPivot { row: usize, column: usize },
    #[display(fmt = "the pivot loop has not reached an optimum: {}", state)]
    Unfinished { state: State },
    #[display(fmt = "{}", _0)]
    Arithmetic(#[error(source)] ArithmeticError),
}

impl From<ArithmeticError> for SimplexError {
    fn from(err: ArithmeticError) -> Self {
        Self::Arithmetic(err)
    }
}

impl From<EliminationError> for SimplexError {
    fn from(err: EliminationError) -> Self {
        match err {
            EliminationError::Infeasible { row, rhs } => Self::Infeasible { row, rhs },
            EliminationError::VariableCount { expected, found } => Self::DimensionMismatch {
                objective: found,
                constraints: expected,
            },
            EliminationError::Arithmetic(err) => Self::Arithmetic(err),
        }
    }
}

/// Reduces the constraints, expresses the objective through the free
/// variables and runs the pivot loop to a terminal state.
pub fn calculate(
    objective: &ObjectiveFunction,
    matrix: &Matrix,
    variable_count: usize,
) -> Result<SolutionReport, SimplexError> {
    let constraints = matrix.variable_count();
    if objective.variable_count() > constraints {
        return Err(SimplexError::DimensionMismatch {
            objective: objective.variable_count(),
            constraints,
        });
    }
    let objective = objective.clone().padded(constraints);
    let expression = elimination::process(matrix, variable_count)?;
    log::debug!("Basic variables:\n{expression}");

    Simplex::new(objective, &expression)?.run()
}
