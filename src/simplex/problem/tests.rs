use pretty_assertions::{assert_eq, assert_str_eq};

use super::*;
use crate::{
    matrix::integer_matrix,
    simplex::{Pivot, RowLabel},
};

fn r(numer: i64, denom: i64) -> Rational {
    Rational::new(numer, denom).unwrap()
}

fn objective(coefficients: &[i64]) -> ObjectiveFunction {
    ObjectiveFunction::from_variables(coefficients.iter().map(|&c| r(c, 1)))
}

fn row(values: &[Rational]) -> RowDVector<Rational> {
    RowDVector::from_row_slice(values)
}

/// max `3x1 + 5x2` subject to `x1 <= 4`, `2x2 <= 12`, `3x1 + 2x2 <= 18`.
fn prepare_problem() -> Problem {
    Problem::new(
        objective(&[3, 5]),
        integer_matrix(&[
            &[1, 0, 1, 0, 0, 4],
            &[0, 2, 0, 1, 0, 12],
            &[3, 2, 0, 0, 1, 18],
        ]),
    )
}

/// max `x1 + x2` subject to `x1 + x2 <= 4`, `x1 <= 3`.
fn alternate_problem() -> Problem {
    Problem::new(
        objective(&[1, 1, 0, 0]),
        integer_matrix(&[&[1, 1, 1, 0, 4], &[1, 0, 0, 1, 3]]),
    )
}

/// `x1 + x2 >= 2`, `x1 + 2x2 >= 1` with surplus variables `x3`, `x4`.
fn surplus_constraints() -> Matrix {
    integer_matrix(&[&[1, 1, -1, 0, 2], &[1, 2, 0, -1, 1]])
}

#[test]
fn objective_function_display() {
    assert_str_eq!(objective(&[3, 5, 0]).to_string(), "3x1 + 5x2");
    assert_str_eq!(objective(&[-1, 0, 1]).to_string(), "-x1 + x3");
    assert_str_eq!(objective(&[0, 0]).to_string(), "0");
}

#[test]
fn objective_function_is_padded_and_evaluated() {
    let padded = objective(&[3, 5]).padded(5);

    assert_eq!(padded.variable_count(), 5);
    assert_eq!(padded.coefficient(5), Rational::zero());
    assert_eq!(padded.coefficient(9), Rational::zero());
    assert_eq!(
        padded
            .evaluate(&row(&[r(2, 1), r(6, 1), r(2, 1), r(0, 1), r(0, 1)]))
            .unwrap(),
        r(36, 1)
    );
}

#[test]
fn empty_objective_has_no_variables() {
    let empty = ObjectiveFunction::new(RowDVector::from_iterator(0, std::iter::empty()));

    assert_eq!(empty.variable_count(), 0);
    assert_eq!(empty.evaluate(&row(&[r(1, 1)])), Ok(Rational::zero()));
    assert_eq!(empty.padded(2).variable_count(), 2);
}

#[test]
fn short_objective_is_expressed_over_all_variables() {
    let expression = elimination::process(&integer_matrix(&[&[1, 1, 1, 1]]), 3).unwrap();

    let expressed = objective(&[1]).express(&expression).unwrap();
    assert_eq!(expressed.variable_count(), 3);
    assert_str_eq!(expressed.to_string(), "1 - x2 - x3");
}

#[test]
fn engine_pads_a_short_objective() {
    let expression = elimination::process(&integer_matrix(&[&[1, 1, 1, 1]]), 3).unwrap();

    let report = Simplex::new(objective(&[1]), &expression)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(
        report.outcome,
        Outcome::UniqueOptimum(SolutionRecord::new(
            row(&[r(1, 1), r(0, 1), r(0, 1)]),
            r(1, 1)
        ))
    );
    assert_eq!(report.objective.variable_count(), 3);
}

#[test]
fn unique_optimum() {
    let _ = env_logger::builder().is_test(true).try_init();
    let report = prepare_problem().solve().unwrap();

    assert_eq!(report.state(), State::UniqueOptimum);
    assert!(report.transitions.is_empty());
    assert_eq!(
        report.outcome,
        Outcome::UniqueOptimum(SolutionRecord::new(
            row(&[r(2, 1), r(6, 1), r(2, 1), r(0, 1), r(0, 1)]),
            r(36, 1)
        ))
    );
    assert_str_eq!(
        report.to_string(),
        "Z = 3x1 + 5x2\n\
         Exp. Z = 36 - 3/2x4 - x5\n\
         \n\
         B.V.\t1\tx1\tx2\tx3\tx4\tx5\n\
         x1\t2\t1\t0\t0\t-1/3\t1/3\n\
         x2\t6\t0\t1\t0\t1/2\t0\n\
         x3\t2\t0\t0\t1\t1/3\t-1/3\n\
         z\t36\t0\t0\t0\t3/2\t1\n\
         \n\
         Zmax = Z(2, 6, 2, 0, 0) = 36"
    );
}

#[test]
fn alternate_optima() {
    let _ = env_logger::builder().is_test(true).try_init();
    let report = alternate_problem().solve().unwrap();

    assert_eq!(report.state(), State::AlternateOptima);
    assert_eq!(
        report.outcome,
        Outcome::AlternateOptima {
            first: SolutionRecord::new(row(&[r(3, 1), r(1, 1), r(0, 1), r(0, 1)]), r(4, 1)),
            second: SolutionRecord::new(row(&[r(0, 1), r(4, 1), r(0, 1), r(3, 1)]), r(4, 1)),
        }
    );
    assert_eq!(
        report.outcome.at(&r(1, 2)).unwrap(),
        row(&[r(3, 2), r(5, 2), r(0, 1), r(3, 2)])
    );
    assert_eq!(
        report.outcome.at(&r(2, 1)),
        Err(ArithmeticError::InvalidOperand)
    );
    assert_str_eq!(
        report.outcome.to_string(),
        "Zmax = Z(3 - 3L, 1 + 3L, 0, 3L) = 4\n0 <= L <= 1"
    );

    assert_eq!(report.transitions.len(), 1);
    assert_str_eq!(
        report.transitions[0].to_string(),
        "B.V.\t1\tx1\tx2\tx3\tx4\n\
         x1\t3\t1\t0\t0\t1\n\
         x2\t1\t0\t1\t1\t-1\n\
         z\t4\t0\t0\t1\t0\n\
         S.D.\tx1: 3\tx2: -\n\
         Resolving element: row - x1 column - x4 element - 1"
    );
    assert_str_eq!(
        report.table.to_string(),
        "B.V.\t1\tx1\tx2\tx3\tx4\n\
         x2\t4\t1\t1\t1\t0\n\
         x4\t3\t1\t0\t0\t1\n\
         z\t4\t0\t0\t1\t0\n"
    );
}

#[test]
fn alternate_path_follows_the_last_zero_column() {
    // max 0 subject to x1 + x2 + x3 = 1: both x2 and x3 cost nothing
    let matrix = integer_matrix(&[&[1, 1, 1, 1]]);

    let report = calculate(&objective(&[0, 0, 0]), &matrix, 3).unwrap();
    assert_eq!(report.transitions.len(), 1);
    assert_eq!(report.transitions[0].pivot, Pivot::new(1, 3, r(1, 1)));
    assert_str_eq!(
        report.transitions[0].pivot.to_string(),
        "Resolving element: row - x1 column - x3 element - 1"
    );
    assert_str_eq!(
        report.outcome.to_string(),
        "Zmax = Z(1 - L, 0, L) = 0\n0 <= L <= 1"
    );
}

#[test]
fn report_needs_a_finished_run() {
    let expression = elimination::process(&surplus_constraints(), 4).unwrap();
    let simplex = Simplex::new(objective(&[-1, -2, 0, 0]), &expression).unwrap();

    assert_eq!(
        simplex.clone().into_report(),
        Err(SimplexError::Unfinished {
            state: State::Checking
        })
    );
    let pivoting = simplex.step().unwrap();
    assert_eq!(pivoting.state(), State::Pivoting(Path::Resolving));
    assert_eq!(
        pivoting.into_report(),
        Err(SimplexError::Unfinished {
            state: State::Pivoting(Path::Resolving)
        })
    );
}

#[test]
fn engine_walks_through_states() {
    let problem = alternate_problem();
    let expression = elimination::process(&problem.constraints, 4).unwrap();
    let mut simplex = Simplex::new(problem.objective.clone(), &expression).unwrap();

    let mut states = vec![simplex.state()];
    while !simplex.state().is_terminal() {
        simplex = simplex.step().unwrap();
        states.push(simplex.state());
    }

    assert_eq!(
        states,
        vec![
            State::Checking,
            State::Pivoting(Path::NextSolution(4)),
            State::Checking,
            State::AlternateOptima,
        ]
    );
    assert_eq!(simplex.solutions().len(), 2);
    assert_eq!(simplex.transitions().len(), 1);
    // terminal states are absorbing
    assert_eq!(simplex.step().unwrap().state(), State::AlternateOptima);
}

#[test]
fn dual_step_reaches_optimum() {
    let report = calculate(&objective(&[-1, -2, 0, 0]), &surplus_constraints(), 4).unwrap();

    assert_eq!(
        report.outcome,
        Outcome::UniqueOptimum(SolutionRecord::new(
            row(&[r(2, 1), r(0, 1), r(0, 1), r(1, 1)]),
            r(-2, 1)
        ))
    );
    assert_eq!(report.transitions.len(), 1);
    let transition = &report.transitions[0];
    assert_eq!(transition.pivot, Pivot::new(2, 4, r(-1, 1)));
    assert_str_eq!(transition.ratios.to_string(), "S.D.\t-\t-\t-\t-\t-1");
    assert_str_eq!(
        report.table.to_string(),
        "B.V.\t1\tx1\tx2\tx3\tx4\n\
         x1\t2\t1\t1\t-1\t0\n\
         x4\t1\t0\t-1\t-1\t1\n\
         z\t-2\t0\t1\t1\t0\n"
    );
}

#[test]
fn recalculation_leaves_unit_entering_column() {
    let expression = elimination::process(&surplus_constraints(), 4).unwrap();
    let expressed = objective(&[-1, -2, 0, 0]).express(&expression).unwrap();
    let before = SimplexTable::new(&expression, &expressed);
    assert!(!before.optimality().optimal);
    assert!(before.validity().objective_feasible);

    let (pivot, _) = before.find_resolving_element().unwrap();
    let after = before.recalculate(&pivot).unwrap();

    assert_eq!(before.basis().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(after.basis().collect::<Vec<_>>(), vec![1, 4]);
    for (label, values) in after.rows() {
        let expected = match label {
            RowLabel::Basic(basic) if basic == pivot.column => Rational::one(),
            _ => Rational::zero(),
        };
        assert_eq!(values[pivot.column], expected);
    }
    assert!(after.optimality().optimal);
    assert_eq!(after.value(), &r(-2, 1));
}

#[test]
fn foreign_pivot_is_rejected() {
    let expression = elimination::process(&surplus_constraints(), 4).unwrap();
    let expressed = objective(&[-1, -2, 0, 0]).express(&expression).unwrap();
    let table = SimplexTable::new(&expression, &expressed);

    assert_eq!(
        table.recalculate(&Pivot::new(2, 4, r(1, 1))),
        Err(SimplexError::InvalidPivot { row: 2, column: 4 })
    );
    assert_eq!(
        table.recalculate(&Pivot::new(2, 1, r(0, 1))),
        Err(SimplexError::InvalidPivot { row: 2, column: 1 })
    );
}

#[test]
fn missing_pivot_column_stalls() {
    assert_eq!(
        calculate(&objective(&[-1, -1, 0, 0]), &surplus_constraints(), 4),
        Err(SimplexError::Stalled {
            reason: StallReason::NoPivotColumn
        })
    );
}

#[test]
fn improving_direction_stalls() {
    let matrix = integer_matrix(&[&[1, 1, -1, 2]]);

    assert_eq!(
        calculate(&objective(&[0, 1, 0]), &matrix, 3),
        Err(SimplexError::Stalled {
            reason: StallReason::ImprovingDirection
        })
    );
}

#[test]
fn inconsistent_constraints_have_no_solution() {
    let matrix = integer_matrix(&[&[1, 1, 4], &[0, 0, 5]]);

    assert_eq!(
        calculate(&objective(&[1, 1]), &matrix, 2),
        Err(SimplexError::Infeasible {
            row: 1,
            rhs: r(5, 1)
        })
    );
}

#[test]
fn unbounded_optimal_face_keeps_first_optimum() {
    // x1 = 1 + x2 makes the objective constant while x2 grows freely
    let matrix = integer_matrix(&[&[1, -1, 1]]);

    let report = calculate(&objective(&[-1, 1]), &matrix, 2).unwrap();
    assert_eq!(
        report.outcome,
        Outcome::UniqueOptimum(SolutionRecord::new(row(&[r(1, 1), r(0, 1)]), r(-1, 1)))
    );
    assert!(report.transitions.is_empty());
}

#[test]
fn objective_longer_than_constraints() {
    let matrix = integer_matrix(&[&[1, 1, 4]]);

    assert_eq!(
        calculate(&objective(&[1, 1, 1]), &matrix, 2),
        Err(SimplexError::DimensionMismatch {
            objective: 3,
            constraints: 2
        })
    );
}

#[test]
fn basic_solutions_of_problem() {
    let solutions = prepare_problem().basic_solutions().unwrap();

    assert_eq!(
        solutions
            .iter()
            .filter(|solution| solution.is_feasible())
            .count(),
        5
    );
}
