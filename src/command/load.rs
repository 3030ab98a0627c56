use derive_more::{Display, Error};

use crate::{
    matrix::Matrix,
    simplex::{ObjectiveFunction, Problem},
    Rational,
};

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LoadError {
    #[display(fmt = "line {}: {}", line, reason)]
    MalformedInput {
        line: usize,
        reason: String,
    },
}

fn malformed(line: usize, reason: impl Into<String>) -> LoadError {
    LoadError::MalformedInput {
        line,
        reason: reason.into(),
    }
}

/// Reads a problem from text.
///
/// The first non-empty line holds the objective coefficients, every following
/// non-empty line one equality constraint with its right-hand side last.
/// Values are whitespace separated integers.
pub fn load(text: &str) -> Result<Problem, LoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (objective_line, objective) = lines.next().ok_or_else(|| malformed(1, "no objective"))?;
    let objective = parse_row(objective_line, objective)?;

    let mut line_numbers = Vec::new();
    let mut rows = Vec::new();
    for (line, content) in lines {
        let row = parse_row(line, content)?;
        if row.len() < 2 {
            return Err(malformed(
                line,
                "a constraint needs coefficients and a right-hand side",
            ));
        }
        line_numbers.push(line);
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(malformed(text.lines().count() + 1, "no constraints"));
    }

    let constraints = Matrix::from_rows(rows)
        .map_err(|err| malformed(line_numbers[err.row], err.to_string()))?;
    let variable_count = constraints.variable_count();
    if objective.len() > variable_count {
        return Err(malformed(
            objective_line,
            format!(
                "objective has {} coefficients for {} variables",
                objective.len(),
                variable_count
            ),
        ));
    }

    let objective = ObjectiveFunction::from_variables(objective).padded(variable_count);
    Ok(Problem::new(objective, constraints))
}

fn parse_row(line: usize, text: &str) -> Result<Vec<Rational>, LoadError> {
    text.split_whitespace()
        .map(|token| {
            let value = token
                .parse::<i64>()
                .map_err(|_| malformed(line, format!("`{token}` is not an integer")))?;
            Rational::from_integer(value)
                .map_err(|err| malformed(line, format!("`{token}`: {err}")))
        })
        .collect()
}
