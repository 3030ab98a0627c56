use std::fmt;

use derive_more::IsVariant;
use derive_new::new;
use nalgebra::RowDVector;
use serde::Serialize;

use crate::{ArithmeticError, Rational};

use super::{ObjectiveFunction, Pivot, RatioTest, SimplexTable, State};

#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct SolutionRecord {
    pub variables: RowDVector<Rational>,
    /// Value of the original objective at `variables`.
    pub value: Rational,
}

#[derive(Debug, Clone, PartialEq, Serialize, IsVariant)]
pub enum Outcome {
    UniqueOptimum(SolutionRecord),
    /// Every point of the segment between the two solutions is optimal.
    AlternateOptima {
        first: SolutionRecord,
        second: SolutionRecord,
    },
}

/// A pivot applied to `before`.
#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct Transition {
    pub before: SimplexTable,
    pub ratios: RatioTest,
    pub pivot: Pivot,
}

#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct SolutionReport {
    pub objective: ObjectiveFunction,
    pub expressed: ObjectiveFunction,
    pub transitions: Vec<Transition>,
    pub table: SimplexTable,
    pub outcome: Outcome,
}

impl Outcome {
    pub fn value(&self) -> &Rational {
        match self {
            Outcome::UniqueOptimum(record) | Outcome::AlternateOptima { first: record, .. } => {
                &record.value
            }
        }
    }

    pub fn state(&self) -> State {
        match self {
            Outcome::UniqueOptimum(_) => State::UniqueOptimum,
            Outcome::AlternateOptima { .. } => State::AlternateOptima,
        }
    }

    pub fn solutions(&self) -> Vec<&SolutionRecord> {
        match self {
            Outcome::UniqueOptimum(record) => vec![record],
            Outcome::AlternateOptima { first, second } => vec![first, second],
        }
    }

    /// `x(λ) = s0 + λ(s1 - s0)` for `0 <= λ <= 1`; a unique optimum ignores `λ`.
    pub fn at(&self, lambda: &Rational) -> Result<RowDVector<Rational>, ArithmeticError> {
        match self {
            Outcome::UniqueOptimum(record) => Ok(record.variables.clone()),
            Outcome::AlternateOptima { first, second } => {
                if lambda.is_negative() || lambda > &Rational::one() {
                    return Err(ArithmeticError::InvalidOperand);
                }
                let values = first
                    .variables
                    .iter()
                    .zip(second.variables.iter())
                    .map(|(s0, s1)| s0.try_add(&s1.try_sub(s0)?.try_mul(lambda)?))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RowDVector::from_iterator(values.len(), values))
            }
        }
    }
}

impl SolutionReport {
    #[inline]
    pub fn state(&self) -> State {
        self.outcome.state()
    }
}

/// Writes `a + bL` with zero parts left out.
fn fmt_segment_point(f: &mut fmt::Formatter<'_>, start: &Rational, end: &Rational) -> fmt::Result {
    let slope = end.try_sub(start).map_err(|_| fmt::Error)?;
    if slope.is_zero() {
        return write!(f, "{start}");
    }
    let magnitude = slope.abs();
    let term = if magnitude.is_one() {
        "L".to_owned()
    } else {
        format!("{magnitude}L")
    };
    match (start.is_zero(), slope.is_negative()) {
        (true, false) => write!(f, "{term}"),
        (true, true) => write!(f, "-{term}"),
        (false, false) => write!(f, "{start} + {term}"),
        (false, true) => write!(f, "{start} - {term}"),
    }
}

impl fmt::Display for SolutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zmax = Z(")?;
        for (i, value) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ") = {}", self.value)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::UniqueOptimum(record) => write!(f, "{record}"),
            Outcome::AlternateOptima { first, second } => {
                write!(f, "Zmax = Z(")?;
                let points = first.variables.iter().zip(second.variables.iter());
                for (i, (start, end)) in points.enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_segment_point(f, start, end)?;
                }
                write!(f, ") = {}\n0 <= L <= 1", first.value)
            }
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}\n{}", self.before, self.ratios, self.pivot)
    }
}

impl fmt::Display for SolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Z = {}", self.objective)?;
        writeln!(f, "Exp. Z = {}", self.expressed)?;
        for transition in &self.transitions {
            writeln!(f)?;
            writeln!(f, "{transition}")?;
        }
        writeln!(f)?;
        write!(f, "{}", self.table)?;
        writeln!(f)?;
        write!(f, "{}", self.outcome)
    }
}
