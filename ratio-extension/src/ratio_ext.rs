use std::{cmp::Ordering, fmt, ops::Neg};

use derive_more::{Display, Error, IsVariant};
use num_integer::Integer;
use num_rational::Ratio;
use num_traits::{Bounded, CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Zero};
use serde::{Deserialize, Serialize};

/// A bounded rational number extended with two sentinel values.
///
/// `MinusInf` and `Inf` order below and above every finite value. They mark
/// "no valid value here" in ratio tests and are rejected as operands by every
/// arithmetic operation, so a sentinel can never leak into a computed value.
#[derive(Debug, Clone, IsVariant, Serialize, Deserialize)]
pub enum RatioExt<T: Clone + Integer> {
    Inf,
    Finite(Ratio<T>),
    MinusInf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ArithmeticError {
    #[display(fmt = "division by zero")]
    DivisionByZero,
    #[display(fmt = "integer overflow in rational arithmetic")]
    Overflow,
    #[display(fmt = "infinite sentinel used as an arithmetic operand")]
    InvalidOperand,
}

impl<T> Default for RatioExt<T>
where
    T: Clone + Integer,
{
    fn default() -> Self {
        Self::zero()
    }
}

impl<T> RatioExt<T>
where
    T: Clone + Integer,
{
    #[inline]
    pub fn zero() -> Self {
        Self::Finite(Ratio::zero())
    }

    #[inline]
    pub fn one() -> Self {
        Self::Finite(Ratio::one())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Finite(ratio) if ratio.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Self::Finite(ratio) if ratio.is_one())
    }

    /// `MinusInf` counts as negative.
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Finite(ratio) => ratio.numer() < &T::zero(),
            Self::MinusInf => true,
            Self::Inf => false,
        }
    }

    /// `Inf` counts as positive.
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Finite(ratio) => ratio.numer() > &T::zero(),
            Self::Inf => true,
            Self::MinusInf => false,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !self.is_finite()
    }

    pub fn finite(self) -> Option<Ratio<T>> {
        if let Self::Finite(value) = self {
            return Some(value);
        }
        None
    }

    pub const fn finite_as_ref(&self) -> Option<&Ratio<T>> {
        if let Self::Finite(value) = self {
            return Some(value);
        }
        None
    }

    fn operands<'a>(&'a self, rhs: &'a Self) -> Result<(&'a Ratio<T>, &'a Ratio<T>), ArithmeticError> {
        match (self, rhs) {
            (Self::Finite(lhs), Self::Finite(rhs)) => Ok((lhs, rhs)),
            _ => Err(ArithmeticError::InvalidOperand),
        }
    }
}

impl<T> RatioExt<T>
where
    T: Clone + Integer + Bounded + CheckedAdd + CheckedSub + CheckedMul,
{
    /// Builds `numer / denom` in lowest terms with the sign on the numerator.
    pub fn new(numer: T, denom: T) -> Result<Self, ArithmeticError> {
        if denom.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if numer == T::min_value() || denom == T::min_value() {
            return Err(ArithmeticError::Overflow);
        }
        Ok(Self::Finite(Ratio::new(numer, denom)))
    }

    pub fn from_integer(integer: T) -> Result<Self, ArithmeticError> {
        Self::new(integer, T::one())
    }

    pub fn try_add(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        let (lhs, rhs) = self.operands(rhs)?;
        Self::bounded(lhs.checked_add(rhs))
    }

    pub fn try_sub(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        let (lhs, rhs) = self.operands(rhs)?;
        Self::bounded(lhs.checked_sub(rhs))
    }

    pub fn try_mul(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        let (lhs, rhs) = self.operands(rhs)?;
        Self::bounded(lhs.checked_mul(rhs))
    }

    pub fn try_div(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        let (lhs, rhs) = self.operands(rhs)?;
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        Self::bounded(lhs.checked_div(rhs))
    }

    // The minimum integer is kept out of both parts so that negation stays total.
    fn bounded(value: Option<Ratio<T>>) -> Result<Self, ArithmeticError> {
        match value {
            Some(ratio) if ratio.numer() != &T::min_value() && ratio.denom() != &T::min_value() => {
                Ok(Self::Finite(ratio))
            }
            _ => Err(ArithmeticError::Overflow),
        }
    }
}

impl<T> RatioExt<T>
where
    T: Clone + Integer + Neg<Output = T>,
{
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            -self.clone()
        } else {
            self.clone()
        }
    }
}

impl<T> PartialEq for RatioExt<T>
where
    T: Clone + Integer,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for RatioExt<T> where T: Clone + Integer {}

impl<T> PartialOrd for RatioExt<T>
where
    T: Clone + Integer,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for RatioExt<T>
where
    T: Clone + Integer,
{
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RatioExt::Finite(lhs), RatioExt::Finite(rhs)) => lhs.cmp(rhs),
            (RatioExt::Inf, RatioExt::Inf) | (RatioExt::MinusInf, RatioExt::MinusInf) => {
                Ordering::Equal
            }
            (RatioExt::Inf, _) | (_, RatioExt::MinusInf) => Ordering::Greater,
            (_, RatioExt::Inf) | (RatioExt::MinusInf, _) => Ordering::Less,
        }
    }
}

impl<T> From<Ratio<T>> for RatioExt<T>
where
    T: Clone + Integer,
{
    fn from(value: Ratio<T>) -> Self {
        Self::Finite(value)
    }
}

impl<T> Neg for RatioExt<T>
where
    T: Clone + Integer + Neg<Output = T>,
{
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Self::Inf => Self::MinusInf,
            Self::Finite(ratio) => Self::Finite(-ratio),
            Self::MinusInf => Self::Inf,
        }
    }
}

impl<T> Neg for &RatioExt<T>
where
    T: Clone + Integer + Neg<Output = T>,
{
    type Output = RatioExt<T>;

    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl<T> fmt::Display for RatioExt<T>
where
    T: fmt::Display + Integer + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(ratio) => write!(f, "{ratio}"),
            Self::Inf => write!(f, "Inf"),
            Self::MinusInf => write!(f, "-Inf"),
        }
    }
}
