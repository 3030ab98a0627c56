pub mod command;
pub mod elimination;
mod helpers;
pub mod matrix;
pub mod simplex;

pub use ratio_extension::ArithmeticError;

/// Exact rational with `Inf`/`MinusInf` sentinels, used for every value the
/// solver computes.
pub type Rational = ratio_extension::Rational64Ext;
