mod ratio_ext;

pub use ratio_ext::{ArithmeticError, RatioExt};

pub type Rational32Ext = RatioExt<i32>;
pub type Rational64Ext = RatioExt<i64>;
