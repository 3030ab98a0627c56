use std::fmt;

use crate::Rational;

#[macro_export]
macro_rules! dbg_display {
    ($e: expr) => {{
        let val = $e;
        log::debug!(
            "[{}/{}:{}] {} = {}",
            file!(),
            line!(),
            column!(),
            stringify!($e),
            val
        );
        val
    }};
}

/// Writes `c0 + c1x1 - c2x2 ...`, where index 0 is the constant term.
/// Zero terms are skipped and unit coefficients are not printed.
pub(crate) fn fmt_linear<'a, I>(f: &mut fmt::Formatter<'_>, terms: I) -> fmt::Result
where
    I: IntoIterator<Item = (usize, &'a Rational)>,
{
    let mut empty = true;
    for (index, coefficient) in terms.into_iter().filter(|(_, c)| !c.is_zero()) {
        let magnitude = coefficient.abs();
        match (empty, coefficient.is_negative()) {
            (true, true) => write!(f, "-")?,
            (true, false) => {}
            (false, true) => write!(f, " - ")?,
            (false, false) => write!(f, " + ")?,
        }
        match index {
            0 => write!(f, "{magnitude}")?,
            _ if magnitude.is_one() => write!(f, "x{index}")?,
            _ => write!(f, "{magnitude}x{index}")?,
        }
        empty = false;
    }
    if empty {
        write!(f, "0")?;
    }
    Ok(())
}
