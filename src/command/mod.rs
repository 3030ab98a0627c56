mod compute;
mod load;

pub use compute::*;
pub use load::*;
