pub mod cpmm;

pub use cpmm::*;
