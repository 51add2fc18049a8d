pub mod pool;
pub mod raydium;
pub mod spl;
pub mod swap;

pub use pool::*;
pub use swap::*;
