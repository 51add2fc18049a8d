pub mod address;
pub mod candidates;
pub mod resolver;

pub use address::*;
pub use candidates::*;
pub use resolver::*;
