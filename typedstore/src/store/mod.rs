pub mod memory;
mod stats;
mod store_operations;

pub use stats::*;
pub use store_operations::*;
