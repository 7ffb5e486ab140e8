mod resolver;
mod type_descriptor;

pub use resolver::*;
pub use type_descriptor::*;
