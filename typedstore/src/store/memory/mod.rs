mod memory_store;
mod view_index;

pub use memory_store::*;
pub use view_index::{SpatialViewDefinition, ViewDefinition};
