mod document;
mod record;

pub use document::*;
pub use record::*;
