mod consistency;
mod filter;
mod filter_query;
mod projection;
mod query_descriptor;
mod spatial;
mod view;

pub use consistency::*;
pub use filter::*;
pub use filter_query::*;
pub use projection::*;
pub use query_descriptor::*;
pub use spatial::*;
pub use view::*;
