// document constants
pub const FIELD_SEPARATOR: &str = ".";

// view constants
pub const DEFAULT_VIEW_NAME: &str = "all";

// query constants
pub const NO_LIMIT: usize = usize::MAX;
