use std::fmt::{Display, Formatter};

/// Index consistency requested for a secondary-index, spatial or projection query.
///
/// The store decides how to honor it; the bundled in-memory store refreshes its view
/// indexes before answering anything stricter than [ScanConsistency::NotBounded].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ScanConsistency {
    /// Answer from the index as it currently is, possibly missing recent writes.
    NotBounded,
    /// Wait until the index has caught up with every write made before the request.
    #[default]
    RequestPlus,
    /// Wait until the index has caught up with the writes of the requesting statement.
    StatementPlus,
}

impl ScanConsistency {
    /// Whether the index must be brought up to date before it is scanned.
    pub fn requires_fresh_index(&self) -> bool {
        !matches!(self, ScanConsistency::NotBounded)
    }
}

impl Display for ScanConsistency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanConsistency::NotBounded => write!(f, "not_bounded"),
            ScanConsistency::RequestPlus => write!(f, "request_plus"),
            ScanConsistency::StatementPlus => write!(f, "statement_plus"),
        }
    }
}
