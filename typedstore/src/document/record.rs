use crate::document::Document;

/// One raw record as handed back by a store client.
///
/// Carries the document identifier the record was stored under, the optional CAS token
/// the store assigned to this revision, and the raw [Document] content. Records are
/// consumed by the materializer; the identifier of a record always wins over whatever the
/// content claims.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    id: String,
    cas: Option<u64>,
    content: Document,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, content: Document) -> Self {
        RawRecord {
            id: id.into(),
            cas: None,
            content,
        }
    }

    pub fn with_cas(id: impl Into<String>, cas: u64, content: Document) -> Self {
        RawRecord {
            id: id.into(),
            cas: Some(cas),
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cas(&self) -> Option<u64> {
        self.cas
    }

    pub fn content(&self) -> &Document {
        &self.content
    }

    /// Splits the record into its parts without cloning the content.
    pub fn into_parts(self) -> (String, Option<u64>, Document) {
        (self.id, self.cas, self.content)
    }
}
