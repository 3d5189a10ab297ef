/// Errors raised loading or looking up a grammar. Distinct from a
/// [`crate::diagnostic`]-style record: these mean the grammar itself
/// could not be made available, not that a document failed to match it.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("malformed grammar document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("no grammar registered for {edi_type}/{message_type}/{version}")]
    NotFound {
        edi_type: String,
        message_type: String,
        version: String,
    },

    #[error("grammar {edi_type}/{message_type}/{version} is already registered")]
    AlreadyRegistered {
        edi_type: String,
        message_type: String,
        version: String,
    },
}
