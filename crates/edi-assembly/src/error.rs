//! Rust-level errors the tree builder raises instead of collecting as a
//! [`edi_validate::Diagnostic`] — reserved for conditions that leave the
//! builder with nothing sensible to return, as opposed to a document
//! defect it can record and keep going past.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("grammar {0} has a root group with no children")]
    EmptyGrammar(edi_grammar::GrammarId),
    #[error("no segments to assemble")]
    NoSegments,
}

/// Errors raised assembling a whole document (envelope plus the messages
/// it carries), as opposed to a single message body's tree.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid envelope at byte {offset}: {source}")]
    InvalidEnvelope {
        offset: usize,
        #[source]
        source: edi_types::DelimiterError,
    },
    #[error("segment bytes are not valid UTF-8 at byte {offset}: {source}")]
    InvalidUtf8 {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("no grammar registered for {0}")]
    GrammarNotFound(edi_grammar::GrammarId),
    #[error(transparent)]
    Build(#[from] BuildError),
}
