use edi_types::SegmentPosition;

/// Errors that can occur while lexing an X12 or EDIFACT document.
///
/// These are distinct from the diagnostic records a validator or tree
/// builder emits: a `ParseError` means the input could not even be
/// tokenized into segments, not that a segment failed validation.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The envelope prefix (`ISA`/`UNA`/`UNB`) could not be parsed into a
    /// delimiter set.
    #[error("invalid envelope at byte {offset}: {source}")]
    InvalidEnvelope {
        offset: usize,
        #[source]
        source: edi_types::DelimiterError,
    },

    /// A segment was not properly terminated.
    #[error("unterminated segment at byte {offset}")]
    UnterminatedSegment { offset: usize },

    /// The input ended unexpectedly (e.g. inside an open interchange).
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The input contains invalid UTF-8.
    #[error("invalid UTF-8 at byte {offset}: {source}")]
    InvalidUtf8 {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    /// A segment ID could not be determined.
    #[error("empty segment ID at byte {offset}")]
    EmptySegmentId { offset: usize },

    /// The handler returned `Control::Stop`.
    #[error("parsing stopped by handler at {position}")]
    StoppedByHandler { position: SegmentPosition },

    /// Input exceeded the configured size cap before lexing began.
    #[error("input size {actual} bytes exceeds the configured cap of {limit} bytes")]
    InputTooLarge { actual: usize, limit: usize },
}
