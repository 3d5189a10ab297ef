//! Configuration surface for [`crate::parse`] and [`crate::validate`].
//!
//! Mirrors the builder pattern used throughout the teacher's validation
//! types (`ValidationIssue::with_x(mut self, ...) -> Self`): every option
//! has a sensible default and a chained setter, so callers configure
//! only what they need to change.

use edi_assembly::{BuilderConfig, EmptySegmentHandling, UnknownSegmentPolicy};
use edi_validate::FieldValidationMode;

/// Input character encoding. The core only ever decodes UTF-8 bytes;
/// anything else is rejected up front with `E004-UNSUPPORTED-CHARSET`
/// rather than silently misinterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Other(String),
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Utf8
    }
}

impl Charset {
    pub fn is_supported(&self) -> bool {
        matches!(self, Charset::Utf8)
    }
}

/// Shared configuration for both `parse` and `validate`. `ValidateOptions`
/// wraps this and forces lenient structural continuation (§4.7) on top.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub charset: Charset,
    pub field_validation_mode: FieldValidationMode,
    pub continue_on_error: bool,
    pub empty_segment_handling: EmptySegmentHandling,
    pub check_unknown_entities: bool,
    pub trim_trailing_spaces: bool,
    pub debug: bool,
    /// Input larger than this is refused with `E003-INPUT-TOO-LARGE`
    /// before lexing begins. `None` means unbounded (the default).
    pub max_input_bytes: Option<usize>,
    /// If set, a document containing no message of this type demotes
    /// `success`/`valid` with a `W320-MESSAGE-TYPE-MISMATCH` warning
    /// rather than being treated as an unrelated failure.
    pub expected_message_type: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            charset: Charset::default(),
            field_validation_mode: FieldValidationMode::default(),
            continue_on_error: true,
            empty_segment_handling: EmptySegmentHandling::default(),
            check_unknown_entities: true,
            trim_trailing_spaces: true,
            debug: false,
            max_input_bytes: None,
            expected_message_type: None,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_field_validation_mode(mut self, mode: FieldValidationMode) -> Self {
        self.field_validation_mode = mode;
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn with_empty_segment_handling(mut self, handling: EmptySegmentHandling) -> Self {
        self.empty_segment_handling = handling;
        self
    }

    pub fn with_check_unknown_entities(mut self, check: bool) -> Self {
        self.check_unknown_entities = check;
        self
    }

    pub fn with_trim_trailing_spaces(mut self, trim: bool) -> Self {
        self.trim_trailing_spaces = trim;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_input_bytes(mut self, max: Option<usize>) -> Self {
        self.max_input_bytes = max;
        self
    }

    pub fn with_expected_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.expected_message_type = Some(message_type.into());
        self
    }

    pub(crate) fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            empty_segment_handling: self.empty_segment_handling,
            unknown_segment_policy: if self.check_unknown_entities {
                UnknownSegmentPolicy::Strict
            } else {
                UnknownSegmentPolicy::Lenient
            },
            decimal_mark: b'.',
            field_validation_mode: self.field_validation_mode,
            trim_trailing_spaces: self.trim_trailing_spaces,
            debug: self.debug,
            continue_on_error: self.continue_on_error,
        }
    }
}

/// Configuration for [`crate::validate`]. Shares every knob
/// [`ParseOptions`] has, but the API always runs the tree builder in its
/// `continue_on_error` / lenient-unknown-segment recovery path so that a
/// single call surfaces every defect rather than stopping at the first
/// one — that is the whole point of a "validate, don't build" entry
/// point.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub inner: ParseOptions,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_validation_mode(mut self, mode: FieldValidationMode) -> Self {
        self.inner.field_validation_mode = mode;
        self
    }

    pub fn with_empty_segment_handling(mut self, handling: EmptySegmentHandling) -> Self {
        self.inner.empty_segment_handling = handling;
        self
    }

    pub fn with_check_unknown_entities(mut self, check: bool) -> Self {
        self.inner.check_unknown_entities = check;
        self
    }

    pub fn with_trim_trailing_spaces(mut self, trim: bool) -> Self {
        self.inner.trim_trailing_spaces = trim;
        self
    }

    pub fn with_max_input_bytes(mut self, max: Option<usize>) -> Self {
        self.inner.max_input_bytes = max;
        self
    }

    pub fn with_expected_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.inner.expected_message_type = Some(message_type.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.inner.debug = debug;
        self
    }

    pub(crate) fn builder_config(&self) -> BuilderConfig {
        // §4.7: validate always continues past structural recovery so
        // every defect in the document is surfaced in one pass,
        // regardless of what the caller set `continue_on_error` to.
        let mut config = self.inner.builder_config();
        config.unknown_segment_policy = UnknownSegmentPolicy::Lenient;
        config.continue_on_error = true;
        config
    }
}
