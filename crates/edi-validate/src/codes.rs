//! Fixed catalogue of diagnostic codes: each one's default severity,
//! category, and a short description template callers fill in with the
//! specifics of what they saw.

use crate::diagnostic::{Category, Diagnostic, Severity};

#[derive(Debug, Clone, Copy)]
pub struct CodeInfo {
    pub code: &'static str,
    pub severity: Severity,
    pub category: Category,
    pub description: &'static str,
}

impl CodeInfo {
    /// Builds a [`Diagnostic`] from this catalogue entry's defaults.
    /// Callers attach location/expected/actual/suggestion afterward.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code, self.severity, self.category, self.description)
    }

    /// Builds a [`Diagnostic`] with `severity` overriding the catalogue
    /// default, for codes whose severity is mode-dependent (lenient vs.
    /// strict field validation).
    pub fn diagnostic_at(&self, severity: Severity) -> Diagnostic {
        Diagnostic::new(self.code, severity, self.category, self.description)
    }
}

macro_rules! codes {
    ($($const_name:ident => ($code:literal, $severity:expr, $category:expr, $description:literal)),* $(,)?) => {
        $(
            pub const $const_name: CodeInfo = CodeInfo {
                code: $code,
                severity: $severity,
                category: $category,
                description: $description,
            };
        )*

        pub fn lookup(code: &str) -> Option<CodeInfo> {
            match code {
                $($code => Some($const_name),)*
                _ => None,
            }
        }
    };
}

codes! {
    E001_DELIM_ISA => ("E001-DELIM-ISA", Severity::Fatal, Category::Delimiter,
        "the envelope prefix could not be parsed into a delimiter set"),
    E002_DELIM_COLLISION => ("E002-DELIM-COLLISION", Severity::Fatal, Category::Delimiter,
        "two delimiter roles were assigned the same byte"),
    E003_INPUT_TOO_LARGE => ("E003-INPUT-TOO-LARGE", Severity::Fatal, Category::Io,
        "input exceeds the configured size cap"),
    E004_UNSUPPORTED_CHARSET => ("E004-UNSUPPORTED-CHARSET", Severity::Fatal, Category::Io,
        "the requested input charset is not supported"),
    E010_SEG_UNTERMINATED => ("E010-SEG-UNTERMINATED", Severity::Error, Category::Structural,
        "segment has no terminator before end of input"),
    E011_SEG_EMPTY => ("E011-SEG-EMPTY", Severity::Error, Category::Structural,
        "segment carries a tag but no field content"),
    E012_SEG_INVALID_UTF8 => ("E012-SEG-INVALID-UTF8", Severity::Error, Category::Structural,
        "segment bytes are not valid UTF-8"),
    E110_FIELD_MISSING => ("E110-FIELD-MISSING", Severity::Error, Category::FieldValidation,
        "a mandatory field is empty or absent"),
    E111_FIELD_CHARSET => ("E111-FIELD-CHARSET", Severity::Error, Category::FieldValidation,
        "field contains a control character outside the allowed set"),
    E112_FIELD_LENGTH => ("E112-FIELD-LENGTH", Severity::Error, Category::FieldValidation,
        "field length falls outside its declared minimum/maximum"),
    E113_FIELD_NOT_NUMERIC => ("E113-FIELD-NOT-NUMERIC", Severity::Error, Category::FieldValidation,
        "field does not match its declared numeric (N/N*k*) type"),
    E114_FIELD_NOT_REAL => ("E114-FIELD-NOT-REAL", Severity::Error, Category::FieldValidation,
        "field does not match its declared real (R) type"),
    E120_DATE_INVALID => ("E120-DATE-INVALID", Severity::Error, Category::FieldValidation,
        "field is not a valid calendar date"),
    E121_TIME_INVALID => ("E121-TIME-INVALID", Severity::Error, Category::FieldValidation,
        "field is not a valid time of day"),
    E130_COMPOSITE_ARITY_MISMATCH => ("E130-COMPOSITE-ARITY-MISMATCH", Severity::Warning, Category::FieldValidation,
        "composite field has more components than its schema defines"),
    E201_CODE_UNKNOWN => ("E201-CODE-UNKNOWN", Severity::Error, Category::FieldValidation,
        "identifier value is not a member of its code set"),
    E210_HL_ORPHAN_PARENT => ("E210-HL-ORPHAN-PARENT", Severity::Error, Category::Structural,
        "HL segment references a parent ID that was never declared"),
    E301_STRUCT_MISSING => ("E301-STRUCT-MISSING", Severity::Error, Category::Grammar,
        "a mandatory segment or group did not occur"),
    E302_STRUCT_TRAILING => ("E302-STRUCT-TRAILING", Severity::Error, Category::Grammar,
        "segment occurred at a position the grammar could not reach"),
    E303_SEG_UNKNOWN => ("E303-SEG-UNKNOWN", Severity::Error, Category::Grammar,
        "segment tag does not appear anywhere in the grammar at this position"),
    W303_SEG_UNKNOWN => ("W303-SEG-UNKNOWN", Severity::Warning, Category::Grammar,
        "segment tag does not appear anywhere in the grammar at this position (lenient mode)"),
    E304_STRUCT_UNDERCOUNT => ("E304-STRUCT-UNDERCOUNT", Severity::Error, Category::Grammar,
        "a segment or group occurred fewer times than its declared minimum"),
    E310_COUNT_MISMATCH => ("E310-COUNT-MISMATCH", Severity::Error, Category::Structural,
        "trailer segment count does not match the number of segments actually seen"),
    E311_CONTROL_MISMATCH => ("E311-CONTROL-MISMATCH", Severity::Error, Category::Structural,
        "header and trailer control numbers do not match"),
    W320_MESSAGE_TYPE_MISMATCH => ("W320-MESSAGE-TYPE-MISMATCH", Severity::Warning, Category::Structural,
        "document did not contain a message of the type the caller requested"),
    I120_EMPTY_SKIPPED => ("I120-EMPTY-SKIPPED", Severity::Info, Category::Structural,
        "empty segment was skipped per the configured empty-segment policy"),
    I130_DEBUG_TRANSITION => ("I130-DEBUG-TRANSITION", Severity::Info, Category::Structural,
        "tree builder state transition (emitted only when debug mode is enabled)"),
}
