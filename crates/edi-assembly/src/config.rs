//! Tree builder configuration: the policy knobs that turn a document
//! defect into either a silently-skipped segment, an info diagnostic, or
//! an error.

/// What to do with a segment that carries a tag but no field content at
/// all (consecutive segment terminators, or a terminator followed
/// immediately by another terminator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptySegmentHandling {
    /// Drop the segment from the tree, recording [`I120_EMPTY_SKIPPED`].
    ///
    /// [`I120_EMPTY_SKIPPED`]: edi_validate::lookup_code
    #[default]
    Skip,
    /// Keep it out of the tree but record it as an error instead of an
    /// informational note.
    Error,
}

/// What to do with a segment tag that does not appear anywhere in the
/// grammar at the position it was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSegmentPolicy {
    /// Record `E303-UNKNOWN-SEGMENT` (an error).
    #[default]
    Strict,
    /// Record `W303-UNKNOWN-SEGMENT` (a warning) and keep going.
    Lenient,
}

#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub empty_segment_handling: EmptySegmentHandling,
    pub unknown_segment_policy: UnknownSegmentPolicy,
    /// Byte used as the decimal point for `R` fields (`.` for X12,
    /// typically `,` for some EDIFACT locales).
    pub decimal_mark: u8,
    /// Strict demands every field rule hold; lenient demotes length and
    /// code-set violations from error to warning.
    pub field_validation_mode: edi_validate::FieldValidationMode,
    /// Whether trailing space padding is trimmed from a component's raw
    /// bytes before it is validated and decoded. Defaults to `true`,
    /// matching how fixed-width X12 AN fields are conventionally padded
    /// on the wire; values are never padded back out on the way out.
    pub trim_trailing_spaces: bool,
    /// When set, the tree builder emits `I130-DEBUG-TRANSITION` info
    /// diagnostics tracing each decision §4.5's procedure makes (segment
    /// matched, group entered/exited, child advanced) in addition to its
    /// `tracing::trace!` spans, so a caller inspecting only the
    /// diagnostic stream can still see the state machine's path.
    pub debug: bool,
    /// §4.5 step 5 / §7: when a mandatory segment or group turns out to
    /// be missing, `true` records the diagnostic and keeps matching the
    /// rest of the enclosing group's children so every defect in the
    /// document surfaces in one pass; `false` abandons the rest of that
    /// subtree as soon as the mandatory element is found missing, so a
    /// caller that wants to stop at the first structural defect sees
    /// only that one diagnostic instead of a cascade of follow-on ones.
    pub continue_on_error: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            empty_segment_handling: EmptySegmentHandling::default(),
            unknown_segment_policy: UnknownSegmentPolicy::default(),
            decimal_mark: b'.',
            field_validation_mode: edi_validate::FieldValidationMode::default(),
            trim_trailing_spaces: true,
            debug: false,
            continue_on_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_skip_strict_dot() {
        let config = BuilderConfig::default();
        assert_eq!(config.empty_segment_handling, EmptySegmentHandling::Skip);
        assert_eq!(config.unknown_segment_policy, UnknownSegmentPolicy::Strict);
        assert_eq!(config.decimal_mark, b'.');
        assert_eq!(config.field_validation_mode, edi_validate::FieldValidationMode::Strict);
        assert!(config.trim_trailing_spaces);
        assert!(!config.debug);
        assert!(config.continue_on_error);
    }
}
