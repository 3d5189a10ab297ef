use edi_types::{Control, DelimiterSet, EdiType, RawSegment};

use crate::ParseError;

/// Trait for handling streaming lexer events.
///
/// All methods have default no-op implementations; implementors override
/// only the callbacks they need.
///
/// # Event order
///
/// For X12: `on_delimiters` → `on_interchange_start` (ISA) →
/// `on_group_start` (GS) → `on_message_start` (ST) → `on_segment` (every
/// segment, including envelope/group/message markers) → `on_message_end`
/// (SE) → `on_group_end` (GE) → `on_interchange_end` (IEA).
///
/// For EDIFACT: `on_delimiters` → `on_interchange_start` (UNB) →
/// `on_message_start` (UNH) → `on_segment` → `on_message_end` (UNT) →
/// `on_interchange_end` (UNZ). `on_group_start`/`on_group_end` are never
/// called — EDIFACT has no functional-group layer.
pub trait EdiHandler {
    /// Called once, before any segment, with the detected delimiters.
    fn on_delimiters(&mut self, _edi_type: EdiType, _delimiters: &DelimiterSet, _explicit: bool) {}

    /// Called when an interchange begins (`ISA`/`UNB`).
    fn on_interchange_start(&mut self, _segment: &RawSegment) -> Control {
        Control::Continue
    }

    /// Called when a functional group begins (`GS`). X12-only.
    fn on_group_start(&mut self, _segment: &RawSegment) -> Control {
        Control::Continue
    }

    /// Called when a message/transaction set begins (`ST`/`UNH`).
    fn on_message_start(&mut self, _segment: &RawSegment) -> Control {
        Control::Continue
    }

    /// Called for every segment, including envelope/group/message markers.
    /// The specific `on_*` methods fire before `on_segment` for those tags.
    fn on_segment(&mut self, _segment: &RawSegment) -> Control {
        Control::Continue
    }

    /// Called when a message/transaction set ends (`SE`/`UNT`).
    fn on_message_end(&mut self, _segment: &RawSegment) {}

    /// Called when a functional group ends (`GE`). X12-only.
    fn on_group_end(&mut self, _segment: &RawSegment) {}

    /// Called when an interchange ends (`IEA`/`UNZ`).
    fn on_interchange_end(&mut self, _segment: &RawSegment) {}

    /// Called when a lexing error occurs. Return `Control::Continue` to
    /// attempt recovery, or `Control::Stop` to abort.
    fn on_error(&mut self, _error: ParseError) -> Control {
        Control::Stop
    }
}
