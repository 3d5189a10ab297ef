//! Envelope pairing and per-message tree assembly.
//!
//! The bundled grammars model only a transaction body (`ST`..`SE` or
//! `UNH`..`UNT`); the envelope around it — interchange, functional
//! group, and message header/trailer pairs with their counts and
//! control numbers — is validated here, one layer above the grammar.
//!
//! This walks the tokenized segment stream directly with
//! [`edi_lexer::EdiTokenizer`]/[`edi_lexer::SegmentBuilder`] rather than
//! through [`edi_lexer::EdiHandler`]: that trait's callbacks take a
//! segment whose borrow is scoped to the call, so a handler can't carry
//! a [`RawSegment`] back out of a callback to hand to a tree builder
//! afterward. Building the segment list directly keeps the borrow tied
//! to the input buffer, the same way [`edi_lexer::EdiStreamParser`]
//! itself does internally.

use edi_grammar::{Grammar, GrammarCache, GrammarId};
use edi_lexer::{EdiTokenizer, SegmentBuilder};
use edi_types::{DelimiterSet, EdiType, RawSegment, SegmentPosition};
use edi_validate::{codes, DiagnosticCollector, Location};

use crate::builder::TreeBuilder;
use crate::config::BuilderConfig;
use crate::error::EnvelopeError;
use crate::hl::HlIndex;
use crate::tree::AssembledGroup;

const X12_GROUP_START: &str = "GS";
const X12_GROUP_END: &str = "GE";

/// One assembled transaction set / message, with its grammar-driven
/// tree and, for X12 transactions that carry one, the resolved `HL`
/// hierarchy (§4.5 "HL hierarchy").
pub struct AssembledMessage<'a> {
    pub message_type: String,
    pub version: String,
    pub control_number: String,
    pub tree: AssembledGroup<'a>,
    pub hl_index: HlIndex,
}

/// A whole interchange: every message found in it, in document order.
pub struct AssembledDocument<'a> {
    pub edi_type: EdiType,
    pub messages: Vec<AssembledMessage<'a>>,
}

struct PendingMessage<'a> {
    control_number: String,
    message_type: String,
    version: String,
    segments: Vec<RawSegment<'a>>,
}

/// Tokenizes `input`, validates interchange/group/message envelope
/// pairing, and assembles each message body against the grammar
/// [`GrammarCache`] has registered for its `(edi_type, message_type,
/// version)`.
pub fn assemble_document<'a>(
    input: &'a [u8],
    grammars: &GrammarCache,
    config: &BuilderConfig,
    diagnostics: &mut DiagnosticCollector,
) -> Result<AssembledDocument<'a>, EnvelopeError> {
    let (edi_type, delimiters, explicit) =
        DelimiterSet::detect(input).map_err(|source| EnvelopeError::InvalidEnvelope { offset: 0, source })?;

    let content_start = if edi_type == EdiType::Edifact && explicit { 9 } else { 0 };
    let content = &input[content_start..];

    let tokenizer = EdiTokenizer::new(delimiters);
    let seg_builder = SegmentBuilder::new(tokenizer);

    let (message_start_tag, message_end_tag) = match edi_type {
        EdiType::X12 => ("ST", "SE"),
        EdiType::Edifact => ("UNH", "UNT"),
    };
    let (interchange_start_tag, interchange_end_tag) = match edi_type {
        EdiType::X12 => ("ISA", "IEA"),
        EdiType::Edifact => ("UNB", "UNZ"),
    };

    let mut segment_number: u32 = 0;
    let mut line: u32 = 1;
    let mut lines_scanned_up_to = content_start;

    let mut interchange_control: Option<String> = None;
    let mut group_count: u32 = 0;
    let mut group_control: Option<String> = None;
    let mut group_version: Option<String> = None;
    let mut group_message_count: u32 = 0;

    let mut pending: Option<PendingMessage<'a>> = None;
    let mut messages: Vec<AssembledMessage<'a>> = Vec::new();

    for (segment_bytes, start, terminated) in tokenizer.tokenize_segments(content) {
        let byte_offset = content_start + start;
        line += content[lines_scanned_up_to - content_start..start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count() as u32;
        lines_scanned_up_to = byte_offset;

        let segment_str = std::str::from_utf8(segment_bytes)
            .map_err(|source| EnvelopeError::InvalidUtf8 { offset: byte_offset, source })?;

        segment_number += 1;
        let position = SegmentPosition::new(segment_number, byte_offset, line, 0);
        let Some(segment) = seg_builder.build(segment_str, position) else {
            segment_number -= 1;
            continue;
        };

        if !terminated {
            diagnostics.emit(
                codes::E010_SEG_UNTERMINATED
                    .diagnostic()
                    .with_location(Location::at_byte(byte_offset, line).with_segment(segment.id, segment_number)),
            );
        }

        let id_upper = segment.id.to_ascii_uppercase();

        match id_upper.as_str() {
            tag if tag == interchange_start_tag => {
                interchange_control = Some(interchange_reference(edi_type, &segment).to_string());
            }
            X12_GROUP_START => {
                group_control = Some(segment.get_element(5).to_string());
                group_version = Some(segment.get_element(7).to_string());
                group_message_count = 0;
            }
            tag if tag == message_start_tag => {
                let (message_type, edifact_version) = message_identity(edi_type, &segment);
                let (control_number, version) = match edi_type {
                    EdiType::X12 => (
                        segment.get_element(1).to_string(),
                        group_version.clone().unwrap_or_default(),
                    ),
                    EdiType::Edifact => (segment.get_element(0).to_string(), edifact_version),
                };
                pending = Some(PendingMessage {
                    control_number,
                    message_type,
                    version,
                    segments: Vec::new(),
                });
            }
            _ => {}
        }

        if let Some(message) = pending.as_mut() {
            message.segments.push(segment.clone());
        }

        if id_upper == message_end_tag {
            if let Some(message) = pending.take() {
                validate_message_trailer(edi_type, &message, &segment, segment_number, diagnostics);
                group_message_count += 1;

                let grammar_id =
                    GrammarId::new(edi_type.to_string(), message.message_type.as_str(), message.version.as_str());
                let grammar = grammars
                    .get(&grammar_id)
                    .ok_or_else(|| EnvelopeError::GrammarNotFound(grammar_id))?;
                let tree = build_message_tree(&grammar, &message.segments, config, diagnostics)?;
                let hl_segments: Vec<_> = tree
                    .flatten_segments()
                    .into_iter()
                    .filter(|segment| segment.raw.is("HL"))
                    .cloned()
                    .collect();
                let hl_index = HlIndex::build(&hl_segments, diagnostics);
                messages.push(AssembledMessage {
                    message_type: message.message_type,
                    version: message.version,
                    control_number: message.control_number,
                    tree,
                    hl_index,
                });
            }
        } else if id_upper == X12_GROUP_END {
            let expected_control = group_control.take();
            validate_count_and_control(
                "GE01",
                segment.get_element(0),
                group_message_count,
                "GE02",
                segment.get_element(1),
                expected_control.as_deref(),
                segment_number,
                diagnostics,
            );
            group_count += 1;
        } else if id_upper == interchange_end_tag {
            let expected_control = interchange_control.take();
            let actual_count = match edi_type {
                EdiType::X12 => group_count,
                EdiType::Edifact => messages.len() as u32,
            };
            let (count_field, control_field) = match edi_type {
                EdiType::X12 => ("IEA01", "IEA02"),
                EdiType::Edifact => ("UNZ01", "UNZ02"),
            };
            validate_count_and_control(
                count_field,
                segment.get_element(0),
                actual_count,
                control_field,
                segment.get_element(1),
                expected_control.as_deref(),
                segment_number,
                diagnostics,
            );
        }
    }

    Ok(AssembledDocument { edi_type, messages })
}

fn interchange_reference<'a>(edi_type: EdiType, segment: &RawSegment<'a>) -> &'a str {
    match edi_type {
        EdiType::X12 => segment.get_element(12),
        EdiType::Edifact => segment.get_element(4),
    }
}

/// `(message_type, version)` from `ST01`/`GS08` (X12) or `UNH02`'s
/// composite (EDIFACT): name, version, release, agency joined with `:`.
fn message_identity(edi_type: EdiType, segment: &RawSegment<'_>) -> (String, String) {
    match edi_type {
        EdiType::X12 => (segment.get_element(0).to_string(), String::new()),
        EdiType::Edifact => {
            let message_type = segment.get_component(1, 0).to_string();
            let version_parts: Vec<&str> = (1..4)
                .map(|i| segment.get_component(1, i))
                .take_while(|part| !part.is_empty())
                .collect();
            (message_type, version_parts.join(":"))
        }
    }
}

fn validate_message_trailer(
    edi_type: EdiType,
    message: &PendingMessage<'_>,
    trailer: &RawSegment<'_>,
    segment_number: u32,
    diagnostics: &mut DiagnosticCollector,
) {
    let actual_count = message.segments.len() as u32;
    let (count_field, control_field, trailer_control) = match edi_type {
        EdiType::X12 => ("SE01", "SE02", trailer.get_element(1)),
        EdiType::Edifact => ("UNT01", "UNT02", trailer.get_element(1)),
    };
    validate_count_and_control(
        count_field,
        trailer.get_element(0),
        actual_count,
        control_field,
        trailer_control,
        Some(message.control_number.as_str()),
        segment_number,
        diagnostics,
    );
}

#[allow(clippy::too_many_arguments)]
fn validate_count_and_control(
    count_field: &str,
    declared_count: &str,
    actual_count: u32,
    control_field: &str,
    actual_control: &str,
    expected_control: Option<&str>,
    segment_number: u32,
    diagnostics: &mut DiagnosticCollector,
) {
    let location = Location::default().with_segment("", segment_number);

    if let Ok(declared) = declared_count.parse::<u32>() {
        if declared != actual_count {
            diagnostics.emit(
                codes::E310_COUNT_MISMATCH
                    .diagnostic()
                    .with_location(location.clone())
                    .with_expected(format!("{count_field} = {actual_count}"))
                    .with_actual(declared.to_string()),
            );
        }
    }

    if let Some(expected) = expected_control {
        if !expected.is_empty() && expected != actual_control {
            diagnostics.emit(
                codes::E311_CONTROL_MISMATCH
                    .diagnostic()
                    .with_location(location)
                    .with_expected(format!("{control_field} = {expected}"))
                    .with_actual(actual_control),
            );
        }
    }
}

fn build_message_tree<'a>(
    grammar: &Grammar,
    segments: &[RawSegment<'a>],
    config: &BuilderConfig,
    diagnostics: &mut DiagnosticCollector,
) -> Result<AssembledGroup<'a>, EnvelopeError> {
    let builder = TreeBuilder::new(grammar, config.clone());
    builder.build(segments, diagnostics).map_err(EnvelopeError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_grammar::GrammarCache;

    #[test]
    fn assembles_x12_835_with_matching_envelope() {
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~BPR*I*100*C*ACH~TRN*1*X*Y~N1*PR*PAYER~N1*PE*PAYEE~SE*6*0001~GE*1*1~IEA*1*000000001~";
        let grammars = GrammarCache::with_bundled_grammars().unwrap();
        let mut diagnostics = DiagnosticCollector::new();
        let doc = assemble_document(input, &grammars, &BuilderConfig::default(), &mut diagnostics).unwrap();

        assert_eq!(doc.messages.len(), 1);
        assert_eq!(doc.messages[0].message_type, "835");
        assert_eq!(doc.messages[0].control_number, "0001");
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.snapshot());
    }

    #[test]
    fn mismatched_segment_count_emits_e310() {
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~BPR*I*100*C*ACH~TRN*1*X*Y~N1*PR*PAYER~N1*PE*PAYEE~SE*99*0001~GE*1*1~IEA*1*000000001~";
        let grammars = GrammarCache::with_bundled_grammars().unwrap();
        let mut diagnostics = DiagnosticCollector::new();
        assemble_document(input, &grammars, &BuilderConfig::default(), &mut diagnostics).unwrap();
        let snapshot = diagnostics.snapshot();
        assert!(snapshot.iter().any(|d| d.code == "E310-COUNT-MISMATCH"));
    }

    #[test]
    fn mismatched_control_number_emits_e311() {
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~BPR*I*100*C*ACH~TRN*1*X*Y~N1*PR*PAYER~N1*PE*PAYEE~SE*6*9999~GE*1*1~IEA*1*000000001~";
        let grammars = GrammarCache::with_bundled_grammars().unwrap();
        let mut diagnostics = DiagnosticCollector::new();
        assemble_document(input, &grammars, &BuilderConfig::default(), &mut diagnostics).unwrap();
        let snapshot = diagnostics.snapshot();
        assert!(snapshot.iter().any(|d| d.code == "E311-CONTROL-MISMATCH"));
    }

    #[test]
    fn missing_grammar_is_a_hard_error() {
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*999*0001~SE*2*0001~GE*1*1~IEA*1*000000001~";
        let grammars = GrammarCache::new();
        let mut diagnostics = DiagnosticCollector::new();
        let err = assemble_document(input, &grammars, &BuilderConfig::default(), &mut diagnostics).unwrap_err();
        assert!(matches!(err, EnvelopeError::GrammarNotFound(_)));
    }

    #[test]
    fn edifact_orders_roundtrips_through_envelope() {
        let input = b"UNA:+.? 'UNB+UNOC:3+SENDER+RECEIVER+210101:1200+REF001'UNH+MSG001+ORDERS:D:96A:UN'BGM+220+BG001'LIN+1'UNT+4+MSG001'UNZ+1+REF001'";
        let grammars = GrammarCache::with_bundled_grammars().unwrap();
        let mut diagnostics = DiagnosticCollector::new();
        let doc = assemble_document(input, &grammars, &BuilderConfig::default(), &mut diagnostics).unwrap();

        assert_eq!(doc.messages.len(), 1);
        assert_eq!(doc.messages[0].message_type, "ORDERS");
        assert_eq!(doc.messages[0].version, "D:96A:UN");
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.snapshot());
    }
}
