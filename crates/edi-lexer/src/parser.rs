#[cfg(test)]
use edi_types::Control;
use edi_types::{DelimiterSet, EdiType, RawSegment, SegmentPosition};

use crate::error::ParseError;
use crate::handler::EdiHandler;
use crate::segment_builder::SegmentBuilder;
use crate::tokenizer::EdiTokenizer;

/// Streaming X12/EDIFACT parser.
///
/// Detects the wire format and delimiters from the envelope prefix,
/// tokenizes the remaining bytes into segments, and routes each segment
/// to an [`EdiHandler`]. Envelope/group/message marker segments are
/// dispatched to their specific handler methods in addition to the
/// universal `on_segment`.
pub struct EdiStreamParser;

const X12_GROUP_START: &str = "GS";
const X12_GROUP_END: &str = "GE";

impl EdiStreamParser {
    /// Parses a document from a byte slice.
    ///
    /// `max_size_bytes`, when set, rejects input larger than the cap
    /// before any tokenization is attempted.
    pub fn parse(
        input: &[u8],
        handler: &mut dyn EdiHandler,
        max_size_bytes: Option<usize>,
    ) -> Result<(), ParseError> {
        if let Some(limit) = max_size_bytes {
            if input.len() > limit {
                return Err(ParseError::InputTooLarge {
                    actual: input.len(),
                    limit,
                });
            }
        }

        let (edi_type, delimiters, explicit) =
            DelimiterSet::detect(input).map_err(|source| ParseError::InvalidEnvelope {
                offset: 0,
                source,
            })?;
        handler.on_delimiters(edi_type, &delimiters, explicit);

        // An explicit UNA advice has no terminator of its own; its 9 bytes
        // are skipped rather than tokenized as a segment.
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
        let mut message_number: u32 = 0;
        let mut line: u32 = 1;
        let mut lines_scanned_up_to = content_start;

        for (segment_bytes, start, terminated) in tokenizer.tokenize_segments(content) {
            let byte_offset = content_start + start;
            line += content[lines_scanned_up_to - content_start..start]
                .iter()
                .filter(|&&b| b == b'\n')
                .count() as u32;
            lines_scanned_up_to = byte_offset;

            let segment_str = std::str::from_utf8(segment_bytes).map_err(|source| {
                ParseError::InvalidUtf8 {
                    offset: byte_offset,
                    source,
                }
            })?;

            segment_number += 1;
            let position = SegmentPosition::new(segment_number, byte_offset, line, message_number);

            let Some(raw_segment) = seg_builder.build(segment_str, position) else {
                segment_number -= 1;
                continue;
            };

            let id_upper = raw_segment.id.to_ascii_uppercase();

            if id_upper == message_start_tag {
                message_number += 1;
            }

            let effective_message_number = if id_upper == interchange_start_tag
                || id_upper == interchange_end_tag
                || id_upper == X12_GROUP_START
                || id_upper == X12_GROUP_END
            {
                0
            } else {
                message_number
            };
            let position =
                SegmentPosition::new(segment_number, byte_offset, line, effective_message_number);
            let raw_segment = RawSegment::new(raw_segment.id, raw_segment.elements, position);

            if id_upper == interchange_start_tag {
                if handler.on_interchange_start(&raw_segment).should_stop() {
                    return Ok(());
                }
            } else if id_upper == X12_GROUP_START {
                if handler.on_group_start(&raw_segment).should_stop() {
                    return Ok(());
                }
            } else if id_upper == message_start_tag {
                if handler.on_message_start(&raw_segment).should_stop() {
                    return Ok(());
                }
            }

            if handler.on_segment(&raw_segment).should_stop() {
                return Ok(());
            }

            if !terminated
                && handler
                    .on_error(ParseError::UnterminatedSegment { offset: byte_offset })
                    .should_stop()
            {
                return Ok(());
            }

            if id_upper == message_end_tag {
                handler.on_message_end(&raw_segment);
            } else if id_upper == X12_GROUP_END {
                handler.on_group_end(&raw_segment);
            } else if id_upper == interchange_end_tag {
                handler.on_interchange_end(&raw_segment);
            }
        }

        Ok(())
    }
}
