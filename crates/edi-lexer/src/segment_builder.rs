use edi_types::{RawSegment, SegmentPosition};

use crate::tokenizer::EdiTokenizer;

/// Builds [`RawSegment`] instances from raw segment strings.
///
/// Takes one tokenized segment string (e.g. `"NAD+Z04+9900123000002::293"`)
/// and splits it into a segment ID plus a three-level element/repetition/
/// component tree.
pub struct SegmentBuilder {
    tokenizer: EdiTokenizer,
}

impl SegmentBuilder {
    pub fn new(tokenizer: EdiTokenizer) -> Self {
        Self { tokenizer }
    }

    /// Parses a raw segment string (without its terminator) into a
    /// `RawSegment`. Returns `None` if the segment (or its ID) is empty.
    pub fn build<'a>(&self, segment_str: &'a str, position: SegmentPosition) -> Option<RawSegment<'a>> {
        if segment_str.is_empty() {
            return None;
        }

        let mut elements_iter = self.tokenizer.tokenize_elements(segment_str);
        let id = elements_iter.next()?;
        if id.is_empty() {
            return None;
        }

        let mut elements = Vec::new();
        for element_str in elements_iter {
            let reps: Vec<Vec<&'a str>> = self
                .tokenizer
                .tokenize_repetitions(element_str)
                .map(|rep_str| self.tokenizer.tokenize_components(rep_str).collect())
                .collect();
            elements.push(reps);
        }

        Some(RawSegment::new(id, elements, position))
    }
}
