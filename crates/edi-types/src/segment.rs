use core::fmt;

use crate::delimiters::DelimiterSet;
use crate::position::SegmentPosition;

/// A tokenized segment, borrowing its field data from the original input
/// buffer.
///
/// `elements[i]` holds the repetitions of element `i` (almost always a
/// single repetition); `elements[i][r]` holds the ordered components of
/// repetition `r` (almost always a single component, for a plain scalar
/// field). This three-level shape lets one structure represent the full
/// span described in the data model: empty, scalar, composite, and
/// repetition-group fields, without a tagged union per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment<'a> {
    pub id: &'a str,
    pub elements: Vec<Vec<Vec<&'a str>>>,
    pub position: SegmentPosition,
}

impl<'a> RawSegment<'a> {
    pub fn new(id: &'a str, elements: Vec<Vec<Vec<&'a str>>>, position: SegmentPosition) -> Self {
        Self {
            id,
            elements,
            position,
        }
    }

    /// Number of elements (fields) in the segment, not counting the tag.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of repetitions of element `index` (0 if the field is absent
    /// or empty; normally 1 for non-repeating fields).
    pub fn repetition_count(&self, index: usize) -> usize {
        self.elements.get(index).map(|e| e.len()).unwrap_or(0)
    }

    /// The first component of the first repetition of element `index`,
    /// or `""` if absent — the common case of reading a plain scalar
    /// field.
    pub fn get_element(&self, index: usize) -> &'a str {
        self.elements
            .get(index)
            .and_then(|reps| reps.first())
            .and_then(|comps| comps.first())
            .copied()
            .unwrap_or("")
    }

    /// Component `component_index` of the first repetition of element
    /// `element_index`, or `""` if absent.
    pub fn get_component(&self, element_index: usize, component_index: usize) -> &'a str {
        self.elements
            .get(element_index)
            .and_then(|reps| reps.first())
            .and_then(|comps| comps.get(component_index))
            .copied()
            .unwrap_or("")
    }

    /// All components of repetition `rep_index` of element `element_index`.
    pub fn get_repetition(&self, element_index: usize, rep_index: usize) -> &[&'a str] {
        self.elements
            .get(element_index)
            .and_then(|reps| reps.get(rep_index))
            .map(|comps| comps.as_slice())
            .unwrap_or(&[])
    }

    /// Case-insensitive tag comparison.
    pub fn is(&self, segment_id: &str) -> bool {
        self.id.eq_ignore_ascii_case(segment_id)
    }

    /// Re-encodes the segment to its wire form using the given delimiters.
    /// Trailing empty elements (and, within an element, trailing empty
    /// repetitions/components) are trimmed, matching how the lexer treats
    /// them on the way in; internal empty slots are preserved so that
    /// positional addressing survives the round trip.
    pub fn to_raw_string(&self, delimiters: &DelimiterSet) -> String {
        let mut elements: Vec<String> = self
            .elements
            .iter()
            .map(|reps| encode_element(reps, delimiters))
            .collect();
        while elements.last().is_some_and(|e| e.is_empty()) {
            elements.pop();
        }

        let mut out = String::from(self.id);
        for element in elements {
            out.push(delimiters.field as char);
            out.push_str(&element);
        }
        out
    }
}

fn encode_element(reps: &[Vec<&str>], delimiters: &DelimiterSet) -> String {
    let mut reps: Vec<String> = reps
        .iter()
        .map(|comps| encode_composite(comps, delimiters))
        .collect();
    while reps.last().is_some_and(|r| r.is_empty()) {
        reps.pop();
    }
    reps.join(&(delimiters.repetition as char).to_string())
}

fn encode_composite(comps: &[&str], delimiters: &DelimiterSet) -> String {
    let mut comps: Vec<&str> = comps.to_vec();
    while comps.last().is_some_and(|c| c.is_empty()) {
        comps.pop();
    }
    comps.join(&(delimiters.component as char).to_string())
}

impl fmt::Display for RawSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw_string(&DelimiterSet::EDIFACT_DEFAULT))
    }
}
