//! Byte-level tokenization: segments, then elements, then repetitions,
//! then components. Every level applies the same release-character
//! escaping rule — a release byte causes the following byte to be taken
//! literally, never as a delimiter.

use edi_types::DelimiterSet;

/// Splits a document into segment strings and elements/repetitions/
/// components within them, honoring one [`DelimiterSet`].
#[derive(Debug, Clone, Copy)]
pub struct EdiTokenizer {
    delimiters: DelimiterSet,
}

impl EdiTokenizer {
    pub fn new(delimiters: DelimiterSet) -> Self {
        Self { delimiters }
    }

    pub fn delimiters(&self) -> &DelimiterSet {
        &self.delimiters
    }

    /// Splits raw input into segment slices (without the terminator),
    /// skipping any CR/LF between segments and dropping empty segments
    /// produced by repeated terminators.
    pub fn tokenize_segments<'a>(&self, input: &'a [u8]) -> SegmentIter<'a> {
        SegmentIter {
            input,
            pos: 0,
            delimiters: self.delimiters,
        }
    }

    /// Splits one segment's byte content (tag onward) into elements.
    pub fn tokenize_elements<'a>(&self, segment: &'a str) -> ElementIter<'a> {
        ElementIter {
            bytes: segment.as_bytes(),
            pos: 0,
            delimiters: self.delimiters,
        }
    }

    /// Splits one element string into repetitions (a field without a
    /// repetition separator yields exactly one repetition: itself).
    pub fn tokenize_repetitions<'a>(&self, element: &'a str) -> RepetitionIter<'a> {
        RepetitionIter {
            bytes: element.as_bytes(),
            pos: 0,
            delimiters: self.delimiters,
        }
    }

    /// Splits one repetition string into components (a scalar field
    /// without a component separator yields exactly one component: itself).
    pub fn tokenize_components<'a>(&self, repetition: &'a str) -> ComponentIter<'a> {
        ComponentIter {
            bytes: repetition.as_bytes(),
            pos: 0,
            delimiters: self.delimiters,
        }
    }
}

fn strip_crlf(s: &str) -> &str {
    s.trim_end_matches(['\r', '\n'])
}

/// Scans `bytes[pos..]` for the next unescaped occurrence of `sep`,
/// honoring `release` escaping. Returns the byte offset of the
/// separator, or `bytes.len()` if none is found.
fn find_unescaped(bytes: &[u8], pos: usize, sep: u8, release: u8) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        let b = bytes[i];
        if release != 0 && b == release && i + 1 < bytes.len() {
            i += 2;
            continue;
        }
        if b == sep {
            return i;
        }
        i += 1;
    }
    bytes.len()
}

/// Iterator over segment strings within a document.
pub struct SegmentIter<'a> {
    input: &'a [u8],
    pos: usize,
    delimiters: DelimiterSet,
}

impl<'a> Iterator for SegmentIter<'a> {
    /// Segment bytes, its start offset, and whether a terminator
    /// followed it — `false` only for a final segment that runs to end
    /// of input without one.
    type Item = (&'a [u8], usize, bool);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Skip leading whitespace (newlines) between segments.
            while self.pos < self.input.len()
                && (self.input[self.pos] == b'\r' || self.input[self.pos] == b'\n')
            {
                self.pos += 1;
            }
            if self.pos >= self.input.len() {
                return None;
            }
            let start = self.pos;
            let end = find_unescaped(
                self.input,
                self.pos,
                self.delimiters.segment,
                self.delimiters.release,
            );
            let terminated = end < self.input.len();
            let slice = &self.input[start..end];
            self.pos = if terminated { end + 1 } else { end };

            if slice.is_empty() {
                if terminated {
                    continue;
                }
                return None;
            }
            return Some((slice, start, terminated));
        }
    }
}

/// Iterator over element (field) strings within one segment.
pub struct ElementIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    delimiters: DelimiterSet,
}

impl<'a> Iterator for ElementIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.bytes.len() {
            return None;
        }
        let start = self.pos;
        let end = find_unescaped(
            self.bytes,
            self.pos,
            self.delimiters.field,
            self.delimiters.release,
        );
        let has_more = end < self.bytes.len();
        self.pos = if has_more { end + 1 } else { self.bytes.len() + 1 };
        let slice = std::str::from_utf8(&self.bytes[start..end]).unwrap_or("");
        Some(strip_crlf(slice))
    }
}

/// Iterator over repetition strings within one element.
pub struct RepetitionIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    delimiters: DelimiterSet,
}

impl<'a> Iterator for RepetitionIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.bytes.len() {
            return None;
        }
        let start = self.pos;
        let end = find_unescaped(
            self.bytes,
            self.pos,
            self.delimiters.repetition,
            self.delimiters.release,
        );
        let has_more = end < self.bytes.len();
        self.pos = if has_more { end + 1 } else { self.bytes.len() + 1 };
        std::str::from_utf8(&self.bytes[start..end]).ok()
    }
}

/// Iterator over component (subfield) strings within one repetition.
pub struct ComponentIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    delimiters: DelimiterSet,
}

impl<'a> Iterator for ComponentIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.bytes.len() {
            return None;
        }
        let start = self.pos;
        let end = find_unescaped(
            self.bytes,
            self.pos,
            self.delimiters.component,
            self.delimiters.release,
        );
        let has_more = end < self.bytes.len();
        self.pos = if has_more { end + 1 } else { self.bytes.len() + 1 };
        std::str::from_utf8(&self.bytes[start..end]).ok()
    }
}
