//! `HL` hierarchical-level loop resolution.
//!
//! X12 transactions such as 837P thread a parent/child hierarchy through
//! a flat sequence of `HL` segments rather than nesting: each `HL`
//! carries its own id, an optional parent id, and a level code, and the
//! nesting is reconstructed by following those ids rather than by
//! grammar structure. This has no counterpart in the bundled record-group
//! grammars, so it is resolved as a pass over the matched `HL` segments
//! once the tree has been assembled.

use std::collections::HashMap;

use edi_types::SegmentPosition;
use edi_validate::{codes, DiagnosticCollector, Location};

use crate::tree::AssembledSegment;

/// One `HL` segment's hierarchy fields: `HL01` (id), `HL02` (parent id,
/// empty at the top of the hierarchy), `HL03` (level code), `HL04`
/// (child code, `1` if subordinate `HL`s follow).
#[derive(Debug, Clone)]
pub struct HlRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub level_code: String,
    pub has_children: bool,
    pub position: SegmentPosition,
}

/// Resolves parent/child links across every `HL` segment in a message.
#[derive(Debug, Default)]
pub struct HlIndex {
    records: Vec<HlRecord>,
    by_id: HashMap<String, usize>,
}

impl HlIndex {
    /// Builds the index from `HL` segments in document order, recording
    /// `E210-HL-ORPHAN-PARENT` for any `HL02` that names an id no `HL`
    /// in the message ever declares.
    pub fn build(hl_segments: &[AssembledSegment<'_>], diagnostics: &mut DiagnosticCollector) -> Self {
        let mut records = Vec::with_capacity(hl_segments.len());
        let mut by_id = HashMap::with_capacity(hl_segments.len());

        for segment in hl_segments {
            let id = segment.raw.get_element(0).to_string();
            let parent_raw = segment.raw.get_element(1);
            let parent_id = if parent_raw.is_empty() {
                None
            } else {
                Some(parent_raw.to_string())
            };
            let level_code = segment.raw.get_element(2).to_string();
            let has_children = segment.raw.get_element(3) == "1";

            by_id.insert(id.clone(), records.len());
            records.push(HlRecord {
                id,
                parent_id,
                level_code,
                has_children,
                position: segment.raw.position,
            });
        }

        let index = Self { records, by_id };
        index.check_orphans(diagnostics);
        index
    }

    fn check_orphans(&self, diagnostics: &mut DiagnosticCollector) {
        for record in &self.records {
            let Some(parent_id) = &record.parent_id else {
                continue;
            };
            if self.by_id.contains_key(parent_id) {
                continue;
            }
            let location = Location::at_byte(record.position.byte_offset, record.position.line)
                .with_segment("HL", record.position.segment_number);
            diagnostics.emit(
                codes::E210_HL_ORPHAN_PARENT
                    .diagnostic()
                    .with_location(location)
                    .with_expected(format!("a declared HL with id {parent_id}"))
                    .with_actual(record.id.clone()),
            );
        }
    }

    pub fn get(&self, id: &str) -> Option<&HlRecord> {
        self.by_id.get(id).map(|&index| &self.records[index])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ancestors from the immediate parent up to the root, stopping at
    /// the first reference that doesn't resolve (already reported as an
    /// orphan by [`Self::build`]).
    pub fn parent_chain(&self, id: &str) -> Vec<&HlRecord> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|record| record.parent_id.as_deref());
        while let Some(parent_id) = current {
            match self.get(parent_id) {
                Some(record) => {
                    chain.push(record);
                    current = record.parent_id.as_deref();
                }
                None => break,
            }
        }
        chain
    }

    pub fn children_of<'s>(&'s self, id: &str) -> impl Iterator<Item = &'s HlRecord> {
        self.records.iter().filter(move |record| record.parent_id.as_deref() == Some(id))
    }

    pub fn roots(&self) -> impl Iterator<Item = &HlRecord> {
        self.records.iter().filter(|record| record.parent_id.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_types::RawSegment;

    fn hl<'a>(id: &'a str, parent: &'a str, level: &'a str, child: &'a str, number: u32) -> AssembledSegment<'a> {
        AssembledSegment {
            raw: RawSegment::new(
                "HL",
                vec![vec![vec![id]], vec![vec![parent]], vec![vec![level]], vec![vec![child]]],
                SegmentPosition::new(number, 0, number, 1),
            ),
            values: vec![],
        }
    }

    #[test]
    fn resolves_three_level_chain() {
        let segments = vec![
            hl("1", "", "20", "1", 1),
            hl("2", "1", "22", "0", 2),
            hl("3", "2", "23", "0", 3),
        ];
        let mut diagnostics = DiagnosticCollector::new();
        let index = HlIndex::build(&segments, &mut diagnostics);
        assert!(diagnostics.is_empty());

        let chain = index.parent_chain("3");
        assert_eq!(chain.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["2", "1"]);
        assert_eq!(index.roots().count(), 1);
        assert_eq!(index.get("1").unwrap().level_code, "20");
        assert!(!index.get("2").unwrap().has_children);
    }

    #[test]
    fn orphan_parent_reference_is_reported() {
        let segments = vec![hl("5", "99", "22", "0", 1)];
        let mut diagnostics = DiagnosticCollector::new();
        let index = HlIndex::build(&segments, &mut diagnostics);
        assert!(diagnostics.has_errors());
        assert!(index.parent_chain("5").is_empty());
    }

    #[test]
    fn children_of_finds_direct_descendants() {
        let segments = vec![
            hl("1", "", "20", "1", 1),
            hl("2", "1", "22", "0", 2),
            hl("3", "1", "22", "0", 3),
        ];
        let mut diagnostics = DiagnosticCollector::new();
        let index = HlIndex::build(&segments, &mut diagnostics);
        let children: Vec<&str> = index.children_of("1").map(|r| r.id.as_str()).collect();
        assert_eq!(children, vec!["2", "3"]);
    }
}
