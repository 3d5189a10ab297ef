//! Arena-addressed grammar tree.
//!
//! A grammar's shape is naturally recursive (a record group contains
//! segments and nested groups), but recursive data describing itself
//! invites cyclic-reference bugs once group definitions are authored by
//! hand and cross-referenced. Nodes are stored as flat value records in
//! one arena and referenced by stable [`NodeIndex`] rather than by
//! pointer or `Box`, the way [`crate::grammar::Grammar`] is built once
//! from a [`crate::def::GrammarDef`] and never mutated afterward.

use crate::cardinality::Cardinality;
use crate::field_schema::FieldSchemaEntry;

/// Index into a [`crate::grammar::Grammar`]'s node arena.
pub type NodeIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A record group: an ordered sequence of child nodes (segments or
    /// nested groups) that recur together.
    Group {
        name: String,
        children: Vec<NodeIndex>,
        /// Restricts entry/repetition of an `HL`-led group to segments
        /// whose `HL03` (hierarchical level code) is a member of this
        /// set. `None` for groups that don't open on `HL`. X12
        /// healthcare transactions thread several hierarchy levels
        /// (billing provider, subscriber, patient) through sibling
        /// groups that all open on the same `HL` tag; tag-only
        /// lookahead can't tell them apart, so the level code carried
        /// on the segment itself breaks the tie.
        hl_level_codes: Option<Vec<String>>,
    },
    /// A single segment definition: its tag and field schema.
    Segment {
        tag: String,
        fields: Vec<FieldSchemaEntry>,
    },
}

/// One arena entry: a node's kind plus the cardinality it must satisfy
/// within its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub cardinality: Cardinality,
}

impl Node {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn is_segment(&self) -> bool {
        matches!(self.kind, NodeKind::Segment { .. })
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Segment { tag, .. } => Some(tag),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Group { name, .. } => name,
            NodeKind::Segment { tag, .. } => tag,
        }
    }

    pub fn children(&self) -> &[NodeIndex] {
        match &self.kind {
            NodeKind::Group { children, .. } => children,
            NodeKind::Segment { .. } => &[],
        }
    }

    /// The `HL03` level codes this group is restricted to, if it's an
    /// `HL`-led group sharing its leading tag with sibling groups.
    pub fn hl_level_codes(&self) -> Option<&[String]> {
        match &self.kind {
            NodeKind::Group { hl_level_codes, .. } => hl_level_codes.as_deref(),
            NodeKind::Segment { .. } => None,
        }
    }

    pub fn fields(&self) -> &[FieldSchemaEntry] {
        match &self.kind {
            NodeKind::Segment { fields, .. } => fields,
            NodeKind::Group { .. } => &[],
        }
    }
}
