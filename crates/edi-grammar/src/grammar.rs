use core::fmt;

use crate::code_set::CodeSetRegistry;
use crate::def::{flatten, GrammarDocument};
use crate::error::GrammarError;
use crate::node::{Node, NodeIndex};

/// Identifies a grammar: wire format, message type (e.g. `835`, `ORDERS`),
/// and version/implementation guide (e.g. `005010X221A1`, `D:96A:UN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrammarId {
    pub edi_type: String,
    pub message_type: String,
    pub version: String,
}

impl GrammarId {
    pub fn new(
        edi_type: impl Into<String>,
        message_type: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            edi_type: edi_type.into(),
            message_type: message_type.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for GrammarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.edi_type, self.message_type, self.version)
    }
}

/// A fully loaded grammar: an arena of [`Node`]s addressed by stable
/// index, plus the code sets its `ID` fields reference. Built once from a
/// [`GrammarDocument`] and never mutated afterward.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub id: GrammarId,
    nodes: Vec<Node>,
    root: NodeIndex,
    code_sets: CodeSetRegistry,
}

impl Grammar {
    pub fn from_document(doc: GrammarDocument) -> Self {
        let mut nodes = Vec::new();
        let root = flatten(&mut nodes, &doc.root);
        Self {
            id: GrammarId::new(doc.edi_type, doc.message_type, doc.version),
            nodes,
            root,
            code_sets: doc.code_sets,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let doc: GrammarDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(doc))
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.nodes[index].children()
    }

    pub fn code_sets(&self) -> &CodeSetRegistry {
        &self.code_sets
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth-first search for the first `Segment` node carrying `tag`,
    /// starting from `index`. Used by callers that need to locate a
    /// segment definition anywhere in the tree (e.g. the HL hierarchy
    /// lookup) rather than walking position-by-position.
    pub fn find_segment(&self, index: NodeIndex, tag: &str) -> Option<NodeIndex> {
        let node = self.node(index);
        if node.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag)) {
            return Some(index);
        }
        for &child in node.children() {
            if let Some(found) = self.find_segment(child, tag) {
                return Some(found);
            }
        }
        None
    }
}
