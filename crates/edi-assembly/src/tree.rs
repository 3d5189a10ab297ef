//! The assembled document tree: grammar nodes matched against the actual
//! segment stream, carrying both the original [`RawSegment`] and its
//! decoded field values.

use edi_grammar::NodeIndex;
use edi_types::RawSegment;
use edi_validate::FieldValue;

/// A segment as it occurred in the document, paired with the decoded
/// value of each schema field (position-aligned; `None` where the field
/// was absent or failed to decode).
#[derive(Debug, Clone)]
pub struct AssembledSegment<'a> {
    pub raw: RawSegment<'a>,
    pub values: Vec<Option<FieldValue>>,
}

impl<'a> AssembledSegment<'a> {
    pub fn value(&self, position: usize) -> Option<&FieldValue> {
        self.values.get(position).and_then(|v| v.as_ref())
    }
}

/// One occurrence of a repeating group: the ordered nodes matched during
/// that single pass through the group's children.
#[derive(Debug, Clone, Default)]
pub struct GroupInstance<'a> {
    pub nodes: Vec<TreeNode<'a>>,
}

/// A record group matched zero or more times against the grammar node at
/// `node_index`.
#[derive(Debug, Clone)]
pub struct AssembledGroup<'a> {
    pub name: String,
    pub node_index: NodeIndex,
    pub instances: Vec<GroupInstance<'a>>,
}

impl<'a> AssembledGroup<'a> {
    /// Every segment anywhere in this group's subtree, in document order
    /// — the same walk [`TreeNode::flatten_segments`] does for a single
    /// node, rooted here instead.
    pub fn flatten_segments(&self) -> Vec<&AssembledSegment<'a>> {
        let mut out = Vec::new();
        for instance in &self.instances {
            for node in &instance.nodes {
                node.collect_segments(&mut out);
            }
        }
        out
    }
}

/// One node of the assembled tree: either a matched segment or a matched
/// (possibly repeating) group.
#[derive(Debug, Clone)]
pub enum TreeNode<'a> {
    Segment(AssembledSegment<'a>),
    Group(AssembledGroup<'a>),
}

impl<'a> TreeNode<'a> {
    pub fn as_segment(&self) -> Option<&AssembledSegment<'a>> {
        match self {
            TreeNode::Segment(s) => Some(s),
            TreeNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&AssembledGroup<'a>> {
        match self {
            TreeNode::Group(g) => Some(g),
            TreeNode::Segment(_) => None,
        }
    }

    /// Depth-first walk collecting every segment in the subtree, in
    /// document order.
    pub fn flatten_segments(&self) -> Vec<&AssembledSegment<'a>> {
        let mut out = Vec::new();
        self.collect_segments(&mut out);
        out
    }

    fn collect_segments<'s>(&'s self, out: &mut Vec<&'s AssembledSegment<'a>>) {
        match self {
            TreeNode::Segment(s) => out.push(s),
            TreeNode::Group(g) => {
                for instance in &g.instances {
                    for node in &instance.nodes {
                        node.collect_segments(out);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_types::SegmentPosition;

    fn seg(tag: &str) -> AssembledSegment<'_> {
        AssembledSegment {
            raw: RawSegment::new(tag, vec![], SegmentPosition::new(1, 0, 1, 0)),
            values: vec![],
        }
    }

    #[test]
    fn flatten_segments_walks_nested_groups() {
        let tree = TreeNode::Group(AssembledGroup {
            name: "2000".into(),
            node_index: 0,
            instances: vec![GroupInstance {
                nodes: vec![
                    TreeNode::Segment(seg("HL")),
                    TreeNode::Group(AssembledGroup {
                        name: "2010".into(),
                        node_index: 1,
                        instances: vec![GroupInstance {
                            nodes: vec![TreeNode::Segment(seg("NM1"))],
                        }],
                    }),
                ],
            }],
        });

        let flat: Vec<&str> = tree.flatten_segments().iter().map(|s| s.raw.id).collect();
        assert_eq!(flat, vec!["HL", "NM1"]);
    }

    #[test]
    fn assembled_group_flatten_segments_matches_treenode_walk() {
        let group = AssembledGroup {
            name: "root".into(),
            node_index: 0,
            instances: vec![GroupInstance {
                nodes: vec![TreeNode::Segment(seg("ST")), TreeNode::Segment(seg("BPR"))],
            }],
        };
        let flat: Vec<&str> = group.flatten_segments().iter().map(|s| s.raw.id).collect();
        assert_eq!(flat, vec!["ST", "BPR"]);
    }

    #[test]
    fn as_segment_and_as_group_discriminate() {
        let node = TreeNode::Segment(seg("BPR"));
        assert!(node.as_segment().is_some());
        assert!(node.as_group().is_none());
    }
}
