//! Self-describing, recursive JSON shape grammars are authored in.
//! [`GrammarDef`] is the natural tree a human writes by hand; it is
//! flattened into [`crate::grammar::Grammar`]'s arena once at load time,
//! so the recursive shape never survives into the in-memory
//! representation the tree builder walks.

use serde::{Deserialize, Serialize};

use crate::cardinality::Cardinality;
use crate::code_set::CodeSetRegistry;
use crate::field_schema::FieldSchemaEntry;
use crate::node::{Node, NodeKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum GrammarDef {
    #[serde(rename = "group")]
    Group {
        name: String,
        #[serde(default = "Cardinality::unbounded_def")]
        cardinality: CardinalityDef,
        children: Vec<GrammarDef>,
        /// See [`crate::node::NodeKind::Group::hl_level_codes`].
        #[serde(default)]
        hl_level_codes: Option<Vec<String>>,
    },
    #[serde(rename = "segment")]
    Segment {
        tag: String,
        #[serde(default = "Cardinality::one_def")]
        cardinality: CardinalityDef,
        #[serde(default)]
        fields: Vec<FieldSchemaEntry>,
    },
}

/// Wire-format cardinality pair; `max: null` means unbounded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CardinalityDef {
    pub min: u32,
    pub max: Option<u32>,
}

impl From<CardinalityDef> for Cardinality {
    fn from(d: CardinalityDef) -> Self {
        Cardinality::new(d.min, d.max)
    }
}

impl Cardinality {
    fn unbounded_def() -> CardinalityDef {
        CardinalityDef { min: 0, max: None }
    }

    fn one_def() -> CardinalityDef {
        CardinalityDef { min: 1, max: Some(1) }
    }
}

/// Top-level grammar document: identity plus the root group and any
/// bundled code sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarDocument {
    pub edi_type: String,
    pub message_type: String,
    pub version: String,
    pub root: GrammarDef,
    #[serde(default)]
    pub code_sets: CodeSetRegistry,
}

/// Flattens a recursive [`GrammarDef`] tree into the arena `nodes`,
/// returning the index of the node just appended.
pub fn flatten(nodes: &mut Vec<Node>, def: &GrammarDef) -> usize {
    match def {
        GrammarDef::Segment {
            tag,
            cardinality,
            fields,
        } => {
            nodes.push(Node {
                kind: NodeKind::Segment {
                    tag: tag.clone(),
                    fields: fields.clone(),
                },
                cardinality: (*cardinality).into(),
            });
            nodes.len() - 1
        }
        GrammarDef::Group {
            name,
            cardinality,
            children,
            hl_level_codes,
        } => {
            let child_indices: Vec<usize> = children.iter().map(|c| flatten(nodes, c)).collect();
            nodes.push(Node {
                kind: NodeKind::Group {
                    name: name.clone(),
                    children: child_indices,
                    hl_level_codes: hl_level_codes.clone(),
                },
                cardinality: (*cardinality).into(),
            });
            nodes.len() - 1
        }
    }
}
