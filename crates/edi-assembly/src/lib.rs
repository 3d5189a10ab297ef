//! Grammar-driven tree assembly: the component that turns a tokenized
//! segment stream plus an [`edi_grammar::Grammar`] into a structured
//! document tree and a stream of structural diagnostics.
//!
//! [`builder::TreeBuilder`] matches one message body (the segments
//! between `ST`/`SE` or `UNH`/`UNT`) against a single grammar.
//! [`envelope::assemble_document`] sits one layer above it: it tokenizes
//! a whole document, validates interchange/group/message envelope
//! pairing (control numbers and segment counts), and hands each message
//! body to a [`builder::TreeBuilder`] using the grammar its
//! `(edi_type, message_type, version)` resolves to in a
//! [`edi_grammar::GrammarCache`].
//!
//! [`hl::HlIndex`] resolves the X12 `HL`-segment parent/child hierarchy
//! as a pass over a message's matched `HL` segments once its tree is
//! built — the bundled grammars have no structural representation of
//! that hierarchy, since it is addressed by id rather than nesting.

pub mod builder;
pub mod config;
pub mod envelope;
pub mod error;
pub mod hl;
pub mod tree;

pub use builder::TreeBuilder;
pub use config::{BuilderConfig, EmptySegmentHandling, UnknownSegmentPolicy};
pub use envelope::{assemble_document, AssembledDocument, AssembledMessage};
pub use error::{BuildError, EnvelopeError};
pub use hl::{HlIndex, HlRecord};
pub use tree::{AssembledGroup, AssembledSegment, GroupInstance, TreeNode};
