//! Public entry point tying the lexer, grammar model, tree builder, and
//! diagnostic collector into the two operations external callers need:
//! [`api::EdiCore::parse`] and [`api::EdiCore::validate`].
//!
//! Everything below this crate — `edi-types`, `edi-lexer`, `edi-grammar`,
//! `edi-validate`, `edi-assembly` — is an internal collaborator; a caller
//! that only needs to parse or validate a document never has to name any
//! of them directly.

pub mod api;
pub mod options;

pub use api::{EdiCore, ParseResult, ParseTree, ValidateResult};
pub use options::{Charset, ParseOptions, ValidateOptions};
