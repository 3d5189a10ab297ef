//! Diagnostic data model, diagnostic collector, and field-level
//! validation of raw segment content against a grammar's field schema.
//!
//! This crate draws the same line the data model draws between a Rust-level
//! parse error (the document could not be tokenized at all) and a
//! [`diagnostic::Diagnostic`] (the document tokenized fine but some piece of
//! it is invalid) — only the latter lives here, collected rather than raised.

pub mod codes;
pub mod collector;
pub mod diagnostic;
pub mod field_validator;
pub mod field_value;

pub use codes::{lookup as lookup_code, CodeInfo};
pub use collector::DiagnosticCollector;
pub use diagnostic::{Category, Diagnostic, Location, Severity};
pub use field_validator::{validate_components, FieldValidationMode};
pub use field_value::FieldValue;
