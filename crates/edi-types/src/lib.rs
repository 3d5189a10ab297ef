//! Primitive types shared by every crate in this workspace: the delimiter
//! set discovered from a document's envelope, the borrowed segment
//! representation the lexer produces, and small value types (segment
//! position, streaming control signal) with no dependencies of their own.

pub mod control;
pub mod delimiters;
pub mod position;
pub mod segment;

pub use control::Control;
pub use delimiters::{DelimiterError, DelimiterSet, EdiType};
pub use position::SegmentPosition;
pub use segment::RawSegment;
