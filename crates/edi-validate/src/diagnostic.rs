//! The diagnostic data model: one record per document-level defect,
//! independent of whether it came from field validation, grammar
//! matching, or envelope-count checking.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How serious a diagnostic is. Ordered so that sorting puts the most
/// severe records first when that ordering is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        write!(f, "{s}")
    }
}

/// Which subsystem produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Delimiter,
    Structural,
    FieldValidation,
    Grammar,
    Io,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Delimiter => "delimiter",
            Category::Structural => "structural",
            Category::FieldValidation => "field_validation",
            Category::Grammar => "grammar",
            Category::Io => "io",
        };
        write!(f, "{s}")
    }
}

/// Where in the document a diagnostic applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub byte_offset: usize,
    pub line: u32,
    pub segment_tag: Option<String>,
    pub segment_index: Option<u32>,
    pub field_position: Option<u32>,
    /// Slash-delimited structural path, e.g. `2000[3]/2110[1]/SVC`.
    pub path: Option<String>,
}

impl Location {
    pub fn at_byte(byte_offset: usize, line: u32) -> Self {
        Self {
            byte_offset,
            line,
            ..Default::default()
        }
    }

    /// Depth of the structural path, used as the tie-break when sorting
    /// diagnostics that share a byte offset (shallowest first).
    pub fn depth(&self) -> usize {
        self.path
            .as_deref()
            .map(|p| p.split('/').count())
            .unwrap_or(0)
    }

    pub fn with_segment(mut self, tag: impl Into<String>, index: u32) -> Self {
        self.segment_tag = Some(tag.into());
        self.segment_index = Some(index);
        self
    }

    pub fn with_field(mut self, position: u32) -> Self {
        self.field_position = Some(position);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// One record describing a defect found in a document: a code, severity,
/// category, location, human-readable description, and optionally the
/// expected/actual values and a remediation suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub category: Category,
    pub location: Location,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<String>,
}

impl Diagnostic {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            category,
            location: Location::default(),
            description: description.into(),
            expected: None,
            actual: None,
            suggestion: None,
            raw_value: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_raw_value(mut self, raw_value: impl Into<String>) -> Self {
        self.raw_value = Some(raw_value.into());
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    pub fn is_error_or_worse(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}) at byte {}: {}",
            self.severity, self.code, self.category, self.location.byte_offset, self.description
        )
    }
}
