//! Field type tags and the per-field schema entries a segment definition
//! carries, matching the seven type codes the data model names: AN, N
//! (with an implied-decimal count), R, ID, DT, TM, B.

use serde::{Deserialize, Serialize};

/// The type a field's raw string content is checked and decoded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FieldType {
    /// Alphanumeric: any printable content within the length bounds.
    #[serde(rename = "AN")]
    AlphaNumeric,
    /// Integer, or an implied-decimal number when `decimals > 0` (e.g. `N2`
    /// means the last two digits are a fractional part).
    #[serde(rename = "N")]
    Numeric { decimals: u32 },
    /// Real number, explicit decimal point allowed.
    #[serde(rename = "R")]
    Real,
    /// Identifier, optionally drawn from a named code set.
    #[serde(rename = "ID")]
    Identifier,
    /// Calendar date: `YYMMDD`, `CCYYMMDD`, or an explicit `format`.
    #[serde(rename = "DT")]
    Date,
    /// Time of day: `HHMM`, `HHMMSS`, optionally with fractional seconds.
    #[serde(rename = "TM")]
    Time,
    /// Opaque binary/unvalidated content.
    #[serde(rename = "B")]
    Binary,
}

impl FieldType {
    pub fn code(&self) -> &'static str {
        match self {
            FieldType::AlphaNumeric => "AN",
            FieldType::Numeric { .. } => "N",
            FieldType::Real => "R",
            FieldType::Identifier => "ID",
            FieldType::Date => "DT",
            FieldType::Time => "TM",
            FieldType::Binary => "B",
        }
    }
}

/// One entry in a segment's (or composite's) field schema: position,
/// type, length bounds, mandatory flag, and — for composite fields — the
/// nested schema of its components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchemaEntry {
    /// 1-based position within the enclosing segment or composite.
    pub position: u32,
    pub name: String,
    pub field_type: FieldType,
    pub min_len: u32,
    pub max_len: u32,
    pub mandatory: bool,
    /// Name of a [`crate::code_set::CodeSet`] this `ID` field's value must
    /// belong to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_set_id: Option<String>,
    /// Component sub-schema, for composite fields. `None` for scalar fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<Vec<FieldSchemaEntry>>,
    /// Whether this field may repeat (X12 repetition-separated groups).
    #[serde(default)]
    pub repeatable: bool,
}

impl FieldSchemaEntry {
    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_code_matches_tag() {
        assert_eq!(FieldType::AlphaNumeric.code(), "AN");
        assert_eq!(FieldType::Numeric { decimals: 2 }.code(), "N");
        assert_eq!(FieldType::Date.code(), "DT");
    }

    #[test]
    fn scalar_entry_has_no_composite() {
        let entry = FieldSchemaEntry {
            position: 1,
            name: "Claim Status Code".into(),
            field_type: FieldType::Identifier,
            min_len: 1,
            max_len: 2,
            mandatory: true,
            code_set_id: Some("835_CLP02_CLAIM_STATUS".into()),
            composite: None,
            repeatable: false,
        };
        assert!(!entry.is_composite());
    }

    #[test]
    fn serde_roundtrip_numeric_with_decimals() {
        let entry = FieldSchemaEntry {
            position: 2,
            name: "Monetary Amount".into(),
            field_type: FieldType::Numeric { decimals: 2 },
            min_len: 1,
            max_len: 15,
            mandatory: true,
            code_set_id: None,
            composite: None,
            repeatable: false,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: FieldSchemaEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
        assert!(json.contains("\"N\""));
    }

    #[test]
    fn serde_roundtrip_composite() {
        let entry = FieldSchemaEntry {
            position: 1,
            name: "Health Care Code Information".into(),
            field_type: FieldType::AlphaNumeric,
            min_len: 0,
            max_len: 0,
            mandatory: false,
            code_set_id: None,
            composite: Some(vec![FieldSchemaEntry {
                position: 1,
                name: "Diagnosis Code Pointer".into(),
                field_type: FieldType::Identifier,
                min_len: 1,
                max_len: 3,
                mandatory: true,
                code_set_id: None,
                composite: None,
                repeatable: false,
            }]),
            repeatable: true,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: FieldSchemaEntry = serde_json::from_str(&json).unwrap();
        assert!(back.is_composite());
        assert_eq!(back.composite.unwrap()[0].name, "Diagnosis Code Pointer");
    }
}
