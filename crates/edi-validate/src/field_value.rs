//! The decoded form a raw field string takes once it has been checked
//! against its [`edi_grammar::FieldType`].

use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    AlphaNumeric(String),
    /// Integer value and the number of implied decimal places it carries
    /// (e.g. `1050` with `decimals = 2` means `10.50`).
    Numeric { value: i64, decimals: u32 },
    Real(f64),
    Identifier(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Binary(String),
    /// A composite field's decoded components, in schema order.
    Composite(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::AlphaNumeric(s) | FieldValue::Identifier(s) | FieldValue::Binary(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value as a decimal float, honoring the implied decimal
    /// point (e.g. `Numeric { value: 1050, decimals: 2 }` yields `10.5`).
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric { value, decimals } => {
                Some(*value as f64 / 10f64.powi(*decimals as i32))
            }
            FieldValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// The canonical wire-form string this value would decode back from,
    /// per §8's field-level round-trip property: an `AN` value is its own
    /// identity; an `N*k*` value re-encodes to its digit string (leading
    /// zeros are not preserved, matching the spec's "need not be
    /// preserved" carve-out); `DT`/`TM` re-encode to `YYYYMMDD`/`HHMMSS`
    /// regardless of which of the two accepted wire widths was decoded.
    /// Composites have no single scalar encoding and return `None`; a
    /// caller wanting one re-encodes each part and joins with the
    /// document's component separator itself.
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            FieldValue::AlphaNumeric(s) | FieldValue::Identifier(s) | FieldValue::Binary(s) => Some(s.clone()),
            FieldValue::Numeric { value, .. } => Some(value.to_string()),
            FieldValue::Real(r) => Some(format!("{r}")),
            FieldValue::Date(d) => Some(d.format("%Y%m%d").to_string()),
            FieldValue::Time(t) => Some(t.format("%H%M%S").to_string()),
            FieldValue::Composite(_) => None,
        }
    }
}
