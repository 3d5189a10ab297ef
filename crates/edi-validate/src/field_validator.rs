//! Validates raw field content against a [`FieldSchemaEntry`], producing
//! a decoded [`FieldValue`] plus any diagnostics.

use chrono::{NaiveDate, NaiveTime};
use edi_grammar::{CodeSetRegistry, FieldSchemaEntry, FieldType};

use crate::codes;
use crate::diagnostic::{Diagnostic, Location, Severity};
use crate::field_value::FieldValue;

/// How strictly field content is checked. Mirrors the public API's
/// `field_validation_mode` option (§4.7): in lenient mode, length
/// violations and code-list misses demote from `error` to `warning`
/// rather than disappearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldValidationMode {
    #[default]
    Strict,
    Lenient,
}

impl FieldValidationMode {
    fn demote(self, severity: Severity) -> Severity {
        match self {
            FieldValidationMode::Strict => severity,
            FieldValidationMode::Lenient if severity == Severity::Error => Severity::Warning,
            FieldValidationMode::Lenient => severity,
        }
    }
}

/// Validates the components of one field occurrence (a single component
/// slice for a scalar field, several for a composite) against `schema`,
/// returning the decoded value (if decodable) and any diagnostics.
pub fn validate_components(
    components: &[&str],
    schema: &FieldSchemaEntry,
    code_sets: &CodeSetRegistry,
    location: &Location,
    decimal_mark: u8,
    mode: FieldValidationMode,
) -> (Option<FieldValue>, Vec<Diagnostic>) {
    if let Some(sub_schema) = &schema.composite {
        return validate_composite(components, sub_schema, code_sets, location, decimal_mark, mode);
    }
    let raw = components.first().copied().unwrap_or("");
    validate_scalar(raw, schema, code_sets, location, decimal_mark, mode)
}

fn validate_composite(
    components: &[&str],
    sub_schema: &[FieldSchemaEntry],
    code_sets: &CodeSetRegistry,
    location: &Location,
    decimal_mark: u8,
    mode: FieldValidationMode,
) -> (Option<FieldValue>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    if components.len() > sub_schema.len() {
        diagnostics.push(
            codes::E130_COMPOSITE_ARITY_MISMATCH
                .diagnostic()
                .with_location(location.clone())
                .with_expected(sub_schema.len().to_string())
                .with_actual(components.len().to_string()),
        );
    }

    let mut values = Vec::with_capacity(sub_schema.len());
    for (index, entry) in sub_schema.iter().enumerate() {
        let component = components.get(index).copied().unwrap_or("");
        let field_location = location.clone().with_field(entry.position);
        let (value, mut sub_diags) =
            validate_scalar(component, entry, code_sets, &field_location, decimal_mark, mode);
        diagnostics.append(&mut sub_diags);
        if let Some(value) = value {
            values.push(value);
        }
    }
    (Some(FieldValue::Composite(values)), diagnostics)
}

/// Control characters allowed inside an AN value: tab and space. Every
/// other C0 control byte (0x00-0x1F except tab/space, and 0x7F) is
/// rejected by `E111-FIELD-CHARSET`.
fn has_disallowed_control_char(raw: &str) -> bool {
    raw.chars().any(|c| (c.is_control()) && c != '\t')
}

fn validate_scalar(
    raw: &str,
    schema: &FieldSchemaEntry,
    code_sets: &CodeSetRegistry,
    location: &Location,
    decimal_mark: u8,
    mode: FieldValidationMode,
) -> (Option<FieldValue>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    if raw.is_empty() {
        if schema.mandatory {
            diagnostics.push(
                codes::E110_FIELD_MISSING
                    .diagnostic()
                    .with_location(location.clone())
                    .with_expected(format!("a value for {}", schema.name)),
            );
        }
        return (None, diagnostics);
    }

    if schema.field_type == FieldType::AlphaNumeric && has_disallowed_control_char(raw) {
        diagnostics.push(
            codes::E111_FIELD_CHARSET
                .diagnostic()
                .with_location(location.clone())
                .with_actual(format!("{raw:?}"))
                .with_raw_value(raw),
        );
    }

    let len = raw.chars().count() as u32;
    let length_ok = (schema.min_len == 0 || len >= schema.min_len) && (schema.max_len == 0 || len <= schema.max_len);
    if !length_ok {
        diagnostics.push(
            codes::E112_FIELD_LENGTH
                .diagnostic_at(mode.demote(Severity::Error))
                .with_location(location.clone())
                .with_expected(format!("{}..{} characters", schema.min_len, schema.max_len))
                .with_actual(len.to_string())
                .with_raw_value(raw)
                .with_suggestion(format!(
                    "pad or truncate '{raw}' to the declared length range"
                )),
        );
    }

    let value = decode(raw, schema, code_sets, location, decimal_mark, mode, &mut diagnostics);
    (value, diagnostics)
}

#[allow(clippy::too_many_arguments)]
fn decode(
    raw: &str,
    schema: &FieldSchemaEntry,
    code_sets: &CodeSetRegistry,
    location: &Location,
    decimal_mark: u8,
    mode: FieldValidationMode,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<FieldValue> {
    match schema.field_type {
        FieldType::AlphaNumeric => Some(FieldValue::AlphaNumeric(raw.to_string())),
        FieldType::Binary => Some(FieldValue::Binary(raw.to_string())),
        FieldType::Identifier => {
            if let Some(set_id) = &schema.code_set_id {
                if code_sets.contains_code(set_id, raw) == Some(false) {
                    diagnostics.push(
                        codes::E201_CODE_UNKNOWN
                            .diagnostic_at(mode.demote(Severity::Error))
                            .with_location(location.clone())
                            .with_expected(format!("a member of code set {set_id}"))
                            .with_actual(raw)
                            .with_raw_value(raw)
                            .with_suggestion(format!("replace '{raw}' with a value from {set_id}")),
                    );
                }
            }
            Some(FieldValue::Identifier(raw.to_string()))
        }
        FieldType::Numeric { decimals } => match decode_numeric(raw) {
            Some(value) => Some(FieldValue::Numeric { value, decimals }),
            None => {
                diagnostics.push(
                    codes::E113_FIELD_NOT_NUMERIC
                        .diagnostic()
                        .with_location(location.clone())
                        .with_expected(format!("N{decimals}"))
                        .with_actual(raw)
                        .with_raw_value(raw),
                );
                None
            }
        },
        FieldType::Real => match decode_real(raw, decimal_mark) {
            Some(value) => Some(FieldValue::Real(value)),
            None => {
                diagnostics.push(
                    codes::E114_FIELD_NOT_REAL
                        .diagnostic()
                        .with_location(location.clone())
                        .with_expected("R")
                        .with_actual(raw)
                        .with_raw_value(raw),
                );
                None
            }
        },
        FieldType::Date => match decode_date(raw) {
            Some(date) => Some(FieldValue::Date(date)),
            None => {
                diagnostics.push(
                    codes::E120_DATE_INVALID
                        .diagnostic()
                        .with_location(location.clone())
                        .with_expected("YYMMDD or CCYYMMDD, a valid calendar date")
                        .with_actual(raw)
                        .with_raw_value(raw),
                );
                None
            }
        },
        FieldType::Time => match decode_time(raw) {
            Some(time) => Some(FieldValue::Time(time)),
            None => {
                diagnostics.push(
                    codes::E121_TIME_INVALID
                        .diagnostic()
                        .with_location(location.clone())
                        .with_expected("HHMM or HHMMSS[.fraction]")
                        .with_actual(raw)
                        .with_raw_value(raw),
                );
                None
            }
        },
    }
}

/// Accepts an optional leading sign and an all-digit remainder; the
/// decimal point itself is implied by the schema, not written in the
/// wire value, so a literal `.` is rejected here (that's `R`, not `N`).
fn decode_numeric(raw: &str) -> Option<i64> {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().map(|v| v * sign)
}

fn decode_real(raw: &str, decimal_mark: u8) -> Option<f64> {
    let normalized = if decimal_mark != b'.' {
        raw.replace(decimal_mark as char, ".")
    } else {
        raw.to_string()
    };
    normalized.parse::<f64>().ok()
}

/// Accepts `YYMMDD` (6 digits) or `CCYYMMDD` (8 digits), calendar-checked.
fn decode_date(raw: &str) -> Option<NaiveDate> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match raw.len() {
        8 => {
            let year: i32 = raw[0..4].parse().ok()?;
            let month: u32 = raw[4..6].parse().ok()?;
            let day: u32 = raw[6..8].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        6 => {
            let yy: i32 = raw[0..2].parse().ok()?;
            let month: u32 = raw[2..4].parse().ok()?;
            let day: u32 = raw[4..6].parse().ok()?;
            // X12 two-digit year convention: 00-49 -> 2000s, 50-99 -> 1900s.
            let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        _ => None,
    }
}

/// Accepts `HHMM` or `HHMMSS`, with an optional `.` plus fractional
/// seconds digits, calendar-checked (0-23 hours, 0-59 minutes/seconds).
fn decode_time(raw: &str) -> Option<NaiveTime> {
    let (whole, fraction) = match raw.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (raw, None),
    };
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hour, minute, second): (u32, u32, u32) = match whole.len() {
        4 => (whole[0..2].parse().ok()?, whole[2..4].parse().ok()?, 0),
        6 => (
            whole[0..2].parse().ok()?,
            whole[2..4].parse().ok()?,
            whole[4..6].parse().ok()?,
        ),
        _ => return None,
    };
    let nanos = match fraction {
        Some(f) if !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()) => {
            let micros: u32 = format!("{:0<9}", f).get(0..9)?.parse().ok()?;
            micros
        }
        Some(_) => return None,
        None => 0,
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Location;
    use edi_grammar::{CodeSet, CodeSetRegistry};

    fn scalar_schema(field_type: FieldType, min: u32, max: u32, mandatory: bool) -> FieldSchemaEntry {
        FieldSchemaEntry {
            position: 1,
            name: "Test Field".into(),
            field_type,
            min_len: min,
            max_len: max,
            mandatory,
            code_set_id: None,
            composite: None,
            repeatable: false,
        }
    }

    fn loc() -> Location {
        Location::at_byte(0, 1)
    }

    fn validate(
        components: &[&str],
        schema: &FieldSchemaEntry,
        registry: &CodeSetRegistry,
    ) -> (Option<FieldValue>, Vec<Diagnostic>) {
        validate_components(components, schema, registry, &loc(), b'.', FieldValidationMode::Strict)
    }

    #[test]
    fn empty_mandatory_field_emits_e110() {
        let schema = scalar_schema(FieldType::AlphaNumeric, 1, 10, true);
        let (value, diags) = validate(&[""], &schema, &CodeSetRegistry::new());
        assert!(value.is_none());
        assert_eq!(diags[0].code, "E110-FIELD-MISSING");
    }

    #[test]
    fn empty_optional_field_is_silently_absent() {
        let schema = scalar_schema(FieldType::AlphaNumeric, 1, 10, false);
        let (value, diags) = validate(&[""], &schema, &CodeSetRegistry::new());
        assert!(value.is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn too_short_and_too_long_both_emit_field_length() {
        let schema = scalar_schema(FieldType::AlphaNumeric, 3, 5, true);
        let (_, short_diags) = validate(&["ab"], &schema, &CodeSetRegistry::new());
        assert_eq!(short_diags[0].code, "E112-FIELD-LENGTH");
        assert!(short_diags[0].expected.as_deref() == Some("3..5 characters"));

        let (_, long_diags) = validate(&["abcdef"], &schema, &CodeSetRegistry::new());
        assert_eq!(long_diags[0].code, "E112-FIELD-LENGTH");
    }

    #[test]
    fn lenient_mode_demotes_length_violation_to_warning() {
        let schema = scalar_schema(FieldType::AlphaNumeric, 3, 5, true);
        let (_, diags) =
            validate_components(&["ab"], &schema, &CodeSetRegistry::new(), &loc(), b'.', FieldValidationMode::Lenient);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn control_char_in_an_field_emits_charset_violation() {
        let schema = scalar_schema(FieldType::AlphaNumeric, 1, 10, true);
        let (_, diags) = validate(&["AB\u{0007}CD"], &schema, &CodeSetRegistry::new());
        assert!(diags.iter().any(|d| d.code == "E111-FIELD-CHARSET"));
    }

    #[test]
    fn tab_is_not_a_charset_violation() {
        let schema = scalar_schema(FieldType::AlphaNumeric, 1, 10, true);
        let (_, diags) = validate(&["AB\tCD"], &schema, &CodeSetRegistry::new());
        assert!(!diags.iter().any(|d| d.code == "E111-FIELD-CHARSET"));
    }

    #[test]
    fn numeric_parses_implied_decimal() {
        let schema = scalar_schema(FieldType::Numeric { decimals: 2 }, 1, 18, true);
        let (value, diags) = validate(&["1050"], &schema, &CodeSetRegistry::new());
        assert!(diags.is_empty());
        assert_eq!(value.unwrap().as_decimal(), Some(10.5));
    }

    #[test]
    fn numeric_rejects_non_digit_content() {
        let schema = scalar_schema(FieldType::Numeric { decimals: 0 }, 1, 10, true);
        let (value, diags) = validate(&["12A4"], &schema, &CodeSetRegistry::new());
        assert!(value.is_none());
        assert_eq!(diags[0].code, "E113-FIELD-NOT-NUMERIC");
    }

    #[test]
    fn numeric_accepts_negative_sign() {
        let schema = scalar_schema(FieldType::Numeric { decimals: 0 }, 1, 10, true);
        let (value, _) = validate(&["-42"], &schema, &CodeSetRegistry::new());
        assert_eq!(value.unwrap().as_decimal(), Some(-42.0));
    }

    #[test]
    fn real_honors_custom_decimal_mark() {
        let schema = scalar_schema(FieldType::Real, 1, 10, true);
        let (value, diags) =
            validate_components(&["12,5"], &schema, &CodeSetRegistry::new(), &loc(), b',', FieldValidationMode::Strict);
        assert!(diags.is_empty());
        assert_eq!(value.unwrap().as_decimal(), Some(12.5));
    }

    #[test]
    fn real_rejects_non_numeric_content() {
        let schema = scalar_schema(FieldType::Real, 1, 10, true);
        let (value, diags) = validate(&["abc"], &schema, &CodeSetRegistry::new());
        assert!(value.is_none());
        assert_eq!(diags[0].code, "E114-FIELD-NOT-REAL");
    }

    #[test]
    fn identifier_checks_code_set_membership() {
        let mut registry = CodeSetRegistry::new();
        registry.insert(CodeSet::new("STATUS", ["1".into(), "2".into()]));
        let mut schema = scalar_schema(FieldType::Identifier, 1, 2, true);
        schema.code_set_id = Some("STATUS".into());

        let (_, ok_diags) = validate(&["1"], &schema, &registry);
        assert!(ok_diags.is_empty());

        let (_, bad_diags) = validate(&["99"], &schema, &registry);
        assert_eq!(bad_diags[0].code, "E201-CODE-UNKNOWN");
        assert_eq!(bad_diags[0].severity, Severity::Error);
    }

    #[test]
    fn lenient_mode_demotes_code_set_violation_to_warning() {
        let mut registry = CodeSetRegistry::new();
        registry.insert(CodeSet::new("STATUS", ["1".into()]));
        let mut schema = scalar_schema(FieldType::Identifier, 1, 2, true);
        schema.code_set_id = Some("STATUS".into());

        let (_, diags) = validate_components(
            &["99"],
            &schema,
            &registry,
            &loc(),
            b'.',
            FieldValidationMode::Lenient,
        );
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn date_accepts_ccyymmdd_and_rejects_invalid_calendar_date() {
        let schema = scalar_schema(FieldType::Date, 8, 8, true);
        let (value, diags) = validate(&["20250228"], &schema, &CodeSetRegistry::new());
        assert!(diags.is_empty());
        assert!(value.is_some());

        let (value, diags) = validate(&["20250230"], &schema, &CodeSetRegistry::new());
        assert!(value.is_none());
        assert_eq!(diags[0].code, "E120-DATE-INVALID");
    }

    #[test]
    fn date_accepts_two_digit_year_pivot() {
        let schema = scalar_schema(FieldType::Date, 6, 6, true);
        let (value, _) = validate(&["250101"], &schema, &CodeSetRegistry::new());
        assert_eq!(value.unwrap(), FieldValue::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));

        let (value, _) = validate(&["990101"], &schema, &CodeSetRegistry::new());
        assert_eq!(value.unwrap(), FieldValue::Date(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
    }

    #[test]
    fn time_accepts_hhmmss_with_fractional_seconds() {
        let schema = scalar_schema(FieldType::Time, 4, 15, true);
        let (value, diags) = validate(&["235959.5"], &schema, &CodeSetRegistry::new());
        assert!(diags.is_empty());
        assert!(value.is_some());
    }

    #[test]
    fn time_rejects_out_of_range_hour() {
        let schema = scalar_schema(FieldType::Time, 4, 6, true);
        let (value, diags) = validate(&["2500"], &schema, &CodeSetRegistry::new());
        assert!(value.is_none());
        assert_eq!(diags[0].code, "E121-TIME-INVALID");
    }

    #[test]
    fn composite_recurses_into_sub_schema() {
        let sub = vec![
            scalar_schema(FieldType::Identifier, 1, 3, true),
            scalar_schema(FieldType::AlphaNumeric, 1, 30, true),
        ];
        let mut schema = scalar_schema(FieldType::AlphaNumeric, 0, 0, false);
        schema.composite = Some(sub);

        let (value, diags) = validate(&["ABK", "J0300"], &schema, &CodeSetRegistry::new());
        assert!(diags.is_empty());
        match value.unwrap() {
            FieldValue::Composite(parts) => assert_eq!(parts.len(), 2),
            _ => panic!("expected composite"),
        }
    }

    #[test]
    fn date_decode_then_encode_round_trips_to_canonical_ccyymmdd() {
        let schema = scalar_schema(FieldType::Date, 6, 6, true);
        let (value, _) = validate(&["250101"], &schema, &CodeSetRegistry::new());
        assert_eq!(value.unwrap().canonical_string(), Some("20250101".into()));
    }

    #[test]
    fn time_decode_then_encode_round_trips_to_canonical_hhmmss() {
        let schema = scalar_schema(FieldType::Time, 4, 6, true);
        let (value, _) = validate(&["0930"], &schema, &CodeSetRegistry::new());
        assert_eq!(value.unwrap().canonical_string(), Some("093000".into()));
    }

    #[test]
    fn numeric_decode_then_encode_round_trips_to_an_equal_integer() {
        let schema = scalar_schema(FieldType::Numeric { decimals: 2 }, 1, 10, true);
        let (value, _) = validate(&["0100"], &schema, &CodeSetRegistry::new());
        // leading zeros need not survive (§8); the decoded integer value does.
        assert_eq!(value.unwrap().canonical_string(), Some("100".into()));
    }

    #[test]
    fn an_value_decode_then_encode_is_the_identity() {
        let schema = scalar_schema(FieldType::AlphaNumeric, 1, 20, true);
        let (value, _) = validate(&["ACME CORP"], &schema, &CodeSetRegistry::new());
        assert_eq!(value.unwrap().canonical_string(), Some("ACME CORP".into()));
    }

    #[test]
    fn composite_flags_extra_components_as_arity_mismatch() {
        let sub = vec![scalar_schema(FieldType::Identifier, 1, 3, true)];
        let mut schema = scalar_schema(FieldType::AlphaNumeric, 0, 0, false);
        schema.composite = Some(sub);

        let (_, diags) = validate(&["ABK", "EXTRA"], &schema, &CodeSetRegistry::new());
        assert!(diags.iter().any(|d| d.code == "E130-COMPOSITE-ARITY-MISMATCH"));
    }
}
