//! Delimiter discovery for the two supported wire formats.
//!
//! X12 fixes its delimiter set in the first 106 bytes of the `ISA` segment;
//! EDIFACT fixes its own (optionally) in a leading `UNA` service-string
//! advice, falling back to built-in defaults otherwise.

use core::fmt;

/// Which wire format a document uses. Determined from its first three bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdiType {
    X12,
    Edifact,
}

impl fmt::Display for EdiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdiType::X12 => write!(f, "X12"),
            EdiType::Edifact => write!(f, "EDIFACT"),
        }
    }
}

/// Failure to establish a delimiter set from the envelope prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelimiterError {
    /// `UNA` segment was present but not exactly 9 bytes long.
    InvalidUnaLength { expected: usize, actual: usize },
    /// Input did not start with a recognized `UNA`/`ISA` prefix where one was required.
    InvalidPrefix,
    /// The `ISA` segment was shorter than the fixed 106-byte envelope layout.
    IsaTooShort { actual: usize },
    /// Two delimiter roles were assigned the same byte.
    Collision { byte: u8 },
    /// Neither `ISA` nor `UNA`/EDIFACT envelope markers were recognized.
    UnrecognizedEnvelope,
}

impl fmt::Display for DelimiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelimiterError::InvalidUnaLength { expected, actual } => write!(
                f,
                "UNA segment must be exactly {expected} bytes, got {actual}"
            ),
            DelimiterError::InvalidPrefix => write!(f, "expected UNA prefix"),
            DelimiterError::IsaTooShort { actual } => {
                write!(f, "ISA segment must be at least 106 bytes, got {actual}")
            }
            DelimiterError::Collision { byte } => {
                write!(f, "delimiter byte {:#04x} assigned to more than one role", byte)
            }
            DelimiterError::UnrecognizedEnvelope => {
                write!(f, "input does not start with a recognized ISA or UNA/UNB envelope")
            }
        }
    }
}

impl std::error::Error for DelimiterError {}

/// The five (or six, for EDIFACT) single-byte delimiters that govern
/// tokenization of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterSet {
    /// Terminates a segment.
    pub segment: u8,
    /// Separates fields (elements) within a segment.
    pub field: u8,
    /// Separates subfields (components) within a composite field.
    pub component: u8,
    /// Separates repeated values within a repetition group.
    pub repetition: u8,
    /// Escapes the following byte, taking it literally.
    pub release: u8,
    /// Decimal mark used when decoding `R` (real) fields. EDIFACT-only
    /// concept in the wire format; X12 always uses `.`.
    pub decimal_mark: u8,
    /// Whether the segment terminator is followed by CR/LF that must be
    /// consumed as part of the terminator rather than leading whitespace
    /// of the next segment.
    pub trailing_newline: bool,
}

impl DelimiterSet {
    /// EDIFACT defaults per the UNCTAD/ISO 9735 service-string-advice
    /// convention, used when no `UNA` segment is present.
    pub const EDIFACT_DEFAULT: Self = Self {
        component: b':',
        field: b'+',
        decimal_mark: b'.',
        release: b'?',
        segment: b'\'',
        repetition: b'*',
        trailing_newline: false,
    };

    /// Checks that no two delimiter roles share a byte value.
    pub fn validate_no_collisions(&self) -> Result<(), DelimiterError> {
        let roles = [
            self.segment,
            self.field,
            self.component,
            self.repetition,
            self.release,
        ];
        for i in 0..roles.len() {
            for j in (i + 1)..roles.len() {
                if roles[i] == roles[j] {
                    return Err(DelimiterError::Collision { byte: roles[i] });
                }
            }
        }
        Ok(())
    }

    /// Parses a 9-byte EDIFACT `UNA` segment: `"UNA"` followed by six
    /// delimiter bytes in the order component, field, decimal, release,
    /// reserved, segment.
    pub fn from_una(una: &[u8]) -> Result<Self, DelimiterError> {
        if una.len() != 9 {
            return Err(DelimiterError::InvalidUnaLength {
                expected: 9,
                actual: una.len(),
            });
        }
        if &una[0..3] != b"UNA" {
            return Err(DelimiterError::InvalidPrefix);
        }
        Ok(Self {
            component: una[3],
            field: una[4],
            decimal_mark: una[5],
            release: una[6],
            // una[7] is reserved, unused
            segment: una[8],
            repetition: b'*',
            trailing_newline: false,
        })
    }

    /// Detects EDIFACT delimiters from the start of an input buffer.
    /// Returns `(has_explicit_una, delimiters)`.
    pub fn detect_edifact(input: &[u8]) -> (bool, Self) {
        if input.len() >= 9 && &input[0..3] == b"UNA" {
            if let Ok(d) = Self::from_una(&input[0..9]) {
                return (true, d);
            }
        }
        (false, Self::EDIFACT_DEFAULT)
    }

    /// Parses the fixed 106-byte `ISA` envelope segment of an X12 document.
    /// Field separator is the byte at offset 3; component separator at
    /// offset 104; segment terminator at offset 105; the repetition
    /// separator is read from ISA12 (offset 82) for versions >= 00402 and
    /// defaults to `^` otherwise. Trailing CR/LF after the terminator is
    /// tolerated and recorded.
    pub fn from_isa(input: &[u8]) -> Result<Self, DelimiterError> {
        const ISA_LEN: usize = 106;
        if input.len() < ISA_LEN {
            return Err(DelimiterError::IsaTooShort {
                actual: input.len(),
            });
        }
        if &input[0..3] != b"ISA" {
            return Err(DelimiterError::UnrecognizedEnvelope);
        }
        let field = input[3];
        let component = input[104];
        let segment = input[105];

        // ISA11 (1 byte, offset 82) holds the repetition separator in
        // versions >= 00402; ISA12 (5 bytes, offset 83..88) is the version.
        let version = &input[83..88];
        let repetition = if version >= b"00402" as &[u8] {
            input[82]
        } else {
            b'^'
        };

        let trailing_newline = matches!(input.get(ISA_LEN), Some(b'\r') | Some(b'\n'));

        Ok(Self {
            component,
            field,
            decimal_mark: b'.',
            release: 0, // X12 has no release character in the classic envelope
            segment,
            repetition,
            trailing_newline,
        })
    }

    /// Detects the wire format and delimiter set from the first bytes of
    /// a document. Examines only the envelope prefix (first ~200 bytes).
    pub fn detect(input: &[u8]) -> Result<(EdiType, Self, bool), DelimiterError> {
        if input.len() >= 3 && &input[0..3] == b"ISA" {
            let d = Self::from_isa(input)?;
            d.validate_no_collisions()?;
            let explicit = true;
            return Ok((EdiType::X12, d, explicit));
        }
        if input.len() >= 3 && (&input[0..3] == b"UNA" || &input[0..3] == b"UNB") {
            let (explicit_una, d) = Self::detect_edifact(input);
            d.validate_no_collisions()?;
            return Ok((EdiType::Edifact, d, explicit_una));
        }
        Err(DelimiterError::UnrecognizedEnvelope)
    }
}

impl Default for DelimiterSet {
    fn default() -> Self {
        Self::EDIFACT_DEFAULT
    }
}

impl fmt::Display for DelimiterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "component={} field={} decimal={} release={} segment={} repetition={}",
            self.component as char,
            self.field as char,
            self.decimal_mark as char,
            self.release as char,
            self.segment as char,
            self.repetition as char,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edifact_default_matches_spec() {
        let d = DelimiterSet::EDIFACT_DEFAULT;
        assert_eq!(d.component, b':');
        assert_eq!(d.field, b'+');
        assert_eq!(d.decimal_mark, b'.');
        assert_eq!(d.release, b'?');
        assert_eq!(d.segment, b'\'');
    }

    #[test]
    fn from_una_parses_standard() {
        let d = DelimiterSet::from_una(b"UNA:+.? '").unwrap();
        assert_eq!(d.component, b':');
        assert_eq!(d.field, b'+');
        assert_eq!(d.decimal_mark, b'.');
        assert_eq!(d.release, b'?');
        assert_eq!(d.segment, b'\'');
    }

    #[test]
    fn from_una_rejects_wrong_length() {
        let err = DelimiterSet::from_una(b"UNA:+.?").unwrap_err();
        assert_eq!(
            err,
            DelimiterError::InvalidUnaLength {
                expected: 9,
                actual: 7
            }
        );
    }

    #[test]
    fn from_una_rejects_wrong_prefix() {
        let err = DelimiterSet::from_una(b"XXX:+.? '").unwrap_err();
        assert_eq!(err, DelimiterError::InvalidPrefix);
    }

    #[test]
    fn detect_edifact_without_una_uses_defaults() {
        let (has_una, d) = DelimiterSet::detect_edifact(b"UNB+UNOC:3+SENDER+RECEIVER'");
        assert!(!has_una);
        assert_eq!(d, DelimiterSet::EDIFACT_DEFAULT);
    }

    #[test]
    fn detect_edifact_with_custom_una() {
        let (has_una, d) = DelimiterSet::detect_edifact(b"UNA|^.!_#UNB...");
        assert!(has_una);
        assert_eq!(d.component, b'|');
        assert_eq!(d.field, b'^');
        assert_eq!(d.segment, b'#');
    }

    fn fixed_isa(field: u8, component: u8, segment: u8, version: &[u8; 5], rep: u8) -> Vec<u8> {
        let mut buf = vec![b' '; 106];
        buf[0..3].copy_from_slice(b"ISA");
        buf[3] = field;
        buf[83..88].copy_from_slice(version);
        buf[82] = rep;
        buf[104] = component;
        buf[105] = segment;
        buf
    }

    #[test]
    fn from_isa_extracts_fixed_positions() {
        let buf = fixed_isa(b'*', b':', b'~', b"00501", b'^');
        let d = DelimiterSet::from_isa(&buf).unwrap();
        assert_eq!(d.field, b'*');
        assert_eq!(d.component, b':');
        assert_eq!(d.segment, b'~');
        assert_eq!(d.repetition, b'^');
    }

    #[test]
    fn from_isa_pre_00402_ignores_offset_82_byte() {
        // Pre-00402, offset 82 is a reserved filler, not a repetition separator;
        // the parser must fall back to the `^` default regardless of its value.
        let buf = fixed_isa(b'*', b':', b'~', b"00401", b'!');
        let d = DelimiterSet::from_isa(&buf).unwrap();
        assert_eq!(d.repetition, b'^');
    }

    #[test]
    fn from_isa_too_short_is_error() {
        let err = DelimiterSet::from_isa(b"ISA*00").unwrap_err();
        assert!(matches!(err, DelimiterError::IsaTooShort { .. }));
    }

    #[test]
    fn detect_dispatches_on_prefix() {
        let buf = fixed_isa(b'*', b':', b'~', b"00501", b'^');
        let (edi_type, _, _) = DelimiterSet::detect(&buf).unwrap();
        assert_eq!(edi_type, EdiType::X12);

        let (edi_type, _, explicit) = DelimiterSet::detect(b"UNA:+.? 'UNB+...").unwrap();
        assert_eq!(edi_type, EdiType::Edifact);
        assert!(explicit);
    }

    #[test]
    fn detect_rejects_unrecognized_envelope() {
        let err = DelimiterSet::detect(b"XYZ whatever").unwrap_err();
        assert_eq!(err, DelimiterError::UnrecognizedEnvelope);
    }

    #[test]
    fn collision_detected() {
        let buf = fixed_isa(b'*', b'*', b'~', b"00501", b'^');
        let err = DelimiterSet::detect(&buf).unwrap_err();
        assert_eq!(err, DelimiterError::Collision { byte: b'*' });
    }

    #[test]
    fn trailing_newline_after_isa_recorded() {
        let mut buf = fixed_isa(b'*', b':', b'~', b"00501", b'^');
        buf.push(b'\n');
        let d = DelimiterSet::from_isa(&buf).unwrap();
        assert!(d.trailing_newline);
    }
}
