//! The two public entry points (§4.7): [`parse`] returns a tree plus
//! whatever diagnostics accumulated along the way; [`validate`] runs the
//! same pipeline purely for its diagnostics, forcing lenient structural
//! continuation so a single call surfaces every defect in the document.
//!
//! [`EdiCore`] is the boundary object callers construct once and reuse:
//! it owns the [`GrammarCache`], the one piece of state a parse needs
//! that is expensive to build and safe to share, mirroring
//! `mig_bo4e::engine::MappingEngine` owning its loaded mapping
//! definitions in the teacher.

use edi_assembly::{assemble_document, AssembledDocument, BuildError, BuilderConfig, EnvelopeError};
use edi_grammar::{Grammar, GrammarCache, GrammarError};
use edi_types::DelimiterError;
use edi_validate::{codes, Category, Diagnostic, DiagnosticCollector, Severity};

use crate::options::{Charset, ParseOptions, ValidateOptions};

/// The assembled document a successful [`parse`] returns: the whole
/// interchange, envelope validated, with one grammar-driven tree per
/// message it carried. Re-exported under this name because callers of
/// the public API think in terms of "the parsed tree", not "the
/// assembly-layer document" — the data-model term from §3, not the
/// internal component name from §4.5.
pub type ParseTree<'a> = AssembledDocument<'a>;

/// `parse(content, edi_type, message_type, options) → ParseResult` (§4.7).
#[derive(Debug)]
pub struct ParseResult<'a> {
    pub success: bool,
    pub data: Option<ParseTree<'a>>,
    pub diagnostics: Vec<Diagnostic>,
    pub message_count: usize,
}

/// `validate(content, edi_type, message_type, options) → ValidateResult` (§4.7).
#[derive(Debug)]
pub struct ValidateResult {
    pub valid: bool,
    pub error_count: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: String,
}

/// Owns the grammar cache a parse consults. Immutable once built beyond
/// registering new grammars; safe to share by reference across threads
/// per §5 ("grammar objects are immutable and may be shared freely").
#[derive(Debug, Default)]
pub struct EdiCore {
    grammars: GrammarCache,
}

impl EdiCore {
    /// An empty boundary object with no grammars registered; callers add
    /// their own with [`Self::register_grammar`].
    pub fn new() -> Self {
        Self {
            grammars: GrammarCache::new(),
        }
    }

    /// A boundary object pre-populated with the grammars bundled with
    /// this repository (X12 835, X12 837P, EDIFACT ORDERS).
    pub fn with_bundled_grammars() -> Result<Self, GrammarError> {
        Ok(Self {
            grammars: GrammarCache::with_bundled_grammars()?,
        })
    }

    /// Registers `grammar`, rejecting (rather than silently replacing) a
    /// second registration under the same edi_type/message_type/version.
    pub fn register_grammar(&mut self, grammar: Grammar) -> Result<(), GrammarError> {
        self.grammars.insert(grammar)
    }

    pub fn grammar_count(&self) -> usize {
        self.grammars.len()
    }

    /// Parses `content`, returning the assembled tree (if one could be
    /// built at all) plus every diagnostic collected along the way.
    /// `success` is `true` iff no diagnostic reached `error` severity.
    pub fn parse<'a>(&self, content: &'a [u8], options: &ParseOptions) -> ParseResult<'a> {
        let mut diagnostics = DiagnosticCollector::new();

        if let Some(diag) = check_preconditions(content, options) {
            diagnostics.emit(diag);
            return ParseResult {
                success: false,
                data: None,
                diagnostics: diagnostics.into_sorted(),
                message_count: 0,
            };
        }

        let config = options.builder_config();
        match assemble_document(content, &self.grammars, &config, &mut diagnostics) {
            Ok(document) => {
                check_expected_message_type(&document, options, &mut diagnostics);
                let message_count = document.messages.len();
                let success = !diagnostics.has_errors();
                ParseResult {
                    success,
                    data: Some(document),
                    diagnostics: diagnostics.into_sorted(),
                    message_count,
                }
            }
            Err(error) => {
                diagnostics.emit(envelope_error_diagnostic(error));
                ParseResult {
                    success: false,
                    data: None,
                    diagnostics: diagnostics.into_sorted(),
                    message_count: 0,
                }
            }
        }
    }

    /// Runs the same pipeline as [`Self::parse`], but reports only
    /// whether the document is valid and why — not the tree itself — and
    /// always continues past recoverable structural defects so every one
    /// of them is surfaced in a single call.
    pub fn validate(&self, content: &[u8], options: &ValidateOptions) -> ValidateResult {
        let mut diagnostics = DiagnosticCollector::new();

        if let Some(diag) = check_preconditions(content, &options.inner) {
            diagnostics.emit(diag);
            let sorted = diagnostics.into_sorted();
            return ValidateResult {
                valid: false,
                error_count: 1,
                summary: summarize(&sorted),
                diagnostics: sorted,
            };
        }

        let config = options.builder_config();
        match assemble_document(content, &self.grammars, &config, &mut diagnostics) {
            Ok(document) => {
                check_expected_message_type(&document, &options.inner, &mut diagnostics);
            }
            Err(error) => diagnostics.emit(envelope_error_diagnostic(error)),
        }

        let error_count = diagnostics.error_count() + sorted_fatal_count(&diagnostics);
        let sorted = diagnostics.into_sorted();
        ValidateResult {
            valid: error_count == 0,
            error_count,
            summary: summarize(&sorted),
            diagnostics: sorted,
        }
    }
}

fn sorted_fatal_count(diagnostics: &DiagnosticCollector) -> usize {
    diagnostics
        .snapshot()
        .iter()
        .filter(|d| d.severity == Severity::Fatal)
        .count()
}

/// Checks the two preconditions §5 requires hold before lexing begins:
/// a supported charset, and an input size within the configured cap.
/// Returns the fatal diagnostic to emit if either fails.
fn check_preconditions(content: &[u8], options: &ParseOptions) -> Option<Diagnostic> {
    if !options.charset.is_supported() {
        let Charset::Other(name) = &options.charset else {
            unreachable!("is_supported() is false only for Charset::Other");
        };
        return Some(
            codes::E004_UNSUPPORTED_CHARSET
                .diagnostic()
                .with_expected("utf-8")
                .with_actual(name.clone()),
        );
    }
    if let Some(limit) = options.max_input_bytes {
        if content.len() > limit {
            return Some(
                codes::E003_INPUT_TOO_LARGE
                    .diagnostic()
                    .with_expected(format!("at most {limit} bytes"))
                    .with_actual(content.len().to_string()),
            );
        }
    }
    None
}

fn check_expected_message_type(document: &ParseTree<'_>, options: &ParseOptions, diagnostics: &mut DiagnosticCollector) {
    let Some(expected) = &options.expected_message_type else {
        return;
    };
    let found = document.messages.iter().any(|m| &m.message_type == expected);
    if !found {
        diagnostics.emit(
            codes::W320_MESSAGE_TYPE_MISMATCH
                .diagnostic()
                .with_expected(expected.clone())
                .with_actual(
                    document
                        .messages
                        .iter()
                        .map(|m| m.message_type.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
        );
    }
}

fn envelope_error_diagnostic(error: EnvelopeError) -> Diagnostic {
    match error {
        EnvelopeError::InvalidEnvelope { offset, source } => {
            let code = match source {
                DelimiterError::Collision { .. } => codes::E002_DELIM_COLLISION,
                _ => codes::E001_DELIM_ISA,
            };
            code.diagnostic()
                .with_location(edi_validate::Location::at_byte(offset, 1))
                .with_actual(source.to_string())
        }
        EnvelopeError::InvalidUtf8 { offset, source } => codes::E012_SEG_INVALID_UTF8
            .diagnostic()
            .with_location(edi_validate::Location::at_byte(offset, 1))
            .with_actual(source.to_string()),
        EnvelopeError::GrammarNotFound(id) => Diagnostic::new(
            "E320-GRAMMAR-NOT-FOUND",
            Severity::Fatal,
            Category::Grammar,
            format!("no grammar registered for {id}"),
        )
        .with_expected(id.to_string()),
        EnvelopeError::Build(BuildError::EmptyGrammar(id)) => Diagnostic::new(
            "E321-GRAMMAR-EMPTY",
            Severity::Fatal,
            Category::Grammar,
            format!("grammar {id} has a root group with no children"),
        ),
        EnvelopeError::Build(BuildError::NoSegments) => codes::E001_DELIM_ISA
            .diagnostic()
            .with_actual("document contains no segments to parse"),
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "no diagnostics".to_string();
    }
    let errors = diagnostics.iter().filter(|d| d.is_error_or_worse()).count();
    let warnings = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();
    let infos = diagnostics.len() - errors - warnings;
    format!(
        "{} diagnostic(s): {} error-or-worse, {} warning(s), {} info",
        diagnostics.len(),
        errors,
        warnings,
        infos
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;

    const S1_835: &[u8] = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~BPR*I*100*C*ACH~TRN*1*X*Y~SE*4*0001~GE*1*1~IEA*1*000000001~";

    #[test]
    fn s1_minimal_835_happy_path_succeeds_with_no_diagnostics() {
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.parse(S1_835, &ParseOptions::default());
        assert!(result.success, "{:?}", result.diagnostics);
        assert_eq!(result.message_count, 1);
        assert!(result.diagnostics.is_empty());
        assert!(result.data.is_some());
    }

    #[test]
    fn s2_missing_bpr_emits_e301_and_fails() {
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~TRN*1*X*Y~N1*PR*PAYER~N1*PE*PAYEE~SE*5*0001~GE*1*1~IEA*1*000000001~";
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.parse(input, &ParseOptions::default());
        assert!(!result.success);
        assert!(result.diagnostics.iter().any(|d| d.code == "E301-STRUCT-MISSING"));
    }

    #[test]
    fn s3_bad_segment_count_emits_e310() {
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~BPR*I*100*C*ACH~TRN*1*X*Y~SE*99*0001~GE*1*1~IEA*1*000000001~";
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.parse(input, &ParseOptions::default());
        assert!(!result.success);
        assert!(result.diagnostics.iter().any(|d| d.code == "E310-COUNT-MISMATCH"
            && d.expected.as_deref() == Some("SE01 = 4")
            && d.actual.as_deref() == Some("99")));
    }

    #[test]
    fn s4_unknown_code_lenient_demotes_to_warning() {
        // BPR01 (Transaction Handling Code) is restricted to the
        // 835_TRANSACTION_HANDLING code set ({C,D,H,I,P,U,X}); "Q" is not a member.
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~BPR*Q*100*C*ACH~TRN*1*X*Y~SE*4*0001~GE*1*1~IEA*1*000000001~";
        let core = EdiCore::with_bundled_grammars().unwrap();
        let options = ParseOptions::new().with_field_validation_mode(edi_validate::FieldValidationMode::Lenient);
        let result = core.parse(input, &options);
        assert!(result.success, "{:?}", result.diagnostics);
        let code_diag = result.diagnostics.iter().find(|d| d.code == "E201-CODE-UNKNOWN").unwrap();
        assert_eq!(code_diag.severity, Severity::Warning);
    }

    #[test]
    fn registering_a_duplicate_grammar_is_rejected() {
        let mut core = EdiCore::new();
        let grammar = edi_grammar::fixtures::bundled_grammars().unwrap().into_iter().next().unwrap();
        core.register_grammar(grammar.clone()).unwrap();
        let err = core.register_grammar(grammar).unwrap_err();
        assert!(matches!(err, GrammarError::AlreadyRegistered { .. }));
        assert_eq!(core.grammar_count(), 1);
    }

    #[test]
    fn s5_delimiter_collision_is_fatal_with_no_tree() {
        let mut buf = vec![b' '; 106];
        buf[0..3].copy_from_slice(b"ISA");
        buf[3] = b'*'; // field sep
        buf[104] = b'*'; // component sep collides with field sep
        buf[105] = b'~';
        buf[83..88].copy_from_slice(b"00501");
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.parse(&buf, &ParseOptions::default());
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.diagnostics.iter().any(|d| d.code == "E002-DELIM-COLLISION" && d.is_fatal()));
    }

    #[test]
    fn empty_document_is_one_e001_with_no_tree() {
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.parse(b"", &ParseOptions::default());
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "E001-DELIM-ISA");
    }

    #[test]
    fn input_exceeding_cap_is_rejected_before_lexing() {
        let core = EdiCore::with_bundled_grammars().unwrap();
        let options = ParseOptions::new().with_max_input_bytes(Some(10));
        let result = core.parse(S1_835, &options);
        assert!(!result.success);
        assert_eq!(result.diagnostics[0].code, "E003-INPUT-TOO-LARGE");
    }

    #[test]
    fn unsupported_charset_is_rejected_as_fatal() {
        let core = EdiCore::with_bundled_grammars().unwrap();
        let options = ParseOptions::new().with_charset(Charset::Other("latin1".into()));
        let result = core.parse(S1_835, &options);
        assert!(!result.success);
        assert_eq!(result.diagnostics[0].code, "E004-UNSUPPORTED-CHARSET");
    }

    #[test]
    fn validate_mirrors_parse_success_in_strict_mode() {
        let core = EdiCore::with_bundled_grammars().unwrap();
        let parsed = core.parse(S1_835, &ParseOptions::default());
        let validated = core.validate(S1_835, &ValidateOptions::default());
        assert_eq!(validated.valid, parsed.success);
    }

    #[test]
    fn validate_summary_reports_counts() {
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~GS*HP*A*B*20250101*1200*1*X*005010X221A1~ST*835*0001~TRN*1*X*Y~N1*PR*PAYER~N1*PE*PAYEE~SE*5*0001~GE*1*1~IEA*1*000000001~";
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.validate(input, &ValidateOptions::default());
        assert!(!result.valid);
        assert!(result.error_count >= 1);
        assert!(result.summary.contains("error-or-worse"));
    }

    #[test]
    fn s6_837p_hl_hierarchy_resolves_billing_provider_and_subscriber_chain() {
        // Billing provider (HL03 = 20) is the root of the hierarchy;
        // the subscriber (HL03 = 22) names it as parent via HL02.
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~\
GS*HC*A*B*20250101*1200*1*X*005010X222A1~\
ST*837*0001~\
BHT*0019*00*244579*20250101~\
NM1*41*2*SUBMITTER NAME~\
NM1*40*2*RECEIVER NAME~\
HL*1**20*1~\
NM1*85*2*BILLING PROVIDER~\
HL*2*1*22*0~\
SBR*P~\
NM1*IL*2*SUBSCRIBER~\
CLM*PATIENTCTRL1*50000~\
LX*1~\
SV1*HC:99213*50000~\
SE*13*0001~\
GE*1*1~\
IEA*1*000000001~";
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.parse(input, &ParseOptions::default());
        assert!(result.success, "{:?}", result.diagnostics);

        let document = result.data.unwrap();
        assert_eq!(document.messages.len(), 1);
        let message = &document.messages[0];

        assert_eq!(message.hl_index.len(), 2);
        let billing_provider = message.hl_index.get("1").unwrap();
        assert_eq!(billing_provider.level_code, "20");
        assert!(billing_provider.parent_id.is_none());

        let subscriber = message.hl_index.get("2").unwrap();
        assert_eq!(subscriber.level_code, "22");
        assert_eq!(subscriber.parent_id.as_deref(), Some("1"));

        let chain: Vec<&str> = message.hl_index.parent_chain("2").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(chain, vec!["1"]);

        let segments = message.tree.flatten_segments();
        let clm = segments.iter().find(|s| s.raw.id == "CLM").unwrap();
        match clm.value(1) {
            Some(edi_validate::FieldValue::Numeric { value, decimals }) => {
                assert_eq!(*value, 50_000);
                assert_eq!(*decimals, 2);
            }
            other => panic!("expected CLM02 to decode as a numeric amount, got {other:?}"),
        }
    }

    #[test]
    fn cas_repetition_triplets_decode_each_occurrence() {
        // CAS02 is a repeating composite (adjustment reason/amount/quantity
        // triplets); the repetition separator `^` from ISA11 separates
        // occurrences, the component separator `:` separates one triplet's
        // own subfields.
        let input = b"ISA*00*          *00*          *ZZ*A              *ZZ*B              *250101*1200*^*00501*000000001*0*P*:~\
GS*HP*A*B*20250101*1200*1*X*005010X221A1~\
ST*835*0001~\
BPR*I*100*C*ACH~\
TRN*1*X*Y~\
N1*PR*PAYER~\
N1*PE*PAYEE~\
CLP*CLAIM1*1*50000*40000~\
CAS*CO*45:10000^97:5000~\
SE*8*0001~\
GE*1*1~\
IEA*1*000000001~";
        let core = EdiCore::with_bundled_grammars().unwrap();
        let result = core.parse(input, &ParseOptions::default());
        assert!(result.success, "{:?}", result.diagnostics);

        let document = result.data.unwrap();
        let segments = document.messages[0].tree.flatten_segments();
        let cas = segments.iter().find(|s| s.raw.id == "CAS").unwrap();

        assert_eq!(cas.raw.repetition_count(1), 2);
        assert_eq!(cas.raw.get_repetition(1, 0), &["45", "10000"]);
        assert_eq!(cas.raw.get_repetition(1, 1), &["97", "5000"]);

        match cas.value(1) {
            Some(edi_validate::FieldValue::Composite(parts)) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0], edi_validate::FieldValue::Identifier("45".into()));
                assert_eq!(parts[1], edi_validate::FieldValue::Numeric { value: 10_000, decimals: 2 });
            }
            other => panic!("expected CAS02's first occurrence to decode as a composite, got {other:?}"),
        }
    }

    #[test]
    fn expected_message_type_mismatch_emits_warning_without_failing() {
        let core = EdiCore::with_bundled_grammars().unwrap();
        let options = ParseOptions::new().with_expected_message_type("837");
        let result = core.parse(S1_835, &options);
        assert!(result.success, "{:?}", result.diagnostics);
        assert!(result.diagnostics.iter().any(|d| d.code == "W320-MESSAGE-TYPE-MISMATCH"));
    }
}
