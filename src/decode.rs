/*!
 * Typed CCNs and field decoding
 *
 * A [`Ccn`] pairs a canonical code with its [`CcnType`]. The type decides
 * where the category character sits and which lookup table describes it;
 * every accessor is total and reports sentinels for codes missing from the
 * tables.
 */

use std::fmt;
use std::io::Write;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canonical::{canonicalize, CanonicalCode, CcnInput, CcnLength};
use crate::chars::{at, is_digit};
use crate::constants::INVALID_FACILITY_TYPE;
use crate::infer::{infer_ccn_type, CcnType};
use crate::tables;
use crate::{CcnError, Result};

/// A CMS Certification Number of a known type
///
/// CCNs uniquely identify health care providers and suppliers that
/// participate, or ever participated, in the Medicare and Medicaid programs.
/// They are defined by CMS publication 100-07, "State Operations Provider
/// Certification".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ccn {
    #[serde(rename = "type")]
    kind: CcnType,
    code: CanonicalCode,
}

impl Ccn {
    /// Construct a CCN of a known type without any checks
    ///
    /// Use this when the code is already canonical and its type is known, for
    /// instance when reading back data this library produced.
    pub fn new_unchecked(kind: CcnType, code: impl Into<String>) -> Self {
        Ccn { kind, code: CanonicalCode::new_unchecked(code) }
    }

    /// Canonicalize `input` as a CCN of the given type
    ///
    /// Only the length is checked against the type; the letter layout is not.
    pub fn parse_as<T: CcnInput>(kind: CcnType, input: T) -> Result<Self> {
        let length = match kind {
            CcnType::Supplier => CcnLength::Supplier,
            _ => CcnLength::Provider,
        };
        let code = canonicalize(input, length)?;
        Ok(Ccn { kind, code })
    }

    /// Canonicalize `input` and infer its type
    ///
    /// Input is first canonicalized as a provider CCN; if it is too long for
    /// that it is canonicalized as a supplier CCN. Numbers are only ever read
    /// as provider CCNs, since supplier CCNs carry a type letter.
    ///
    /// # Example
    /// ```
    /// use ccns::prelude::*;
    /// let c = Ccn::parse("X1234567")?;
    /// assert_eq!(c.kind(), CcnType::Supplier);
    /// assert_eq!(c.as_str(), "00X1234567");
    /// # Ok::<(), ccns::CcnError>(())
    /// ```
    pub fn parse<T: CcnInput>(input: T) -> Result<Self> {
        let numeric = input.is_numeric();
        let text = input.ccn_text()?;
        let code = match canonicalize(&*text, CcnLength::Provider) {
            Err(CcnError::TooLong { .. }) if !numeric => canonicalize(&*text, CcnLength::Supplier)?,
            other => other?,
        };
        let kind = infer_ccn_type(&code)?;
        Ok(Ccn { kind, code })
    }

    pub fn kind(&self) -> CcnType {
        self.kind
    }

    pub fn code(&self) -> &CanonicalCode {
        &self.code
    }

    /// Raw canonical text of the CCN
    pub fn as_str(&self) -> &str {
        self.code.as_str()
    }

    /// Two-character region (state) code
    pub fn region_code(&self) -> &str {
        region_code(self.as_str())
    }

    /// Name of the region, or [`INVALID_STATE`](crate::constants::INVALID_STATE)
    ///
    /// "State" is loose here: valid regions include countries like Canada and
    /// territories like Guam.
    pub fn region_name(&self) -> &'static str {
        tables::region_name(self.region_code())
    }

    /// Category (facility or supplier type) character
    pub fn category_code(&self) -> &str {
        category_code(self.as_str(), self.kind)
    }

    /// Category description, or [`INVALID_FACILITY_TYPE`]
    pub fn category_description(&self) -> &'static str {
        category_description(self.as_str(), self.kind)
    }

    /// Parent facility character of an IPPS-excluded unit (position 4)
    pub fn parent_category_code(&self) -> Option<&str> {
        parent_category_code(self.as_str(), self.kind)
    }

    /// Parent facility description of an IPPS-excluded unit
    ///
    /// `None` for other CCN types and for units whose position 4 is a digit.
    pub fn parent_category_description(&self) -> Option<&'static str> {
        parent_category_description(self.as_str(), self.kind)
    }

    /// Sequence number
    ///
    /// Sequence numbers are sometimes indefinite: when a category letter
    /// replaces a digit, only the decodable (least significant) digits are
    /// returned.
    pub fn sequence_number(&self) -> u64 {
        sequence_number(self.as_str(), self.kind)
    }

    /// Decode all fields
    pub fn decode(&self) -> DecodedFields {
        decode(&self.code, self.kind)
    }

    /// Write the decoded summary to `out`
    pub fn decode_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", self.decode())
    }
}

impl fmt::Display for Ccn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl AsRef<str> for Ccn {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Ccn {
    type Err = CcnError;

    fn from_str(s: &str) -> Result<Self> {
        Ccn::parse(s)
    }
}

/// Construct a CCN from a string or integer, inferring its type
///
/// # Example
/// ```
/// use ccns::prelude::*;
/// assert_eq!(ccn(123456)?.kind(), CcnType::MedicareProvider);
/// assert_eq!(ccn("\t12-p456\n")?.as_str(), "12P456");
/// assert!(ccn(-12345).is_err());
/// # Ok::<(), ccns::CcnError>(())
/// ```
pub fn ccn<T: CcnInput>(input: T) -> Result<Ccn> {
    Ccn::parse(input)
}

/// All decoded fields of a CCN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFields {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CcnType,
    pub region_code: String,
    pub region_name: String,
    pub category_code: String,
    pub category_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category_description: Option<String>,
    pub sequence_number: u64,
}

impl DecodedFields {
    /// Whether every field was found in the lookup tables
    pub fn is_fully_recognized(&self) -> bool {
        self.region_name != crate::constants::INVALID_STATE
            && self.category_description != INVALID_FACILITY_TYPE
    }
}

impl fmt::Display for DecodedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.code, self.kind)?;
        writeln!(f, "  State: {} [{}]", self.region_name, self.region_code)?;
        write!(f, "  Facility Type: {} [{}]", self.category_description, self.category_code)?;
        if let (Some(code), Some(desc)) = (&self.parent_category_code, &self.parent_category_description) {
            write!(f, "\n  Parent Facility Type: {} [{}]", desc, code)?;
        }
        write!(f, "\n  Sequence Number: {}", self.sequence_number)
    }
}

/// Substring at 1-indexed positions `range`, empty if out of bounds
fn field(code: &str, range: Range<usize>) -> &str {
    code.get(range.start - 1..range.end - 1).unwrap_or("")
}

/// Positions 1-2 of any CCN
pub fn region_code(code: &str) -> &str {
    field(code, 1..3)
}

/// The category character at the position used by `kind`
pub fn category_code(code: &str, kind: CcnType) -> &str {
    let position = kind.category_position();
    field(code, position..position + 1)
}

/// Category description of `code` read as a CCN of type `kind`
pub fn category_description(code: &str, kind: CcnType) -> &'static str {
    let position = kind.category_position();
    let Some(c) = at(code, position) else {
        return INVALID_FACILITY_TYPE;
    };
    if kind == CcnType::MedicareProvider && is_digit(c) {
        // no facility letter: the type follows from the sequence number range
        let sequence = digits(field(code, 3..7));
        return tables::lookup_medicare_range(sequence as u32).unwrap_or(INVALID_FACILITY_TYPE);
    }
    tables::category_description(kind, c)
}

/// Position 4 of an IPPS-excluded unit, `None` for other types
pub fn parent_category_code(code: &str, kind: CcnType) -> Option<&str> {
    match kind {
        CcnType::IppsExcludedProvider => Some(field(code, 4..5)).filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Parent facility of an IPPS-excluded unit, if position 4 names one
///
/// Position 4 holds either a parent facility letter or the leading digit of
/// the sequence number. A miss in the parent table is taken to mean the
/// latter; this cannot be told apart from a parent letter that is missing from
/// the table.
pub fn parent_category_description(code: &str, kind: CcnType) -> Option<&'static str> {
    match kind {
        CcnType::IppsExcludedProvider => at(code, 4).and_then(tables::lookup_ipps_parent),
        _ => None,
    }
}

/// Sequence number of `code` read as a CCN of type `kind`
///
/// Category positions holding a digit belong to the sequence; those holding a
/// letter are dropped, leaving a shorter sequence.
pub fn sequence_number(code: &str, kind: CcnType) -> u64 {
    let span = match kind {
        CcnType::MedicareProvider | CcnType::MedicaidOnlyProvider | CcnType::IppsExcludedProvider => 3..7,
        CcnType::EmergencyHospital => 3..6,
        CcnType::Supplier => 3..11,
    };
    let mut sequence = 0u64;
    for position in span {
        let Some(c) = at(code, position) else { break };
        let claimed = match kind {
            CcnType::IppsExcludedProvider if position == 4 => tables::lookup_ipps_parent(c).is_some(),
            _ if position == kind.category_position() => tables::lookup_category(kind, c).is_some(),
            _ => false,
        };
        // letters, and anything else in unchecked input, are not sequence digits
        if is_digit(c) && !claimed {
            sequence = sequence * 10 + u64::from(c - b'0');
        }
    }
    sequence
}

fn digits(s: &str) -> u64 {
    s.bytes()
        .filter(|c| is_digit(*c))
        .fold(0, |acc, c| acc * 10 + u64::from(c - b'0'))
}

/// Decode a canonical CCN of a known type into its fields
///
/// Never fails: fields missing from the lookup tables are reported as
/// [`INVALID_STATE`](crate::constants::INVALID_STATE) and
/// [`INVALID_FACILITY_TYPE`].
pub fn decode(code: &CanonicalCode, kind: CcnType) -> DecodedFields {
    let raw = code.as_str();
    DecodedFields {
        code: raw.to_string(),
        kind,
        region_code: region_code(raw).to_string(),
        region_name: tables::region_name(region_code(raw)).to_string(),
        category_code: category_code(raw, kind).to_string(),
        category_description: category_description(raw, kind).to_string(),
        parent_category_code: parent_category_code(raw, kind).map(str::to_string),
        parent_category_description: parent_category_description(raw, kind).map(str::to_string),
        sequence_number: sequence_number(raw, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INVALID_STATE;

    fn unchecked(kind: CcnType, code: &str) -> Ccn {
        Ccn::new_unchecked(kind, code)
    }

    #[test]
    fn test_medicare_fields() {
        let c = ccn("050001").unwrap();
        assert_eq!(c.kind(), CcnType::MedicareProvider);
        assert_eq!(c.region_code(), "05");
        assert_eq!(c.region_name(), "California");
        assert_eq!(c.category_code(), "0");
        assert_eq!(c.category_description(), "Short-term (General and Specialty) Hospital");
        assert_eq!(c.sequence_number(), 1);
        assert_eq!(c.parent_category_code(), None);

        let c = ccn("365123").unwrap();
        assert_eq!(c.category_description(), "Skilled Nursing Facility");
        assert_eq!(c.sequence_number(), 5123);
    }

    #[test]
    fn test_medicare_with_letter_in_position_four() {
        let c = ccn("123A56").unwrap();
        assert_eq!(c.kind(), CcnType::MedicareProvider);
        assert_eq!(c.category_code(), "3");
        // range lookup reads the digits of "3A56"
        assert_eq!(c.category_description(), "Short-term (General and Specialty) Hospital");
        assert_eq!(c.sequence_number(), 356);
        assert_eq!(c.parent_category_code(), None);
    }

    #[test]
    fn test_organ_procurement_drops_leading_digit() {
        let c = ccn("12-p456").unwrap();
        assert_eq!(c.kind(), CcnType::MedicareProvider);
        assert_eq!(c.category_code(), "P");
        assert_eq!(c.category_description(), "Organ Procurement Organization");
        assert_eq!(c.sequence_number(), 456);
    }

    #[test]
    fn test_medicaid_only_fields() {
        let c = ccn("12A456").unwrap();
        assert_eq!(c.region_name(), "Hawaii");
        assert_eq!(c.category_code(), "A");
        assert_eq!(c.category_description(), "NF (Formerly assigned to Medicaid SNF)");
        assert_eq!(c.sequence_number(), 456);
    }

    #[test]
    fn test_ipps_excluded_fields() {
        let c = ccn("33SD12").unwrap();
        assert_eq!(c.kind(), CcnType::IppsExcludedProvider);
        assert_eq!(c.region_name(), "New York");
        assert_eq!(c.category_code(), "S");
        assert_eq!(c.category_description(), "Psychiatric Unit");
        assert_eq!(c.parent_category_code(), Some("D"));
        assert_eq!(c.parent_category_description(), Some("Psychiatric Hospital"));
        assert_eq!(c.sequence_number(), 12);

        // digit at position 4 belongs to the sequence
        let c = ccn("33S412").unwrap();
        assert_eq!(c.parent_category_code(), Some("4"));
        assert_eq!(c.parent_category_description(), None);
        assert_eq!(c.sequence_number(), 412);

        // unknown parent letter is neither a parent nor a digit
        let c = ccn("33SQ12").unwrap();
        assert_eq!(c.parent_category_description(), None);
        assert_eq!(c.sequence_number(), 12);
    }

    #[test]
    fn test_emergency_hospital_fields() {
        let c = ccn("45123E").unwrap();
        assert_eq!(c.kind(), CcnType::EmergencyHospital);
        assert_eq!(c.region_name(), "Texas");
        assert_eq!(c.category_code(), "E");
        assert_eq!(c.category_description(), "Non-Participating Emergency Hospital (Non-Federal)");
        assert_eq!(c.sequence_number(), 123);
    }

    #[test]
    fn test_supplier_fields() {
        let c = ccn("X1234567").unwrap();
        assert_eq!(c.as_str(), "00X1234567");
        assert_eq!(c.region_name(), INVALID_STATE);
        assert_eq!(c.category_code(), "X");
        assert_eq!(c.category_description(), "Portable X-Ray Supplier");
        assert_eq!(c.sequence_number(), 1_234_567);

        let c = ccn("05D0987654").unwrap();
        assert_eq!(c.category_description(), "Clinical Laboratory Improvement Amendments of 1988 (CLIA) Laboratory");
        assert_eq!(c.sequence_number(), 987_654);

        // numeric supplier type: the digit is part of the sequence
        let c = unchecked(CcnType::Supplier, "0571234567");
        assert_eq!(c.category_description(), INVALID_FACILITY_TYPE);
        assert_eq!(c.sequence_number(), 71_234_567);
    }

    #[test]
    fn test_unknown_category_letters_are_sentinels() {
        let cases = [
            (CcnType::MedicareProvider, "12Q456"),
            (CcnType::MedicaidOnlyProvider, "12I456"),
            (CcnType::IppsExcludedProvider, "12IA56"),
            (CcnType::EmergencyHospital, "12345Q"),
            (CcnType::Supplier, "12Q4567890"),
        ];
        for (kind, code) in cases {
            let c = unchecked(kind, code);
            let decoded = c.decode();
            assert_eq!(decoded.category_description, INVALID_FACILITY_TYPE, "{code}");
            assert!(!decoded.is_fully_recognized());
            assert_eq!(decoded.region_code, "12");
            assert_eq!(decoded.region_name, "Hawaii");
        }
        assert_eq!(unchecked(CcnType::MedicareProvider, "12Q456").sequence_number(), 456);
        assert_eq!(unchecked(CcnType::EmergencyHospital, "12345Q").sequence_number(), 345);
    }

    #[test]
    fn test_field_lengths_hold_for_every_type() {
        let codes = ["123456", "12P456", "12A456", "12SA56", "12S456", "12345E", "00X1234567", "1234567890"];
        for code in codes {
            for kind in CcnType::ALL.into_iter().filter(|k| k.length() == code.len()) {
                let c = unchecked(kind, code);
                assert_eq!(c.region_code().len(), 2);
                assert_eq!(c.category_code().len(), 1);
            }
        }
    }

    #[test]
    fn test_accessors_are_total_on_unchecked_input() {
        for code in ["", "1", "banana", "12É456"] {
            for kind in CcnType::ALL {
                let decoded = unchecked(kind, code).decode();
                assert!(decoded.region_code.len() <= 2);
            }
        }
        assert_eq!(unchecked(CcnType::MedicareProvider, "banana").sequence_number(), 0);
    }

    #[test]
    fn test_decode_summary() {
        let summary = ccn("33SD12").unwrap().decode().to_string();
        assert_eq!(
            summary,
            "33SD12 (IPPS-Excluded Provider)\n  State: New York [33]\n  Facility Type: Psychiatric Unit [S]\n  Parent Facility Type: Psychiatric Hospital [D]\n  Sequence Number: 12"
        );

        let mut out = Vec::new();
        ccn("050001").unwrap().decode_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("050001 (Medicare Provider)\n  State: California [05]"));
        assert!(text.ends_with("Sequence Number: 1\n"));
    }

    #[test]
    fn test_parse_as_checks_only_length() {
        let c = Ccn::parse_as(CcnType::EmergencyHospital, "123").unwrap();
        assert_eq!(c.as_str(), "000123");
        assert_eq!(c.kind(), CcnType::EmergencyHospital);

        let c = Ccn::parse_as(CcnType::Supplier, 42u32).unwrap();
        assert_eq!(c.as_str(), "0000000042");

        assert!(matches!(
            Ccn::parse_as(CcnType::MedicareProvider, "1234567"),
            Err(CcnError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(ccn("12I456"), Err(CcnError::AmbiguousOrInvalid { .. })));
        assert!(matches!(ccn(1234567), Err(CcnError::TooLong { .. })));
        assert_eq!(ccn("1234567").unwrap().kind(), CcnType::Supplier);
        assert!(matches!(ccn("12345678901"), Err(CcnError::TooLong { .. })));
        assert!(matches!(ccn(-1), Err(CcnError::NegativeValue { .. })));
        assert!(matches!(ccn(123.5), Err(CcnError::NonIntegral { .. })));
        assert_eq!(ccn(123.0).unwrap().as_str(), "000123");
        assert_eq!("12A456".parse::<Ccn>().unwrap().kind(), CcnType::MedicaidOnlyProvider);
    }

    #[test]
    fn test_serde_shape() {
        let c = ccn("12A456").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"type":"MedicaidOnlyProvider","code":"12A456"}"#);
        let back: Ccn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
