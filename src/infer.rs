/*!
 * CCN types and type inference
 *
 * The structure of a CCN depends on the kind of provider or supplier it
 * describes. The type of a canonical CCN can be inferred from its length and
 * from which of positions 3, 4 and 6 hold letters rather than digits.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chars::{at, is_alpha, is_digit};
use crate::constants::{PROVIDER_CCN_LENGTH, SUPPLIER_CCN_LENGTH};
use crate::tables::{lookup_category, ORGAN_PROCUREMENT_CODE};
use crate::{CcnError, Result};

/// The kinds of CCN, each with its own length and field layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CcnType {
    /// `SSPQQQ`: state, organ-procurement `P` or leading sequence digit, sequence
    MedicareProvider,
    /// `SSTQQQ`: state, facility type letter, sequence
    MedicaidOnlyProvider,
    /// `SSTAQQ`: state, unit type letter, parent facility letter or leading sequence digit, sequence
    ///
    /// IPPS-excluded units take the sequence number of their parent facility,
    /// so the sequence here matches its least significant digits.
    IppsExcludedProvider,
    /// `SSQQQE`: state, sequence, emergency hospital type letter
    EmergencyHospital,
    /// `SSTQQQQQQQ`: state, supplier type, sequence
    Supplier,
}

impl CcnType {
    /// All CCN types, providers first
    pub const ALL: [CcnType; 5] = [
        CcnType::MedicareProvider,
        CcnType::MedicaidOnlyProvider,
        CcnType::IppsExcludedProvider,
        CcnType::EmergencyHospital,
        CcnType::Supplier,
    ];

    /// Canonical length of this type of CCN
    pub fn length(self) -> usize {
        match self {
            CcnType::Supplier => SUPPLIER_CCN_LENGTH,
            _ => PROVIDER_CCN_LENGTH,
        }
    }

    pub fn is_provider(self) -> bool {
        !matches!(self, CcnType::Supplier)
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            CcnType::MedicareProvider => "Medicare Provider",
            CcnType::MedicaidOnlyProvider => "Medicaid-Only Provider",
            CcnType::IppsExcludedProvider => "IPPS-Excluded Provider",
            CcnType::EmergencyHospital => "Emergency Hospital",
            CcnType::Supplier => "Supplier",
        }
    }

    /// 1-indexed position of the category character
    pub fn category_position(self) -> usize {
        match self {
            CcnType::EmergencyHospital => 6,
            _ => 3,
        }
    }
}

impl fmt::Display for CcnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CcnType {
    type Err = CcnError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "medicare" | "medicareprovider" => Ok(CcnType::MedicareProvider),
            "medicaid" | "medicaidonly" | "medicaidonlyprovider" => Ok(CcnType::MedicaidOnlyProvider),
            "ipps" | "ippsexcluded" | "ippsexcludedprovider" => Ok(CcnType::IppsExcludedProvider),
            "emergency" | "emergencyhospital" => Ok(CcnType::EmergencyHospital),
            "supplier" => Ok(CcnType::Supplier),
            _ => Err(CcnError::Configuration {
                message: format!("Unknown CCN type '{}'", s),
                suggestion: Some(
                    "Use one of: medicare, medicaid-only, ipps-excluded, emergency-hospital, supplier"
                        .to_string(),
                ),
            }),
        }
    }
}

/// Infer the type of a CCN from a string in canonical CCN format
///
/// Positions are checked most-distinctive first: a trailing letter only occurs
/// in emergency hospital CCNs, and letters in both positions 3 and 4 only in
/// IPPS-excluded units. Checking position 3 alone first would classify
/// IPPS-excluded units as Medicaid-only providers.
///
/// # Example
/// ```
/// use ccns::infer::{infer_ccn_type, CcnType};
/// assert_eq!(infer_ccn_type("123456")?, CcnType::MedicareProvider);
/// assert_eq!(infer_ccn_type("12A456")?, CcnType::MedicaidOnlyProvider);
/// assert!(infer_ccn_type("12I456").is_err());
/// # Ok::<(), ccns::CcnError>(())
/// ```
pub fn infer_ccn_type(code: impl AsRef<str>) -> Result<CcnType> {
    let code = code.as_ref();
    let length = code.len();

    if length == SUPPLIER_CCN_LENGTH {
        return Ok(CcnType::Supplier);
    }
    if length != PROVIDER_CCN_LENGTH {
        debug!(code, length, "CCN length matches no CCN type");
        return Err(CcnError::UnknownLength { code: code.to_string(), length });
    }

    let class = |position| at(code, position).unwrap_or(0);
    let (third, fourth, sixth) = (class(3), class(4), class(6));

    if is_alpha(sixth) {
        return Ok(CcnType::EmergencyHospital);
    }
    if is_alpha(third) && is_alpha(fourth) {
        return Ok(CcnType::IppsExcludedProvider);
    }
    if is_alpha(third) && is_digit(fourth) {
        if lookup_category(CcnType::MedicaidOnlyProvider, third).is_some() {
            return Ok(CcnType::MedicaidOnlyProvider);
        }
        // unit without a parent facility letter: position 4 is a sequence digit
        if lookup_category(CcnType::IppsExcludedProvider, third).is_some() {
            return Ok(CcnType::IppsExcludedProvider);
        }
        if third == ORGAN_PROCUREMENT_CODE {
            return Ok(CcnType::MedicareProvider);
        }
    }
    if is_digit(third) {
        return Ok(CcnType::MedicareProvider);
    }

    debug!(code, "CCN letters match no provider layout");
    Err(CcnError::AmbiguousOrInvalid { code: code.to_string() })
}
