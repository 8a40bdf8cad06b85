/*!
 * Canonicalization of raw CCN input
 *
 * Canonical CCN format is a string of uppercase alphanumeric characters
 * left-padded with zeros to either 6 (providers) or 10 (suppliers)
 * characters. Some datasets separate the state code from the rest of the CCN
 * with a hyphen, some store letters in lower case, and some store provider
 * CCNs as integers with the leading zeros dropped. All of these are
 * normalized here.
 */

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chars::is_ccn_char;
use crate::constants::{PROVIDER_CCN_LENGTH, SUPPLIER_CCN_LENGTH};
use crate::{CcnError, Result};

/// Target (and padding) length of a canonical CCN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CcnLength {
    /// Six characters, used by all provider CCNs
    #[default]
    Provider,
    /// Ten characters, used by supplier CCNs
    Supplier,
}

impl CcnLength {
    pub fn len(self) -> usize {
        match self {
            CcnLength::Provider => PROVIDER_CCN_LENGTH,
            CcnLength::Supplier => SUPPLIER_CCN_LENGTH,
        }
    }

    /// Length variant for a character count, if it is a CCN length
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            PROVIDER_CCN_LENGTH => Some(CcnLength::Provider),
            SUPPLIER_CCN_LENGTH => Some(CcnLength::Supplier),
            _ => None,
        }
    }
}

impl fmt::Display for CcnLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.len())
    }
}

/// A CCN string in canonical format
///
/// Values produced by [`canonicalize`] always hold 6 or 10 characters from
/// `A-Z0-9`. [`CanonicalCode::new_unchecked`] skips every check and is meant
/// for data already known to be canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalCode(String);

impl CanonicalCode {
    /// Wrap a string that the caller asserts is already canonical
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        CanonicalCode(code.into())
    }

    /// Get the code as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CanonicalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw values that can be canonicalized into a CCN
///
/// Implemented for strings, all primitive integers, and floating point values
/// that hold an exact non-negative integer.
pub trait CcnInput {
    /// Textual form of the value before cleaning
    fn ccn_text(&self) -> Result<Cow<'_, str>>;

    /// Whether the value is a number rather than text
    fn is_numeric(&self) -> bool {
        false
    }
}

impl CcnInput for str {
    fn ccn_text(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self))
    }
}

impl CcnInput for String {
    fn ccn_text(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl CcnInput for CanonicalCode {
    fn ccn_text(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl<T: CcnInput + ?Sized> CcnInput for &T {
    fn ccn_text(&self) -> Result<Cow<'_, str>> {
        (**self).ccn_text()
    }

    fn is_numeric(&self) -> bool {
        (**self).is_numeric()
    }
}

macro_rules! impl_unsigned_input {
    ($($t:ty),*) => {
        $(impl CcnInput for $t {
            fn is_numeric(&self) -> bool {
                true
            }

            fn ccn_text(&self) -> Result<Cow<'_, str>> {
                Ok(Cow::Owned(self.to_string()))
            }
        })*
    };
}

macro_rules! impl_signed_input {
    ($($t:ty),*) => {
        $(impl CcnInput for $t {
            fn is_numeric(&self) -> bool {
                true
            }

            fn ccn_text(&self) -> Result<Cow<'_, str>> {
                if *self < 0 {
                    return Err(CcnError::NegativeValue { value: self.to_string() });
                }
                Ok(Cow::Owned(self.to_string()))
            }
        })*
    };
}

macro_rules! impl_float_input {
    ($($t:ty),*) => {
        $(impl CcnInput for $t {
            fn is_numeric(&self) -> bool {
                true
            }

            fn ccn_text(&self) -> Result<Cow<'_, str>> {
                if !self.is_finite() || self.fract() != 0.0 {
                    return Err(CcnError::NonIntegral { value: self.to_string() });
                }
                if *self < 0.0 {
                    return Err(CcnError::NegativeValue { value: self.to_string() });
                }
                // -0.0 formats as "-0"
                Ok(Cow::Owned(format!("{:.0}", self.abs())))
            }
        })*
    };
}

impl_unsigned_input!(u8, u16, u32, u64, u128, usize);
impl_signed_input!(i8, i16, i32, i64, i128, isize);
impl_float_input!(f32, f64);

/// Clean the given string and return it in canonical CCN format
///
/// Leading and trailing whitespace is trimmed, a single hyphen right after the
/// two-character state code is removed, and letters are uppercased. The result
/// is left-padded with `'0'` to `max_length`.
///
/// # Example
/// ```
/// use ccns::canonical::{clean_ccn, CcnLength};
/// assert_eq!(clean_ccn("\t12-p456\n", CcnLength::Provider)?.as_str(), "12P456");
/// assert_eq!(clean_ccn("123", CcnLength::Provider)?.as_str(), "000123");
/// # Ok::<(), ccns::CcnError>(())
/// ```
pub fn clean_ccn(input: &str, max_length: CcnLength) -> Result<CanonicalCode> {
    let max_length = max_length.len();
    let trimmed = input.trim();

    let mut cleaned = String::with_capacity(max_length);
    for (i, c) in trimmed.chars().enumerate() {
        if i == 2 && c == '-' {
            continue;
        }
        cleaned.push(c.to_ascii_uppercase());
    }

    if let Some((i, c)) = cleaned
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii() || !is_ccn_char(*c as u8))
    {
        return Err(CcnError::invalid_character(&cleaned, c, i + 1));
    }

    // all ASCII from here on, so byte length equals character count
    if cleaned.len() > max_length {
        return Err(CcnError::too_long(&cleaned, max_length));
    }

    let mut canonical = "0".repeat(max_length - cleaned.len());
    canonical.push_str(&cleaned);
    Ok(CanonicalCode(canonical))
}

/// Canonicalize a string or non-negative integer into a CCN of `max_length`
///
/// # Example
/// ```
/// use ccns::canonical::{canonicalize, CcnLength};
/// assert_eq!(canonicalize(123, CcnLength::Provider)?.as_str(), "000123");
/// assert_eq!(canonicalize("X1234567", CcnLength::Supplier)?.as_str(), "00X1234567");
/// assert!(canonicalize(-1, CcnLength::Provider).is_err());
/// # Ok::<(), ccns::CcnError>(())
/// ```
pub fn canonicalize<T: CcnInput>(input: T, max_length: CcnLength) -> Result<CanonicalCode> {
    let text = input.ccn_text()?;
    clean_ccn(&text, max_length)
}
