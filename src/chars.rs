/*!
 * Character classes of the restricted CCN alphabet (`A-Z`, `0-9`)
 */

/// Uppercase ASCII letter `A-Z`
#[inline]
pub fn is_alpha(c: u8) -> bool {
    c.is_ascii_uppercase()
}

/// ASCII digit `0-9`
#[inline]
pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Any character allowed in a canonical CCN
#[inline]
pub fn is_ccn_char(c: u8) -> bool {
    is_alpha(c) || is_digit(c)
}

/// Character at a 1-indexed position, if present
#[inline]
pub(crate) fn at(code: &str, position: usize) -> Option<u8> {
    code.as_bytes().get(position.checked_sub(1)?).copied()
}
