//! Destination number normalization.

/// Longest national number (area code plus mobile number).
const NATIONAL_MAX_DIGITS: usize = 11;

/// Digits of `phone`, prefixed with `country_code` unless already present.
///
/// A number is taken as already prefixed only when it starts with the
/// country code and is longer than a national number, so area code 55 is
/// not mistaken for the country code.
#[must_use]
pub fn normalize(phone: &str, country_code: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.starts_with(country_code) && digits.len() > NATIONAL_MAX_DIGITS {
        digits
    } else {
        format!("{country_code}{digits}")
    }
}
