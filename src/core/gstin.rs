//! GSTIN format validation.
//!
//! A GSTIN is 15 characters: 2-digit state code, 10-character PAN,
//! entity number, the letter `Z`, and a mod-36 check character.

use std::fmt;

const CHARSET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Error returned when a GSTIN fails format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GstinFormatError {
    /// The invalid input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl fmt::Display for GstinFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid GSTIN '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for GstinFormatError {}

/// Validate a GSTIN by format and check character (no network call).
///
/// Input is trimmed and upper-cased. Returns the normalised GSTIN.
pub fn validate_gstin(gstin: &str) -> Result<String, GstinFormatError> {
    let value = gstin.trim().to_ascii_uppercase();
    let err = |reason: &str| GstinFormatError {
        value: gstin.trim().into(),
        reason: reason.into(),
    };

    if !value.is_ascii() || value.len() != 15 {
        return Err(err("must be exactly 15 ASCII characters"));
    }
    let b = value.as_bytes();

    if !b[..2].iter().all(u8::is_ascii_digit) {
        return Err(err("state code must be two digits"));
    }
    // PAN: AAAAA9999A
    if !b[2..7].iter().all(u8::is_ascii_uppercase)
        || !b[7..11].iter().all(u8::is_ascii_digit)
        || !b[11].is_ascii_uppercase()
    {
        return Err(err("characters 3-12 must be a PAN (5 letters, 4 digits, 1 letter)"));
    }
    if !(b[12].is_ascii_uppercase() || (b'1'..=b'9').contains(&b[12])) {
        return Err(err("entity number must be 1-9 or A-Z"));
    }
    if b[13] != b'Z' {
        return Err(err("14th character must be 'Z'"));
    }
    let expected = check_char(&b[..14]);
    if b[14] != expected {
        return Err(err(&format!(
            "check character should be '{}'",
            expected as char
        )));
    }

    Ok(value)
}

/// State code embedded in a GSTIN (first two characters).
pub fn gstin_state_code(gstin: &str) -> Option<&str> {
    let code = gstin.trim().get(..2)?;
    code.bytes().all(|c| c.is_ascii_digit()).then_some(code)
}

fn check_char(body: &[u8]) -> u8 {
    let sum: usize = body
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let value = CHARSET.iter().position(|x| x == c).unwrap_or(0);
            let product = value * if i % 2 == 0 { 1 } else { 2 };
            product / 36 + product % 36
        })
        .sum();
    CHARSET[(36 - sum % 36) % 36]
}
