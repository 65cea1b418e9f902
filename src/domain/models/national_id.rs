use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

pub const NATIONAL_ID_DIGIT_COUNT: usize = 11;
/// Width of `XXX.XXX.XXX-XX`
pub const FORMATTED_NATIONAL_ID_LENGTH: usize = 14;

/// Value object holding a checksum-valid national ID in digits-only form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalId(String);

impl NationalId {
    /// Parse any user input (punctuated or not) into a validated ID
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if !is_valid(raw) {
            return Err(DomainError::InvalidNationalId);
        }
        Ok(Self(strip_non_digits(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form, e.g. `529.982.247-25`
    pub fn formatted(&self) -> String {
        format(&self.0)
    }
}

pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Two check digit validation over the 11 digits found in `raw`
pub fn is_valid(raw: &str) -> bool {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != NATIONAL_ID_DIGIT_COUNT {
        return false;
    }
    // repeated sequences pass the arithmetic but are never issued
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weights run from `len + 1` down to 2
fn check_digit(digits: &[u32]) -> u32 {
    let top_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(idx, digit)| digit * (top_weight - idx as u32))
        .sum();

    match (sum * 10) % 11 {
        10 | 11 => 0,
        remainder => remainder,
    }
}

/// Live input mask applied on every keystroke of the ID field
pub fn format(raw: &str) -> String {
    let digits = strip_non_digits(raw);
    let mut out = String::with_capacity(FORMATTED_NATIONAL_ID_LENGTH);

    for (idx, digit) in digits.chars().enumerate() {
        match idx {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(digit);
    }

    out.truncate(FORMATTED_NATIONAL_ID_LENGTH);
    out
}
