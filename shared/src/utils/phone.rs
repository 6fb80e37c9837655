//! Phone number utilities
//!
//! Every phone number that reaches a store goes through [`PhoneNormalizer`]
//! first, so the canonical `+<country code><national number>` string is the
//! only representation used as a lookup key.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Country calling code assumed for numbers entered without one.
pub const DEFAULT_COUNTRY_CODE: &str = "251";

/// Digits in a national significant number for the default country.
pub const DEFAULT_NATIONAL_LENGTH: usize = 9;

// E.164: leading plus, no leading zero, at most 15 digits
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{7,14}$").unwrap());

// Separators people type between digit groups
static SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-().]").unwrap());

/// Phone validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Invalid phone number format: {input}")]
    InvalidFormat { input: String },
}

/// Converts regional phone input into the canonical international form.
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    country_code: String,
    national_length: usize,
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}

impl PhoneNormalizer {
    /// Create a normalizer for the given default country calling code
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into().trim_start_matches('+').to_string(),
            national_length: DEFAULT_NATIONAL_LENGTH,
        }
    }

    /// Override the national significant number length
    pub fn with_national_length(mut self, national_length: usize) -> Self {
        self.national_length = national_length;
        self
    }

    /// Default country calling code without the plus sign
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Normalize a phone number.
    ///
    /// Accepted inputs (shown for the default country code 251):
    /// - `+251911000000` and `+251 91 100 0000`
    /// - `00251911000000`
    /// - `251911000000`
    /// - `0911000000` (trunk prefix)
    /// - `911000000`
    ///
    /// Output always matches E.164 and normalizing it again returns it unchanged.
    pub fn normalize(&self, input: &str) -> Result<String, PhoneError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let compact = SEPARATOR_REGEX.replace_all(trimmed, "");
        let invalid = || PhoneError::InvalidFormat {
            input: trimmed.to_string(),
        };

        let candidate = if let Some(rest) = compact.strip_prefix('+') {
            if !rest.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            format!("+{}", rest)
        } else {
            if !compact.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            self.canonicalize_digits(&compact).ok_or_else(invalid)?
        };

        if !E164_REGEX.is_match(&candidate) {
            return Err(invalid());
        }

        // Numbers in the default country must carry a full national number
        if let Some(national) = candidate[1..].strip_prefix(self.country_code.as_str()) {
            if national.len() != self.national_length || national.starts_with('0') {
                return Err(invalid());
            }
        }

        Ok(candidate)
    }

    /// Check whether the input can be normalized
    pub fn is_valid(&self, input: &str) -> bool {
        self.normalize(input).is_ok()
    }

    fn canonicalize_digits(&self, digits: &str) -> Option<String> {
        let cc = self.country_code.as_str();
        let n = self.national_length;

        if let Some(international) = digits.strip_prefix("00") {
            return Some(format!("+{}", international));
        }
        if digits.len() == cc.len() + n && digits.starts_with(cc) {
            return Some(format!("+{}", digits));
        }
        if digits.len() == n + 1 && digits.starts_with('0') {
            return Some(format!("+{}{}", cc, &digits[1..]));
        }
        if digits.len() == n && !digits.starts_with('0') {
            return Some(format!("+{}{}", cc, digits));
        }
        None
    }
}

/// Normalize with the default country code
pub fn normalize_phone_number(phone: &str) -> Result<String, PhoneError> {
    PhoneNormalizer::default().normalize(phone)
}

/// Check if a phone number is already in canonical E.164 form
pub fn is_canonical_phone(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Mask a phone number for logs (e.g., +25****0000)
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() >= 7 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}
