//! Reference code types: CRM, CID-10, CBHPM and ANVISA registrations.
//!
//! These are accepted on shape alone — none of them is checked against the
//! issuing registry. CRM in particular is stored as given (per the product
//! rules, no lookup against the regional medical councils).

use crate::string_newtype_impls;

/// Errors that can occur when parsing reference codes.
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("CRM must be 1-7 digits followed by a two-letter state code, e.g. 123456-SP")]
    InvalidCrm,
    #[error("CID-10 code must look like A00, A00.0 or A000")]
    InvalidCid,
    #[error("CBHPM code must look like 3.07.15.05-9")]
    InvalidCbhpm,
    #[error("ANVISA registration must contain 11 or 13 digits")]
    InvalidAnvisa,
}

const UFS: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// CRM — physician registration number plus issuing state, canonically
/// `123456-SP`. Accepts `CRM 123456/SP`, `123456 SP` and similar forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crm(String);

impl Crm {
    pub fn new(input: impl AsRef<str>) -> Result<Self, CodeError> {
        let cleaned = input.as_ref().trim().to_uppercase();
        let cleaned = cleaned.strip_prefix("CRM").unwrap_or(&cleaned).trim_start();
        let cleaned = cleaned.trim_start_matches([' ', '-', '/', ':']);

        let digits: String = cleaned.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() || digits.len() > 7 {
            return Err(CodeError::InvalidCrm);
        }
        let rest = cleaned[digits.len()..].trim_matches([' ', '-', '/']);
        if !UFS.contains(&rest) {
            return Err(CodeError::InvalidCrm);
        }
        Ok(Self(format!("{digits}-{rest}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

string_newtype_impls!(Crm);

/// CID-10 diagnostic code, canonically `M17.1` (dot inserted when a fourth
/// character is present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidCode(String);

impl CidCode {
    pub fn new(input: impl AsRef<str>) -> Result<Self, CodeError> {
        let raw = input.as_ref().trim().to_uppercase().replace('.', "");
        let mut chars = raw.chars();
        let Some(letter) = chars.next() else {
            return Err(CodeError::InvalidCid);
        };
        if !letter.is_ascii_alphabetic() {
            return Err(CodeError::InvalidCid);
        }
        let tail: Vec<char> = chars.collect();
        if !(tail.len() == 2 || tail.len() == 3) || !tail.iter().all(|c| c.is_ascii_digit()) {
            return Err(CodeError::InvalidCid);
        }
        let canonical = if tail.len() == 3 {
            format!("{letter}{}{}.{}", tail[0], tail[1], tail[2])
        } else {
            format!("{letter}{}{}", tail[0], tail[1])
        };
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

string_newtype_impls!(CidCode);

/// CBHPM billing code, canonically `3.07.15.05-9`.
///
/// Shape is eight digits: a section digit, three two-digit groups and a
/// final check digit, stored punctuated as published in the CBHPM table.
/// The check digit is carried verbatim; the table is the authority, not
/// arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbhpmCode(String);

impl CbhpmCode {
    pub fn new(input: impl AsRef<str>) -> Result<Self, CodeError> {
        let d: String = input
            .as_ref()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if d.len() != 8 {
            return Err(CodeError::InvalidCbhpm);
        }
        Ok(Self(format!(
            "{}.{}.{}.{}-{}",
            &d[0..1],
            &d[1..3],
            &d[3..5],
            &d[5..7],
            &d[7..8]
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

string_newtype_impls!(CbhpmCode);

/// ANVISA product registration number, 11 or 13 bare digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnvisaRegistration(String);

impl AnvisaRegistration {
    pub fn new(input: impl AsRef<str>) -> Result<Self, CodeError> {
        let digits: String = input
            .as_ref()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.len() != 11 && digits.len() != 13 {
            return Err(CodeError::InvalidAnvisa);
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

string_newtype_impls!(AnvisaRegistration);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crm_canonical_form() {
        assert_eq!(Crm::new("123456-SP").unwrap().as_str(), "123456-SP");
        assert_eq!(Crm::new("crm 52123/rj").unwrap().as_str(), "52123-RJ");
        assert_eq!(Crm::new("9821 MG").unwrap().as_str(), "9821-MG");
    }

    #[test]
    fn crm_rejects_bad_uf_and_lengths() {
        assert!(Crm::new("123456-XX").is_err());
        assert!(Crm::new("12345678-SP").is_err());
        assert!(Crm::new("-SP").is_err());
    }

    #[test]
    fn cid_inserts_dot() {
        assert_eq!(CidCode::new("m171").unwrap().as_str(), "M17.1");
        assert_eq!(CidCode::new("M17.1").unwrap().as_str(), "M17.1");
        assert_eq!(CidCode::new("s82").unwrap().as_str(), "S82");
    }

    #[test]
    fn cid_rejects_malformed() {
        assert!(CidCode::new("171").is_err());
        assert!(CidCode::new("M1").is_err());
        assert!(CidCode::new("M17.11").is_err());
    }

    #[test]
    fn cbhpm_formats_bare_digits() {
        let code = CbhpmCode::new("30715059").unwrap();
        assert_eq!(code.as_str(), "3.07.15.05-9");
        assert_eq!(
            CbhpmCode::new("3.07.15.05-9").unwrap().as_str(),
            "3.07.15.05-9"
        );
        assert!(CbhpmCode::new("3071505").is_err());
    }

    #[test]
    fn anvisa_accepts_11_or_13_digits() {
        assert!(AnvisaRegistration::new("10380700077").is_ok());
        assert!(AnvisaRegistration::new("1038070007788").is_ok());
        assert!(AnvisaRegistration::new("12345").is_err());
    }
}
