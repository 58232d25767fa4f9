//! Brazilian taxpayer document numbers (CPF and CNPJ).
//!
//! Both types accept punctuated or bare input, strip formatting, and verify
//! the official check digits. The canonical stored form is digits only.

use crate::string_newtype_impls;

/// Errors that can occur when parsing document numbers.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("CPF must contain exactly 11 digits")]
    CpfLength,
    #[error("CPF check digits do not match")]
    CpfCheckDigit,
    #[error("CNPJ must contain exactly 14 digits")]
    CnpjLength,
    #[error("CNPJ check digits do not match")]
    CnpjCheckDigit,
}

fn digits_of(input: &str) -> Vec<u32> {
    input.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// CPF — Brazilian individual taxpayer number, stored as 11 bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    /// Parses a CPF, accepting `###.###.###-##` or bare-digit input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, DocumentError> {
        let digits = digits_of(input.as_ref());
        if digits.len() != 11 {
            return Err(DocumentError::CpfLength);
        }
        // Repeated-digit CPFs pass the modulus check but are not valid.
        if all_same(&digits) {
            return Err(DocumentError::CpfCheckDigit);
        }
        let d1 = cpf_check_digit(&digits[..9]);
        let d2 = cpf_check_digit(&digits[..10]);
        if digits[9] != d1 || digits[10] != d2 {
            return Err(DocumentError::CpfCheckDigit);
        }
        Ok(Self(digits.iter().map(|d| d.to_string()).collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats as `###.###.###-##` for display surfaces.
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }
}

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    let rem = (sum * 10) % 11;
    if rem == 10 { 0 } else { rem }
}

string_newtype_impls!(Cpf);

/// CNPJ — Brazilian company registration number, stored as 14 bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cnpj(String);

impl Cnpj {
    /// Parses a CNPJ, accepting `##.###.###/####-##` or bare-digit input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, DocumentError> {
        let digits = digits_of(input.as_ref());
        if digits.len() != 14 {
            return Err(DocumentError::CnpjLength);
        }
        if all_same(&digits) {
            return Err(DocumentError::CnpjCheckDigit);
        }
        let d1 = cnpj_check_digit(&digits[..12]);
        let d2 = cnpj_check_digit(&digits[..13]);
        if digits[12] != d1 || digits[13] != d2 {
            return Err(DocumentError::CnpjCheckDigit);
        }
        Ok(Self(digits.iter().map(|d| d.to_string()).collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats as `##.###.###/####-##` for display surfaces.
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        )
    }
}

fn cnpj_check_digit(digits: &[u32]) -> u32 {
    // Weights cycle 2..=9 from the rightmost digit.
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| d * (2 + (i as u32 % 8)))
        .sum();
    let rem = sum % 11;
    if rem < 2 { 0 } else { 11 - rem }
}

string_newtype_impls!(Cnpj);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_accepts_punctuated_input() {
        let cpf = Cpf::new("529.982.247-25").unwrap();
        assert_eq!(cpf.as_str(), "52998224725");
        assert_eq!(cpf.formatted(), "529.982.247-25");
    }

    #[test]
    fn cpf_rejects_bad_check_digit() {
        assert!(Cpf::new("529.982.247-26").is_err());
    }

    #[test]
    fn cpf_rejects_repeated_digits() {
        assert!(Cpf::new("111.111.111-11").is_err());
    }

    #[test]
    fn cpf_rejects_wrong_length() {
        assert!(Cpf::new("1234567890").is_err());
    }

    #[test]
    fn cnpj_accepts_punctuated_input() {
        let cnpj = Cnpj::new("11.222.333/0001-81").unwrap();
        assert_eq!(cnpj.as_str(), "11222333000181");
        assert_eq!(cnpj.formatted(), "11.222.333/0001-81");
    }

    #[test]
    fn cnpj_rejects_bad_check_digit() {
        assert!(Cnpj::new("11.222.333/0001-82").is_err());
    }
}
