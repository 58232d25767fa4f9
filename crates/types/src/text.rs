//! General-purpose validated text types.

use crate::string_newtype_impls;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not a plausible email address
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one
/// non-whitespace character. The input is trimmed of leading and trailing
/// whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

string_newtype_impls!(NonEmptyText);

/// A lowercased, structurally valid email address.
///
/// Validation is deliberately shallow: exactly one `@`, non-empty local and
/// domain parts, and a dot somewhere in the domain. Anything stricter belongs
/// to the mail system, not this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and canonicalises (trim + lowercase) an email address.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let value = input.as_ref().trim().to_lowercase();
        let Some((local, domain)) = value.split_once('@') else {
            return Err(TextError::InvalidEmail(value));
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
            return Err(TextError::InvalidEmail(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims() {
        let t = NonEmptyText::new("  Joelho direito  ").unwrap();
        assert_eq!(t.as_str(), "Joelho direito");
    }

    #[test]
    fn non_empty_text_rejects_whitespace_only() {
        assert!(NonEmptyText::new("   ").is_err());
        assert!(NonEmptyText::new("").is_err());
    }

    #[test]
    fn email_is_lowercased() {
        let e = EmailAddress::parse("Dr.Silva@Clinica.COM.BR").unwrap();
        assert_eq!(e.as_str(), "dr.silva@clinica.com.br");
    }

    #[test]
    fn email_rejects_malformed() {
        assert!(EmailAddress::parse("no-at-sign").is_err());
        assert!(EmailAddress::parse("@domain.com").is_err());
        assert!(EmailAddress::parse("user@").is_err());
        assert!(EmailAddress::parse("user@nodot").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let t = NonEmptyText::new("Hospital das Clínicas").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: NonEmptyText = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn serde_rejects_empty() {
        assert!(serde_json::from_str::<NonEmptyText>("\"  \"").is_err());
    }
}
