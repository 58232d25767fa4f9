//! Validated domain types for the OPX surgical order system.
//!
//! Every type in this crate guarantees its invariant at construction time:
//! once you hold a [`Cpf`] or a [`CidCode`], it is well-formed. Serde
//! deserialization goes through the same constructors, so malformed values
//! are rejected at the API boundary rather than deep inside a repository.

mod codes;
mod documents;
mod text;

pub use codes::{AnvisaRegistration, CbhpmCode, CidCode, CodeError, Crm};
pub use documents::{Cnpj, Cpf, DocumentError};
pub use text::{EmailAddress, NonEmptyText, TextError};

/// Implements `Display`, `AsRef<str>` and string-canonical serde for a
/// single-field string newtype.
macro_rules! string_newtype_impls {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ty::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use string_newtype_impls;
