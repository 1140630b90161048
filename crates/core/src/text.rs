//! Validated text scalars: serialized content, format tags, type identifiers,
//! and the bounded strings carried by a forgotten-payload marker.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Maximum length (in characters) of a forgetting reason.
pub const MAX_FORGETTING_REASON_LEN: usize = 1024;

/// Maximum length (in characters) of a forgetting requester.
pub const MAX_FORGETTING_REQUESTED_BY_LEN: usize = 256;

/// Serialized event or payload content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializedContent(String);

/// Tag naming the serialization format of a [`SerializedContent`] (e.g. `json`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializationFormat(String);

/// Identifier of the type the content deserializes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeIdentifier(String);

/// Tag naming the scheme a [`TypeIdentifier`] is written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeIdentifierFormat(String);

/// Why a payload was forgotten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ForgettingReason(String);

/// Who (user, job, service) requested a payload to be forgotten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ForgettingRequestedBy(String);

fn validate_text(name: &str, value: &str, max_len: Option<usize>) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_value(format!("{name} must not be blank")));
    }
    if let Some(max) = max_len {
        let len = value.chars().count();
        if len > max {
            return Err(DomainError::invalid_value(format!(
                "{name} must be at most {max} characters (got {len})"
            )));
        }
    }
    Ok(())
}

macro_rules! impl_text_newtype {
    ($t:ty, $name:literal, $max:expr) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                validate_text($name, &value, $max)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl ValueObject for $t {}
    };
}

impl_text_newtype!(SerializedContent, "SerializedContent", None);
impl_text_newtype!(SerializationFormat, "SerializationFormat", None);
impl_text_newtype!(TypeIdentifier, "TypeIdentifier", None);
impl_text_newtype!(TypeIdentifierFormat, "TypeIdentifierFormat", None);
impl_text_newtype!(
    ForgettingReason,
    "ForgettingReason",
    Some(MAX_FORGETTING_REASON_LEN)
);
impl_text_newtype!(
    ForgettingRequestedBy,
    "ForgettingRequestedBy",
    Some(MAX_FORGETTING_REQUESTED_BY_LEN)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        for blank in ["", "   ", "\t\n"] {
            let err = SerializationFormat::new(blank).unwrap_err();
            assert!(matches!(err, DomainError::InvalidValue(_)));
        }
    }

    #[test]
    fn content_keeps_surrounding_whitespace() {
        let content = SerializedContent::new(" {\"a\":1} ").unwrap();
        assert_eq!(content.as_str(), " {\"a\":1} ");
    }

    #[test]
    fn forgetting_reason_is_bounded() {
        let at_limit = "r".repeat(MAX_FORGETTING_REASON_LEN);
        assert!(ForgettingReason::new(at_limit).is_ok());

        let over = "r".repeat(MAX_FORGETTING_REASON_LEN + 1);
        assert!(matches!(
            ForgettingReason::new(over),
            Err(DomainError::InvalidValue(_))
        ));
    }

    #[test]
    fn requested_by_is_bounded() {
        let over = "u".repeat(MAX_FORGETTING_REQUESTED_BY_LEN + 1);
        assert!(ForgettingRequestedBy::new(over).is_err());
        assert!(ForgettingRequestedBy::new("gdpr-service").is_ok());
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<TypeIdentifier>("\"  \"").is_err());
        let id: TypeIdentifier = serde_json::from_str("\"orders.placed\"").unwrap();
        assert_eq!(id.as_str(), "orders.placed");
    }
}
