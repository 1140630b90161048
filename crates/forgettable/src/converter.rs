//! Conversion between in-process payload values and stored content descriptors.

use core::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use streamkeep_core::{
    DomainError, DomainResult, SerializationFormat, SerializedContent, TypeIdentifier,
    TypeIdentifierFormat,
};

use crate::descriptor::ForgettablePayloadContentDescriptor;

pub const JSON_SERIALIZATION_FORMAT: &str = "json";

/// Type identifiers produced from `core::any::type_name`.
pub const RUST_TYPE_IDENTIFIER_FORMAT: &str = "rust-type";

pub trait ForgettablePayloadContentConverter<T>: Send + Sync {
    fn to_content_descriptor(&self, payload: &T) -> DomainResult<ForgettablePayloadContentDescriptor>;

    fn from_content_descriptor(&self, descriptor: &ForgettablePayloadContentDescriptor) -> DomainResult<T>;
}

/// JSON converter via serde.
pub struct JsonPayloadContentConverter<T> {
    type_identifier: String,
    _payload: PhantomData<fn() -> T>,
}

impl<T> JsonPayloadContentConverter<T> {
    pub fn new() -> Self {
        Self::with_type_identifier(core::any::type_name::<T>())
    }

    /// Use a stable identifier instead of the Rust type path.
    pub fn with_type_identifier(type_identifier: impl Into<String>) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            _payload: PhantomData,
        }
    }

    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }
}

impl<T> Default for JsonPayloadContentConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonPayloadContentConverter<T> {
    fn clone(&self) -> Self {
        Self::with_type_identifier(self.type_identifier.clone())
    }
}

impl<T> core::fmt::Debug for JsonPayloadContentConverter<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonPayloadContentConverter")
            .field("type_identifier", &self.type_identifier)
            .finish()
    }
}

impl<T> ForgettablePayloadContentConverter<T> for JsonPayloadContentConverter<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_content_descriptor(&self, payload: &T) -> DomainResult<ForgettablePayloadContentDescriptor> {
        let content = serde_json::to_string(payload)
            .map_err(|e| DomainError::invalid_operation(format!("payload serialization failed: {e}")))?;
        Ok(ForgettablePayloadContentDescriptor::new(
            SerializedContent::new(content)?,
            SerializationFormat::new(JSON_SERIALIZATION_FORMAT)?,
            TypeIdentifier::new(self.type_identifier.as_str())?,
            TypeIdentifierFormat::new(RUST_TYPE_IDENTIFIER_FORMAT)?,
        ))
    }

    fn from_content_descriptor(&self, descriptor: &ForgettablePayloadContentDescriptor) -> DomainResult<T> {
        let format = descriptor.payload_serialization_format().as_str();
        if format != JSON_SERIALIZATION_FORMAT {
            return Err(DomainError::invalid_value(format!(
                "unsupported payload serialization format '{format}'"
            )));
        }
        let type_identifier = descriptor.payload_type_identifier().as_str();
        if type_identifier != self.type_identifier {
            return Err(DomainError::invalid_value(format!(
                "payload of type '{type_identifier}' cannot be read as '{}'",
                self.type_identifier
            )));
        }
        serde_json::from_str(descriptor.payload_content().as_str())
            .map_err(|e| DomainError::invalid_value(format!("malformed payload content: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct ContactDetails {
        email: String,
    }

    #[test]
    fn descriptor_carries_json_and_type_tags() {
        let converter = JsonPayloadContentConverter::<ContactDetails>::with_type_identifier("contact");
        let descriptor = converter
            .to_content_descriptor(&ContactDetails {
                email: "ada@example.com".to_string(),
            })
            .unwrap();

        assert_eq!(descriptor.payload_serialization_format().as_str(), "json");
        assert_eq!(descriptor.payload_type_identifier().as_str(), "contact");
        assert_eq!(descriptor.payload_type_identifier_format().as_str(), "rust-type");
        assert!(descriptor.payload_content().as_str().contains("ada@example.com"));
    }

    #[test]
    fn default_identifier_is_the_type_path() {
        let converter = JsonPayloadContentConverter::<ContactDetails>::new();
        assert!(converter.type_identifier().ends_with("ContactDetails"));
    }

    #[test]
    fn foreign_type_identifiers_are_rejected() {
        let writer = JsonPayloadContentConverter::<ContactDetails>::with_type_identifier("contact");
        let reader = JsonPayloadContentConverter::<ContactDetails>::with_type_identifier("address");
        let descriptor = writer
            .to_content_descriptor(&ContactDetails {
                email: "x@y.z".to_string(),
            })
            .unwrap();

        let err = reader.from_content_descriptor(&descriptor).unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue(_)));
        assert_eq!(
            writer.from_content_descriptor(&descriptor).unwrap().email,
            "x@y.z"
        );
    }
}
