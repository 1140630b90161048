use serde::{Deserialize, Serialize};

use streamkeep_core::{
    SerializationFormat, SerializedContent, TypeIdentifier, TypeIdentifierFormat, ValueObject,
};

use crate::metadata::ForgettablePayloadMetadata;

/// Serialized payload content and the tags needed to decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgettablePayloadContentDescriptor {
    payload_content: SerializedContent,
    payload_serialization_format: SerializationFormat,
    payload_type_identifier: TypeIdentifier,
    payload_type_identifier_format: TypeIdentifierFormat,
}

impl ForgettablePayloadContentDescriptor {
    pub fn new(
        payload_content: SerializedContent,
        payload_serialization_format: SerializationFormat,
        payload_type_identifier: TypeIdentifier,
        payload_type_identifier_format: TypeIdentifierFormat,
    ) -> Self {
        Self {
            payload_content,
            payload_serialization_format,
            payload_type_identifier,
            payload_type_identifier_format,
        }
    }

    pub fn payload_content(&self) -> &SerializedContent {
        &self.payload_content
    }

    pub fn payload_serialization_format(&self) -> &SerializationFormat {
        &self.payload_serialization_format
    }

    pub fn payload_type_identifier(&self) -> &TypeIdentifier {
        &self.payload_type_identifier
    }

    pub fn payload_type_identifier_format(&self) -> &TypeIdentifierFormat {
        &self.payload_type_identifier_format
    }
}

impl ValueObject for ForgettablePayloadContentDescriptor {}

/// Metadata and content of one payload, written and read as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgettablePayloadDescriptor {
    metadata: ForgettablePayloadMetadata,
    content: ForgettablePayloadContentDescriptor,
}

impl ForgettablePayloadDescriptor {
    pub fn new(
        metadata: ForgettablePayloadMetadata,
        content: ForgettablePayloadContentDescriptor,
    ) -> Self {
        Self { metadata, content }
    }

    pub fn metadata(&self) -> &ForgettablePayloadMetadata {
        &self.metadata
    }

    pub fn content(&self) -> &ForgettablePayloadContentDescriptor {
        &self.content
    }

    pub fn to_metadata(&self) -> ForgettablePayloadMetadata {
        self.metadata.clone()
    }

    pub fn to_content_descriptor(&self) -> ForgettablePayloadContentDescriptor {
        self.content.clone()
    }

    /// Same content, newer metadata.
    pub fn with_metadata(&self, metadata: ForgettablePayloadMetadata) -> Self {
        Self {
            metadata,
            content: self.content.clone(),
        }
    }

    pub fn into_parts(self) -> (ForgettablePayloadMetadata, ForgettablePayloadContentDescriptor) {
        (self.metadata, self.content)
    }
}

impl ValueObject for ForgettablePayloadDescriptor {}
