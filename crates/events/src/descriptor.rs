use serde::{Deserialize, Serialize};

use streamkeep_core::{SerializationFormat, SerializedContent, TypeIdentifier, TypeIdentifierFormat};

/// Serialized form of one domain event.
///
/// All four fields are required: the content alone is not enough to read an
/// event back without knowing how it was written and what it turns into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDescriptor {
    content: SerializedContent,
    serialization_format: SerializationFormat,
    type_identifier: TypeIdentifier,
    type_identifier_format: TypeIdentifierFormat,
}

impl EventDescriptor {
    pub fn new(
        content: SerializedContent,
        serialization_format: SerializationFormat,
        type_identifier: TypeIdentifier,
        type_identifier_format: TypeIdentifierFormat,
    ) -> Self {
        Self {
            content,
            serialization_format,
            type_identifier,
            type_identifier_format,
        }
    }

    pub fn content(&self) -> &SerializedContent {
        &self.content
    }

    pub fn serialization_format(&self) -> &SerializationFormat {
        &self.serialization_format
    }

    pub fn type_identifier(&self) -> &TypeIdentifier {
        &self.type_identifier
    }

    pub fn type_identifier_format(&self) -> &TypeIdentifierFormat {
        &self.type_identifier_format
    }
}
