//! Encoding typed events into [`EventDescriptor`]s and back.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use streamkeep_core::{
    DomainError, SerializationFormat, SerializedContent, TypeIdentifier, TypeIdentifierFormat,
};

use crate::descriptor::EventDescriptor;
use crate::event::DomainEvent;

/// Serialization format tag written by [`JsonEventCodec`].
pub const JSON_SERIALIZATION_FORMAT: &str = "json";

/// Type identifier format tag for identifiers taken from [`DomainEvent::event_type`].
pub const EVENT_TYPE_IDENTIFIER_FORMAT: &str = "event-type";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported serialization format: {0}")]
    UnsupportedFormat(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Converts between typed events and their stored descriptors.
pub trait EventCodec<E>: Send + Sync {
    fn encode(&self, event: &E) -> Result<EventDescriptor, CodecError>;

    fn decode(&self, descriptor: &EventDescriptor) -> Result<E, CodecError>;
}

/// JSON codec via serde.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEventCodec;

impl JsonEventCodec {
    pub fn new() -> Self {
        Self
    }
}

impl<E> EventCodec<E> for JsonEventCodec
where
    E: DomainEvent + Serialize + DeserializeOwned,
{
    fn encode(&self, event: &E) -> Result<EventDescriptor, CodecError> {
        let content = serde_json::to_string(event)?;
        Ok(EventDescriptor::new(
            SerializedContent::new(content)?,
            SerializationFormat::new(JSON_SERIALIZATION_FORMAT)?,
            TypeIdentifier::new(event.event_type())?,
            TypeIdentifierFormat::new(EVENT_TYPE_IDENTIFIER_FORMAT)?,
        ))
    }

    fn decode(&self, descriptor: &EventDescriptor) -> Result<E, CodecError> {
        let format = descriptor.serialization_format().as_str();
        if format != JSON_SERIALIZATION_FORMAT {
            return Err(CodecError::UnsupportedFormat(format.to_string()));
        }
        Ok(serde_json::from_str(descriptor.content().as_str())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct AccountOpened {
        owner: String,
    }

    impl DomainEvent for AccountOpened {
        fn event_type(&self) -> &'static str {
            "account.opened"
        }
    }

    #[test]
    fn encode_tags_format_and_type() {
        let descriptor = JsonEventCodec
            .encode(&AccountOpened {
                owner: "ada".to_string(),
            })
            .unwrap();

        assert_eq!(descriptor.serialization_format().as_str(), "json");
        assert_eq!(descriptor.type_identifier().as_str(), "account.opened");
        assert_eq!(descriptor.type_identifier_format().as_str(), "event-type");
    }

    #[test]
    fn decode_rejects_foreign_formats() {
        let descriptor = EventDescriptor::new(
            SerializedContent::new("<xml/>").unwrap(),
            SerializationFormat::new("xml").unwrap(),
            TypeIdentifier::new("account.opened").unwrap(),
            TypeIdentifierFormat::new("event-type").unwrap(),
        );

        let result: Result<AccountOpened, _> = JsonEventCodec.decode(&descriptor);
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(f)) if f == "xml"));
    }

    #[test]
    fn decode_reads_back_the_event() {
        let event = AccountOpened {
            owner: "grace".to_string(),
        };
        let descriptor = JsonEventCodec.encode(&event).unwrap();
        let decoded: AccountOpened = JsonEventCodec.decode(&descriptor).unwrap();
        assert_eq!(decoded, event);
    }
}
