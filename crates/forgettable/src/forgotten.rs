//! The marker that replaces a payload's content once it is forgotten.

use serde::{Deserialize, Serialize};

use streamkeep_core::{
    DomainError, DomainResult, ForgettingReason, ForgettingRequestedBy, ForgettingTime,
    SerializationFormat, SerializedContent, TypeIdentifier, TypeIdentifierFormat, ValueObject,
};

use crate::converter::{JSON_SERIALIZATION_FORMAT, RUST_TYPE_IDENTIFIER_FORMAT};
use crate::descriptor::ForgettablePayloadContentDescriptor;

/// Type identifier stored alongside a forgotten marker.
pub const FORGOTTEN_PAYLOAD_TYPE_IDENTIFIER: &str = "streamkeep.forgotten-payload";

/// Who forgot a payload, when, and why.
///
/// Reason and requester are bounded so the marker stays safe to retain forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgottenPayload {
    forgetting_time: ForgettingTime,
    forgetting_reason: ForgettingReason,
    forgetting_requested_by: ForgettingRequestedBy,
}

impl ForgottenPayload {
    /// A marker stamped with the current time.
    pub fn new(
        forgetting_reason: ForgettingReason,
        forgetting_requested_by: ForgettingRequestedBy,
    ) -> Self {
        Self::at(ForgettingTime::now(), forgetting_reason, forgetting_requested_by)
    }

    pub fn at(
        forgetting_time: ForgettingTime,
        forgetting_reason: ForgettingReason,
        forgetting_requested_by: ForgettingRequestedBy,
    ) -> Self {
        Self {
            forgetting_time,
            forgetting_reason,
            forgetting_requested_by,
        }
    }

    pub fn forgetting_time(&self) -> ForgettingTime {
        self.forgetting_time
    }

    pub fn forgetting_reason(&self) -> &ForgettingReason {
        &self.forgetting_reason
    }

    pub fn forgetting_requested_by(&self) -> &ForgettingRequestedBy {
        &self.forgetting_requested_by
    }

    pub fn to_content_descriptor(&self) -> DomainResult<ForgettablePayloadContentDescriptor> {
        let content = serde_json::to_string(self).map_err(|e| {
            DomainError::invalid_operation(format!("forgotten marker serialization failed: {e}"))
        })?;
        Ok(ForgettablePayloadContentDescriptor::new(
            SerializedContent::new(content)?,
            SerializationFormat::new(JSON_SERIALIZATION_FORMAT)?,
            TypeIdentifier::new(FORGOTTEN_PAYLOAD_TYPE_IDENTIFIER)?,
            TypeIdentifierFormat::new(RUST_TYPE_IDENTIFIER_FORMAT)?,
        ))
    }

    pub fn is_marker(descriptor: &ForgettablePayloadContentDescriptor) -> bool {
        descriptor.payload_type_identifier().as_str() == FORGOTTEN_PAYLOAD_TYPE_IDENTIFIER
    }

    pub fn from_content_descriptor(
        descriptor: &ForgettablePayloadContentDescriptor,
    ) -> DomainResult<Self> {
        if !Self::is_marker(descriptor) {
            return Err(DomainError::invalid_value(format!(
                "content of type '{}' is not a forgotten marker",
                descriptor.payload_type_identifier()
            )));
        }
        serde_json::from_str(descriptor.payload_content().as_str())
            .map_err(|e| DomainError::invalid_value(format!("malformed forgotten marker: {e}")))
    }
}

impl ValueObject for ForgottenPayload {}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> ForgottenPayload {
        ForgottenPayload::new(
            ForgettingReason::new("customer requested erasure").unwrap(),
            ForgettingRequestedBy::new("privacy-desk").unwrap(),
        )
    }

    #[test]
    fn marker_is_tagged_with_its_own_type_identifier() {
        let descriptor = marker().to_content_descriptor().unwrap();
        assert_eq!(
            descriptor.payload_type_identifier().as_str(),
            FORGOTTEN_PAYLOAD_TYPE_IDENTIFIER
        );
        assert_eq!(descriptor.payload_serialization_format().as_str(), "json");
        assert!(ForgottenPayload::is_marker(&descriptor));
    }

    #[test]
    fn marker_reads_back_from_its_descriptor() {
        let original = marker();
        let descriptor = original.to_content_descriptor().unwrap();
        assert_eq!(ForgottenPayload::from_content_descriptor(&descriptor).unwrap(), original);
    }

    #[test]
    fn ordinary_content_is_not_a_marker() {
        let descriptor = ForgettablePayloadContentDescriptor::new(
            SerializedContent::new("{\"email\":\"a@b.c\"}").unwrap(),
            SerializationFormat::new("json").unwrap(),
            TypeIdentifier::new("customer.contact").unwrap(),
            TypeIdentifierFormat::new("rust-type").unwrap(),
        );
        let err = ForgottenPayload::from_content_descriptor(&descriptor).unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue(_)));
    }
}
