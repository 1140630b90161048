use std::sync::Arc;

use serde::{Deserialize, Serialize};

use streamkeep_core::{EntryId, StreamId};
use streamkeep_events::DomainEvent;

use crate::converter::JsonPayloadContentConverter;
use crate::descriptor::ForgettablePayloadDescriptor;
use crate::finder::ForgettablePayloadFinder;
use crate::payload::{ForgettablePayload, ForgettablePayloadHandle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistered {
    pub customer_name: String,
    pub contact: ForgettablePayload<ContactDetails>,
    pub address: ForgettablePayload<PostalAddress>,
}

impl DomainEvent for CustomerRegistered {
    fn event_type(&self) -> &'static str {
        "customer.registered"
    }
}

pub fn registered() -> CustomerRegistered {
    CustomerRegistered {
        customer_name: "Ada".to_string(),
        contact: ForgettablePayload::create(ContactDetails {
            email: "ada@example.com".to_string(),
        }),
        address: ForgettablePayload::create(PostalAddress {
            street: "12 Analytical Row".to_string(),
            city: "London".to_string(),
        }),
    }
}

pub fn customer_finder() -> Arc<dyn ForgettablePayloadFinder<CustomerRegistered>> {
    let contact = Arc::new(JsonPayloadContentConverter::<ContactDetails>::with_type_identifier(
        "contact",
    ));
    let address = Arc::new(JsonPayloadContentConverter::<PostalAddress>::with_type_identifier(
        "address",
    ));
    Arc::new(
        move |event: &CustomerRegistered| -> Vec<Box<dyn ForgettablePayloadHandle>> {
            vec![
                event.contact.handle(contact.clone()),
                event.address.handle(address.clone()),
            ]
        },
    )
}

/// A `Created` descriptor for a contact payload that was never attached to an event.
pub fn created_descriptor() -> ForgettablePayloadDescriptor {
    let payload = ForgettablePayload::create(ContactDetails {
        email: "ada@example.com".to_string(),
    });
    let converter = JsonPayloadContentConverter::<ContactDetails>::with_type_identifier("contact");
    match payload.try_create_metadata_for_event_stream_id_and_entry_id(
        StreamId::new(),
        EntryId::new(),
        &converter,
    ) {
        Ok(Some(descriptor)) => descriptor,
        other => panic!("fresh payload must associate, got {other:?}"),
    }
}
