use serde::Serialize;
use serde_json::{Map, Value};

/// A structured contact with per-channel identifiers.
///
/// Unset fields are omitted from the serialized request, never sent as null.
/// Which identifier gets used depends on the channel the service routes the
/// notification through.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Contact {
    /// Application-assigned external ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Slack member ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_id: Option<String>,

    /// Open-ended metadata forwarded to the service.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

/// A single delivery target.
///
/// Either a bare identifier (email address, phone number, channel user ID —
/// interpreted by the service) or a structured [`Contact`]. No address format
/// validation happens client-side.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Recipient {
    Identifier(String),
    Contact(Contact),
}

impl From<&str> for Recipient {
    fn from(identifier: &str) -> Self {
        Self::Identifier(identifier.to_owned())
    }
}

impl From<String> for Recipient {
    fn from(identifier: String) -> Self {
        Self::Identifier(identifier)
    }
}

impl From<Contact> for Recipient {
    fn from(contact: Contact) -> Self {
        Self::Contact(contact)
    }
}

/// The recipient field of a send request: one target or an ordered list.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Recipients {
    One(Recipient),
    Many(Vec<Recipient>),
}

impl From<Recipient> for Recipients {
    fn from(recipient: Recipient) -> Self {
        Self::One(recipient)
    }
}

impl From<&str> for Recipients {
    fn from(identifier: &str) -> Self {
        Self::One(identifier.into())
    }
}

impl From<String> for Recipients {
    fn from(identifier: String) -> Self {
        Self::One(identifier.into())
    }
}

impl From<Contact> for Recipients {
    fn from(contact: Contact) -> Self {
        Self::One(contact.into())
    }
}

impl From<Vec<Recipient>> for Recipients {
    fn from(recipients: Vec<Recipient>) -> Self {
        Self::Many(recipients)
    }
}
