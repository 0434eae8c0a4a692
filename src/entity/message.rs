//! Chat messages (`chatmsg*.dbb`).

use super::{Attributes, Entity, ctime_or_unknown};
use crate::dbb::{FieldMap, FieldValue};
use crate::schema::EntityKind;

/// Dialog partner used when none is stored and none can be derived.
pub const NO_PARTNER: &str = "None";

/// A single chat message.
///
/// Besides the stored fields, every message carries `ctime` (the creation
/// time rendered from `timestamp`, or `Unknown`) and a `dialog_partner`.
/// One-to-one messages store the partner explicitly; group chat messages
/// get `chat_<id>` derived from the chat name.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    attrs: Attributes,
}

impl ChatMessage {
    pub fn pk_id(&self) -> Option<u64> {
        self.attrs.int("pk_id")
    }

    pub fn chatname(&self) -> Option<&str> {
        self.attrs.text("chatname")
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> Option<u64> {
        self.attrs.int("timestamp")
    }

    /// Skype name of the sender.
    pub fn author(&self) -> Option<&str> {
        self.attrs.text("author")
    }

    pub fn from_dispname(&self) -> Option<&str> {
        self.attrs.text("from_dispname")
    }

    /// Message text. Present only on messages that were actually said.
    pub fn body_xml(&self) -> Option<&str> {
        self.attrs.text("body_xml")
    }

    pub fn dialog_partner(&self) -> &str {
        self.attrs.text("dialog_partner").unwrap_or(NO_PARTNER)
    }

    pub fn ctime(&self) -> &str {
        self.attrs.text("ctime").unwrap_or(super::UNKNOWN_TIME)
    }

    /// Returns `true` for conversational messages, as opposed to membership
    /// or topic change events.
    pub fn is_said(&self) -> bool {
        self.attrs.contains("body_xml")
    }

    /// Returns `true` if the dialog partner wrote this message.
    pub fn is_from_partner(&self) -> bool {
        self.author() == Some(self.dialog_partner())
    }

    /// Identifier shown in rendered output: `pk_id`, else the record id.
    pub fn display_id(&self) -> u64 {
        self.pk_id().or_else(|| self.record_id()).unwrap_or(0)
    }
}

/// Derives the partner of a group chat message from its chat name:
/// `#alice/$bob;1234` becomes `chat_1234`.
fn partner_from_chatname(chatname: Option<&FieldValue>) -> String {
    chatname
        .and_then(FieldValue::as_text)
        .and_then(|name| name.split(';').nth(1))
        .map_or_else(|| NO_PARTNER.to_string(), |id| format!("chat_{id}"))
}

impl Entity for ChatMessage {
    const KIND: EntityKind = EntityKind::Message;

    fn from_fields(fields: FieldMap) -> Self {
        let mut attrs = Attributes::from_fields(Self::KIND, fields);
        let ctime = ctime_or_unknown(attrs.get("timestamp"));
        attrs.insert("ctime", FieldValue::Text(ctime));
        if !attrs.contains("dialog_partner") {
            let partner = partner_from_chatname(attrs.get("chatname"));
            attrs.insert("dialog_partner", FieldValue::Text(partner));
        }
        Self { attrs }
    }

    fn attributes(&self) -> &Attributes {
        &self.attrs
    }
}
