//! Entities without derived attributes: accounts, contacts, chats and
//! chat memberships.

use super::{Attributes, Entity};
use crate::dbb::FieldMap;
use crate::schema::EntityKind;

macro_rules! plain_entity {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            attrs: Attributes,
        }

        impl Entity for $name {
            const KIND: EntityKind = $kind;

            fn from_fields(fields: FieldMap) -> Self {
                Self {
                    attrs: Attributes::from_fields(Self::KIND, fields),
                }
            }

            fn attributes(&self) -> &Attributes {
                &self.attrs
            }
        }
    };
}

plain_entity!(
    /// The local user's own account (`profile*.dbb`).
    Account,
    EntityKind::Account
);

plain_entity!(
    /// A contact list entry (`user*.dbb`).
    Contact,
    EntityKind::Contact
);

plain_entity!(
    /// A chat (`chat*.dbb`).
    Chat,
    EntityKind::Chat
);

plain_entity!(
    /// Membership of one identity in a chat (`chatmember*.dbb`).
    ChatMember,
    EntityKind::ChatMember
);

impl Account {
    pub fn skypename(&self) -> Option<&str> {
        self.attrs.text("skypename")
    }

    pub fn fullname(&self) -> Option<&str> {
        self.attrs.text("fullname")
    }

    pub fn mood_text(&self) -> Option<&str> {
        self.attrs.text("mood_text")
    }
}

impl Contact {
    pub fn skypename(&self) -> Option<&str> {
        self.attrs.text("skypename")
    }

    pub fn fullname(&self) -> Option<&str> {
        self.attrs.text("fullname")
    }

    /// Display name chosen by the local user, if any.
    pub fn given_displayname(&self) -> Option<&str> {
        self.attrs.text("given_displayname")
    }

    pub fn is_blocked(&self) -> bool {
        self.attrs.int("isblocked").is_some_and(|v| v != 0)
    }
}

impl Chat {
    pub fn chatname(&self) -> Option<&str> {
        self.attrs.text("chatname")
    }

    pub fn topic(&self) -> Option<&str> {
        self.attrs.text("topic")
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.attrs.text("friendly_name")
    }

    /// Space separated identities of the chat members.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .text("members")
            .unwrap_or_default()
            .split_whitespace()
    }
}

impl ChatMember {
    pub fn chatname(&self) -> Option<&str> {
        self.attrs.text("chatname")
    }

    pub fn identity(&self) -> Option<&str> {
        self.attrs.text("identity")
    }

    pub fn is_active(&self) -> bool {
        self.attrs.int("isactive").is_some_and(|v| v != 0)
    }
}
