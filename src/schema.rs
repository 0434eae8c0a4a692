//! Entity kinds and their field code tables.
//!
//! Each table maps the numeric field codes found in a decoded record to
//! attribute names. Tables are sorted by code. Negative codes are reserved
//! for values synthesized by the decoder (`-1`, the record id) or derived
//! during materialization (`-2` and below).

use serde::{Deserialize, Serialize};

/// The six kinds of records the client persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Message,
    Account,
    Contact,
    Chat,
    ChatMember,
    Call,
}

impl EntityKind {
    /// Returns all entity kinds.
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Message,
            EntityKind::Account,
            EntityKind::Contact,
            EntityKind::Chat,
            EntityKind::ChatMember,
            EntityKind::Call,
        ]
    }

    /// File name prefix of this kind's DBB files (`chatmsg256.dbb`).
    pub fn file_prefix(self) -> &'static str {
        match self {
            EntityKind::Message => "chatmsg",
            EntityKind::Account => "profile",
            EntityKind::Contact => "user",
            EntityKind::Chat => "chat",
            EntityKind::ChatMember => "chatmember",
            EntityKind::Call => "call",
        }
    }

    /// Returns `true` if `file_name` is a DBB file of this kind.
    ///
    /// The prefix must be followed by a digit, so `chat` does not claim
    /// `chatmsg256.dbb`.
    pub fn matches_file_name(self, file_name: &str) -> bool {
        file_name
            .strip_prefix(self.file_prefix())
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            && file_name.ends_with(".dbb")
    }

    /// The code to attribute name table for this kind.
    pub fn fields(self) -> &'static [(i64, &'static str)] {
        match self {
            EntityKind::Message => MESSAGE_FIELDS,
            EntityKind::Account => ACCOUNT_FIELDS,
            EntityKind::Contact => CONTACT_FIELDS,
            EntityKind::Chat => CHAT_FIELDS,
            EntityKind::ChatMember => CHAT_MEMBER_FIELDS,
            EntityKind::Call => CALL_FIELDS,
        }
    }

    /// Looks up the attribute name for `code`.
    pub fn field_name(self, code: i64) -> Option<&'static str> {
        let fields = self.fields();
        fields
            .binary_search_by_key(&code, |&(c, _)| c)
            .ok()
            .map(|i| fields[i].1)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Message => write!(f, "Message"),
            EntityKind::Account => write!(f, "Account"),
            EntityKind::Contact => write!(f, "Contact"),
            EntityKind::Chat => write!(f, "Chat"),
            EntityKind::ChatMember => write!(f, "ChatMember"),
            EntityKind::Call => write!(f, "Call"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "message" | "chatmsg" => Ok(EntityKind::Message),
            "account" | "profile" => Ok(EntityKind::Account),
            "contact" | "user" => Ok(EntityKind::Contact),
            "chat" => Ok(EntityKind::Chat),
            "chatmember" | "chat_member" => Ok(EntityKind::ChatMember),
            "call" => Ok(EntityKind::Call),
            _ => Err(format!(
                "Unknown entity kind: '{}'. Expected one of: message, account, contact, chat, chatmember, call",
                s
            )),
        }
    }
}

// chatmsg_type: 1 addmembers, 2 createchatwith, 3 said, 4 left, 5 changetopic
// chatmsg_status: 1 sending, 2 sent, 3 received, 4 read
static MESSAGE_FIELDS: &[(i64, &str)] = &[
    (-2, "ctime"),
    (-1, "recid"),
    (3, "pk_id"),
    (7, "crc"),
    (11, "remote_id"),
    (480, "chatname"),
    (485, "timestamp"),
    (488, "author"),
    (492, "from_dispname"),
    (497, "chatmsg_type"),
    (500, "users_added"),
    (505, "leavereason"),
    (508, "body_xml"),
    (513, "chatmsg_status"),
    (517, "body_is_rawxml"),
    (888, "edited_by"),
    (893, "edited_timestamp"),
    (3160, "dialog_partner"),
    (3170, "guid"),
    (3845, "int3845"),
    (3857, "int3857"),
    (3877, "int3877"),
];

static ACCOUNT_FIELDS: &[(i64, &str)] = &[
    (-1, "recid"),
    (7, "emailbin"),
    (11, "int11"),
    (16, "skypename"),
    (20, "fullname"),
    (29, "birthday"),
    (33, "gender"),
    (36, "languages"),
    (40, "country"),
    (44, "province"),
    (48, "city"),
    (52, "phone_home"),
    (56, "phone_office"),
    (60, "phone_mobile"),
    (64, "emails"),
    (68, "homepage"),
    (72, "about"),
    (77, "profile_timestamp"),
    (91, "profile_attachments"),
    (104, "mood_text"),
    (109, "timezone"),
    (116, "ipcountry"),
    (150, "avatar_image"),
    (296, "balance_currency"),
    (301, "balance"),
    (641, "int641"),
    (645, "int645"),
    (657, "int657"),
    (820, "rich_mood_text"),
    (3205, "registration_timestamp"),
    (3217, "int3217"),
];

static CONTACT_FIELDS: &[(i64, &str)] = &[
    (-1, "recid"),
    (3, "authorization_certificate"),
    (11, "certificate_send_count"),
    (15, "account_modification_serial_nr"),
    (16, "skypename"),
    (19, "saved_directory_blob"),
    (20, "fullname"),
    (24, "phone"),
    (27, "server_synced"),
    (29, "birthday"),
    (33, "gender"),
    (35, "last_used_networktime"),
    (36, "languages"),
    (40, "country"),
    (44, "province"),
    (48, "city"),
    (52, "phone_home"),
    (56, "phone_office"),
    (59, "blob59"),
    (60, "phone_mobile"),
    (64, "emails"),
    (68, "homepage"),
    (72, "about"),
    (77, "time77"),
    (93, "given_authlevel"),
    (99, "int99"),
    (109, "int109"),
    (113, "nrof_authed_buddies"),
    (115, "int115"),
    (119, "blob119"),
    (121, "buddystatus"),
    (125, "isauthorized"),
    (129, "isblocked"),
    (132, "given_displayname"),
    (141, "time141"),
    (146, "blob146"),
    (150, "avatar_image"),
    (157, "lastcalled_time"),
    (165, "system_account"),
    (1006, "int1006"),
    (1007, "int1007"),
    (1008, "int1008"),
    (1009, "int1009"),
    (1010, "int1010"),
    (1011, "str1011"),
    (1019, "extprop_seen_birthday"),
    (1022, "time1022"),
];

static CHAT_FIELDS: &[(i64, &str)] = &[
    (-1, "recid"),
    (3, "int3"),
    (15, "blob15"),
    (19, "one19"),
    (23, "time23"),
    (31, "zero13"),
    (39, "blob"),
    (47, "one47"),
    (51, "cachedat"),
    (55, "topicauto"),
    (59, "one59"),
    (440, "chatname"),
    (445, "timestamp"),
    (448, "user448"),
    (453, "type"),
    (456, "posters"),
    (460, "members"),
    (464, "topic"),
    (468, "activemembers"),
    (472, "friendly_name"),
    (561, "bookmarked"),
    (565, "activity_time"),
    (569, "mystatus"),
    (581, "moodchat"),
    (638, "chatpicture"),
    (828, "user828"),
    // 1006..1020 relate to multichat
    (1006, "int1006"),
    (1007, "int1007"),
    (1010, "int1010"),
    (1020, "int1020"),
    (3081, "four3081"),
    (3096, "topic_xml"),
];

static CHAT_MEMBER_FIELDS: &[(i64, &str)] = &[
    (-1, "recid"),
    (584, "chatname"),
    (588, "identity"),
    (593, "role"),
    (597, "isactive"),
];

// Host records carry `name`; member records carry the 920+ keys and refer
// back to the host through `call_name` and `call_recid`.
static CALL_FIELDS: &[(i64, &str)] = &[
    (-4, "gname"),
    (-3, "is_host"),
    (-2, "ctime"),
    (-1, "recid"),
    (3, "str3"),
    (7, "call_recid"),
    (11, "str11"),
    (161, "begin_timestamp"),
    (184, "call_name"),
    (252, "topic"),
    // nonzero only when joining after the call started
    (693, "start_timestamp"),
    (813, "is_muted"),
    (817, "is_unseen_missed"),
    (840, "host_identity"),
    (849, "duration"),
    (868, "name"),
    (917, "int917"),
    (920, "identity"),
    (924, "dispname"),
    (933, "call_duration"),
    (945, "type"),
    (949, "status"),
    (953, "failurereason"),
    (964, "pstn_statustext"),
    (3296, "real_identity"),
    (3301, "member_start_timestamp"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_sorted_and_unique() {
        for kind in EntityKind::all() {
            let fields = kind.fields();
            for pair in fields.windows(2) {
                assert!(pair[0].0 < pair[1].0, "{kind}: {:?} before {:?}", pair[0], pair[1]);
            }
            assert_eq!(kind.field_name(-1), Some("recid"), "{kind} lacks recid");
        }
    }

    #[test]
    fn test_field_name_lookup() {
        assert_eq!(EntityKind::Message.field_name(508), Some("body_xml"));
        assert_eq!(EntityKind::Message.field_name(3160), Some("dialog_partner"));
        assert_eq!(EntityKind::Call.field_name(868), Some("name"));
        assert_eq!(EntityKind::Call.field_name(-3), Some("is_host"));
        assert_eq!(EntityKind::ChatMember.field_name(597), Some("isactive"));
        assert_eq!(EntityKind::Message.field_name(9999), None);
    }

    #[test]
    fn test_matches_file_name() {
        assert!(EntityKind::Message.matches_file_name("chatmsg256.dbb"));
        assert!(EntityKind::Chat.matches_file_name("chat512.dbb"));
        assert!(!EntityKind::Chat.matches_file_name("chatmsg256.dbb"));
        assert!(!EntityKind::Chat.matches_file_name("chatmember256.dbb"));
        assert!(EntityKind::ChatMember.matches_file_name("chatmember256.dbb"));
        assert!(EntityKind::Contact.matches_file_name("user4096.dbb"));
        assert!(!EntityKind::Call.matches_file_name("call256.lock"));
        assert!(!EntityKind::Call.matches_file_name("callmember256.dbb"));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("message".parse::<EntityKind>().unwrap(), EntityKind::Message);
        assert_eq!("user".parse::<EntityKind>().unwrap(), EntityKind::Contact);
        assert_eq!("CALL".parse::<EntityKind>().unwrap(), EntityKind::Call);
        assert!("voicemail".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&EntityKind::ChatMember).unwrap();
        assert_eq!(json, "\"chat_member\"");
    }
}
