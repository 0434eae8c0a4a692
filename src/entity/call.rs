//! Call records (`call*.dbb`).
//!
//! A call is stored as one host record plus one record per participant.
//! Host records carry `name`; member records carry `call_name` and point at
//! the host through `call_recid`. Both roles get the same `gname`, so
//! callers can group them.

use super::{Attributes, Entity, ctime_or_unknown};
use crate::dbb::{FieldMap, FieldValue};
use crate::schema::EntityKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    attrs: Attributes,
}

impl Call {
    /// Returns `true` for the host record of a call.
    pub fn is_host(&self) -> bool {
        self.attrs
            .get("is_host")
            .and_then(FieldValue::as_flag)
            .unwrap_or(false)
    }

    /// Group name shared by the host and its member records.
    pub fn gname(&self) -> Option<&str> {
        self.attrs.text("gname")
    }

    pub fn ctime(&self) -> &str {
        self.attrs.text("ctime").unwrap_or(super::UNKNOWN_TIME)
    }

    /// Record id of the host record (members only).
    pub fn call_recid(&self) -> Option<u64> {
        self.attrs.int("call_recid")
    }

    pub fn topic(&self) -> Option<&str> {
        self.attrs.text("topic")
    }

    pub fn identity(&self) -> Option<&str> {
        self.attrs.text("identity")
    }

    pub fn dispname(&self) -> Option<&str> {
        self.attrs.text("dispname")
    }

    pub fn duration(&self) -> Option<u64> {
        self.attrs.int("duration")
    }
}

impl Entity for Call {
    const KIND: EntityKind = EntityKind::Call;

    fn from_fields(fields: FieldMap) -> Self {
        let mut attrs = Attributes::from_fields(Self::KIND, fields);
        let is_host = attrs.contains("name");
        let (gname, started) = if is_host {
            (attrs.get("name").cloned(), attrs.get("begin_timestamp"))
        } else {
            (
                attrs.get("call_name").cloned(),
                attrs.get("member_start_timestamp"),
            )
        };
        let ctime = ctime_or_unknown(started);

        attrs.insert("is_host", FieldValue::Flag(is_host));
        attrs.insert("ctime", FieldValue::Text(ctime));
        if let Some(gname) = gname {
            attrs.insert("gname", gname);
        }
        Self { attrs }
    }

    fn attributes(&self) -> &Attributes {
        &self.attrs
    }
}
