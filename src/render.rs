//! Export renderers: one materialized entity in, one line of output out.
//!
//! - [`to_json_full`] - every attribute, keys sorted
//! - [`to_json_compact`] - the fields the client shows for a said message
//! - [`to_html_fragment`] - a `<div>` for the HTML chat log
//!
//! The message renderers return `None` for messages without a body
//! (membership changes, topic changes and other events).

use serde::Serialize;

use crate::entity::{ChatMessage, Entity};
use crate::error::Result;

/// Every HTML fragment starts with this marker.
pub const FRAGMENT_MARKER: &str = "<div class=msg>";

/// Serializes all attributes of `entity` as one JSON object.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_full<E: Entity>(entity: &E) -> Result<String> {
    Ok(serde_json::to_string(entity.attributes())?)
}

#[derive(Serialize)]
struct CompactMessage<'a> {
    dialog_partner: &'a str,
    timestamp: Option<u64>,
    ctime: &'a str,
    from_dispname: Option<&'a str>,
    body_xml: &'a str,
}

/// Serializes the displayed fields of a said message in fixed order:
/// `dialog_partner`, `timestamp`, `ctime`, `from_dispname`, `body_xml`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_compact(msg: &ChatMessage) -> Result<Option<String>> {
    let Some(body_xml) = msg.body_xml() else {
        return Ok(None);
    };
    let compact = CompactMessage {
        dialog_partner: msg.dialog_partner(),
        timestamp: msg.timestamp(),
        ctime: msg.ctime(),
        from_dispname: msg.from_dispname(),
        body_xml,
    };
    Ok(Some(serde_json::to_string(&compact)?))
}

/// Escapes `&`, `<` and `>`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a said message as one HTML fragment.
///
/// ```text
/// <div class=msg><!-- bob 1300000000 42 --><span class=time>...</span><span class=from>Bob</span>hi</div>
/// ```
///
/// The sender span has class `from` when the dialog partner wrote the
/// message and `me` otherwise. Body newlines become `<br>` line breaks.
pub fn to_html_fragment(msg: &ChatMessage) -> Option<String> {
    let body = msg.body_xml()?;
    let class = if msg.is_from_partner() { "from" } else { "me" };
    Some(format!(
        "{FRAGMENT_MARKER}<!-- {} {} {} --><span class=time>{}</span><span class={class}>{}</span>{}</div>",
        escape_html(msg.dialog_partner()),
        msg.timestamp().unwrap_or(0),
        msg.display_id(),
        msg.ctime(),
        escape_html(msg.from_dispname().unwrap_or_default()),
        escape_html(body).replace('\n', "<br>\n"),
    ))
}

/// A rendered fragment with its chronological sort key.
///
/// Orders by timestamp, then message id, then rendered text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fragment {
    pub timestamp: u64,
    pub id: u64,
    pub html: String,
}

impl Fragment {
    /// Renders `msg`, or returns `None` if it has no body.
    pub fn from_message(msg: &ChatMessage) -> Option<Self> {
        to_html_fragment(msg).map(|html| Self {
            timestamp: msg.timestamp().unwrap_or(0),
            id: msg.display_id(),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbb::FieldValue;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn said(author: &str, body: &str) -> ChatMessage {
        ChatMessage::from_fields(
            [
                (-1, FieldValue::Int(5)),
                (3, FieldValue::Int(42)),
                (485, FieldValue::Int(1_300_000_000)),
                (488, text(author)),
                (492, text("Display")),
                (508, text(body)),
                (3160, text("bob")),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn event() -> ChatMessage {
        ChatMessage::from_fields(
            [(-1, FieldValue::Int(6)), (497, FieldValue::Int(4))]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b <c> d"), "a &amp; b &lt;c&gt; d");
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_json_full_sorted_keys() {
        let json = to_json_full(&said("bob", "hi")).unwrap();
        let keys: Vec<String> = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&json)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(json.starts_with(r#"{"author":"bob","body_xml":"hi","ctime":"#));
    }

    #[test]
    fn test_json_compact_field_order() {
        let msg = said("bob", "say \"hi\"");
        let json = to_json_compact(&msg).unwrap().unwrap();
        let expected = format!(
            r#"{{"dialog_partner":"bob","timestamp":1300000000,"ctime":"{}","from_dispname":"Display","body_xml":"say \"hi\""}}"#,
            msg.ctime()
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_json_compact_missing_fields_are_null() {
        let msg = ChatMessage::from_fields([(508, text("x"))].into_iter().collect());
        let json = to_json_compact(&msg).unwrap().unwrap();
        assert!(json.contains(r#""timestamp":null"#));
        assert!(json.contains(r#""from_dispname":null"#));
        assert!(json.contains(r#""dialog_partner":"None""#));
    }

    #[test]
    fn test_events_render_empty() {
        assert_eq!(to_json_compact(&event()).unwrap(), None);
        assert_eq!(to_html_fragment(&event()), None);
        assert_eq!(Fragment::from_message(&event()), None);
        assert!(to_json_full(&event()).unwrap().contains(r#""chatmsg_type":4"#));
    }

    #[test]
    fn test_html_fragment_from_partner() {
        let msg = said("bob", "hi");
        let html = to_html_fragment(&msg).unwrap();
        assert_eq!(
            html,
            format!(
                "<div class=msg><!-- bob 1300000000 42 --><span class=time>{}</span><span class=from>Display</span>hi</div>",
                msg.ctime()
            )
        );
    }

    #[test]
    fn test_html_fragment_from_me() {
        let html = to_html_fragment(&said("alice", "hi")).unwrap();
        assert!(html.contains("<span class=me>Display</span>"));
        assert!(html.starts_with(FRAGMENT_MARKER));
    }

    #[test]
    fn test_html_fragment_escapes_body() {
        let html = to_html_fragment(&said("bob", "<b>a & b</b>\nnext")).unwrap();
        assert!(html.ends_with("&lt;b&gt;a &amp; b&lt;/b&gt;<br>\nnext</div>"));
    }

    #[test]
    fn test_fragment_orders_chronologically() {
        let at = |ts: u64, id: u64| {
            let msg = ChatMessage::from_fields(
                [
                    (3, FieldValue::Int(id)),
                    (485, FieldValue::Int(ts)),
                    (508, text("x")),
                ]
                .into_iter()
                .collect(),
            );
            Fragment::from_message(&msg).unwrap()
        };
        // 999999999 sorts after 1300000000 as text
        assert!(at(999_999_999, 9) < at(1_300_000_000, 1));
        assert!(at(1_300_000_000, 1) < at(1_300_000_000, 2));
    }
}
