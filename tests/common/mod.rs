//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use dbbdump::dbb::RecordBuilder;

pub const MSG_MAX_SIZE: usize = 256;
pub const MSG_STRIDE: usize = MSG_MAX_SIZE + 8;
pub const CALL_MAX_SIZE: usize = 256;

/// Writes `records` as consecutive slots of `8 + max_size` bytes.
pub fn write_dbb(dir: &Path, prefix: &str, max_size: usize, records: &[RecordBuilder]) -> PathBuf {
    let path = dir.join(format!("{prefix}{max_size}.dbb"));
    let mut bytes = Vec::new();
    for record in records {
        bytes.extend(record.build_slot(max_size + 8));
    }
    fs::write(&path, bytes).unwrap();
    path
}

/// A said one-to-one message.
pub fn said(id: u32, ts: u64, author: &str, partner: &str, body: &str) -> RecordBuilder {
    RecordBuilder::new(id)
        .int(3, u64::from(id) + 1000)
        .text(480, &format!("#me/${partner};abc"))
        .int(485, ts)
        .text(488, author)
        .text(492, &author.to_uppercase())
        .int(497, 3)
        .text(508, body)
        .text(3160, partner)
}

/// A membership change event without a body.
pub fn left_event(id: u32, ts: u64, partner: &str) -> RecordBuilder {
    RecordBuilder::new(id)
        .text(480, &format!("#me/${partner};abc"))
        .int(485, ts)
        .text(488, partner)
        .int(497, 4)
        .text(3160, partner)
}

/// A said message in a group chat, with no stored dialog partner.
pub fn group_said(id: u32, ts: u64, author: &str, chat_id: &str, body: &str) -> RecordBuilder {
    RecordBuilder::new(id)
        .text(480, &format!("#me/$someone;{chat_id}"))
        .int(485, ts)
        .text(488, author)
        .text(492, author)
        .text(508, body)
}

pub fn call_host(id: u32, name: &str, begin: u64) -> RecordBuilder {
    RecordBuilder::new(id).text(868, name).int(161, begin).int(849, 60)
}

pub fn call_member(id: u32, host: u32, name: &str, identity: &str) -> RecordBuilder {
    RecordBuilder::new(id)
        .text(184, name)
        .int(7, u64::from(host))
        .text(920, identity)
        .int(3301, 1_300_000_010)
}

/// Creates `<root>/<user>/` with a message file and a call file.
pub fn sample_profile(root: &Path, user: &str) -> PathBuf {
    let dir = root.join(user);
    fs::create_dir_all(&dir).unwrap();
    write_dbb(
        &dir,
        "chatmsg",
        MSG_MAX_SIZE,
        &[
            said(1, 1_300_000_100, "bob", "bob", "hi there"),
            said(2, 1_300_000_050, user, "bob", "earlier <b>hello</b>"),
            left_event(3, 1_300_000_200, "bob"),
            said(4, 1_300_000_300, "carol", "carol", "hey"),
            group_said(5, 1_300_000_400, "dave", "9f3", "group hello"),
        ],
    );
    write_dbb(
        &dir,
        "call",
        CALL_MAX_SIZE,
        &[
            call_host(1, "call-a", 1_300_000_000),
            call_member(2, 1, "call-a", "bob"),
        ],
    );
    dir
}
