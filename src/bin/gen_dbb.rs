//! Synthetic Skype profile generator for stress testing dbbdump.
//!
//! Usage: cargo run --features gen-test --bin gen_dbb -- [messages] [root] [user]
//! Example: cargo run --features gen-test --bin gen_dbb -- 100000 fake_skype alice

use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use rand::Rng;
use rand::seq::SliceRandom;

use dbbdump::dbb::RecordBuilder;

const MESSAGE_MAX_SIZE: usize = 4096;
const CALL_MAX_SIZE: usize = 256;
const CONTACT_MAX_SIZE: usize = 1024;

const CONTACTS: &[(&str, &str)] = &[
    ("bob", "Bob"),
    ("ivan.petrov", "Иван"),
    ("murakami", "村上"),
    ("amp&er", "Amp & <Er>"),
    ("fire.user", "🔥FireUser🔥"),
    ("quote\"user", "User \"With\" Quotes"),
];

const BODIES: &[&str] = &[
    "hi",
    "how are you?",
    "<b>bold</b> & <i>brave</i>",
    "line one\nline two\nline three",
    "😀😂🤣 👨‍👩‍👧‍👦",
    "Привет, как дела?",
    "",
    "a much longer message that goes on and on to take up a good share of the slot",
];

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    let count: u32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100_000);
    let root = args.get(2).map(|s| s.as_str()).unwrap_or("fake_skype");
    let user = args.get(3).map(|s| s.as_str()).unwrap_or("alice");

    println!("Synthetic profile generator");
    println!("   Messages: {}", count);
    println!("   Root:     {}", root);
    println!("   User:     {}", user);
    println!();

    let dir = Path::new(root).join(user);
    fs::create_dir_all(&dir)?;

    let start = Instant::now();
    let mut rng = rand::thread_rng();

    let bytes = generate_messages(&mut rng, &dir, user, count)?;
    println!("   chatmsg{MESSAGE_MAX_SIZE}.dbb: {} bytes", bytes);

    let bytes = generate_calls(&mut rng, &dir, count / 100 + 1)?;
    println!("   call{CALL_MAX_SIZE}.dbb: {} bytes", bytes);

    let bytes = generate_contacts(&dir)?;
    println!("   user{CONTACT_MAX_SIZE}.dbb: {} bytes", bytes);

    println!();
    println!("Done in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn write_slots(path: &Path, slots: impl Iterator<Item = Vec<u8>>) -> Result<u64, Box<dyn Error>> {
    let mut writer = BufWriter::with_capacity(1024 * 1024, File::create(path)?);
    let mut bytes = 0;
    for slot in slots {
        writer.write_all(&slot)?;
        bytes += slot.len() as u64;
    }
    writer.flush()?;
    Ok(bytes)
}

fn generate_messages(
    rng: &mut impl Rng,
    dir: &Path,
    user: &str,
    count: u32,
) -> Result<u64, Box<dyn Error>> {
    let stride = MESSAGE_MAX_SIZE + 8;
    let mut slots = Vec::with_capacity(count as usize);
    let mut timestamp: u64 = 1_300_000_000;

    for i in 0..count {
        let (partner, dispname) = *CONTACTS.choose(rng).unwrap_or(&("bob", "Bob"));
        let from_partner = rng.gen_bool(0.5);
        let (author, from_dispname) = if from_partner {
            (partner, dispname)
        } else {
            (user, user)
        };
        timestamp += rng.gen_range(1..3600);

        let mut record = RecordBuilder::new(i + 1)
            .int(3, u64::from(i) + 1000)
            .text(480, &format!("#{user}/${partner};{:x}", rng.gen_range(0..u32::MAX)))
            .int(485, timestamp)
            .text(488, author)
            .text(492, from_dispname);

        // one in ten is a group chat message without an explicit partner
        if rng.gen_range(0..10) != 0 {
            record = record.text(3160, partner);
        }
        // one in twenty is a membership event without a body
        if rng.gen_range(0..20) == 0 {
            record = record.int(497, 4);
        } else {
            let body = BODIES.choose(rng).copied().unwrap_or("hi");
            record = record.int(497, 3).text(508, body);
        }
        slots.push(record.build_slot(stride));
    }

    write_slots(&dir.join(format!("chatmsg{MESSAGE_MAX_SIZE}.dbb")), slots.into_iter())
}

fn generate_calls(rng: &mut impl Rng, dir: &Path, count: u32) -> Result<u64, Box<dyn Error>> {
    let stride = CALL_MAX_SIZE + 8;
    let mut slots = Vec::new();
    let mut recid = 1;
    let mut timestamp: u64 = 1_300_000_000;

    for call in 0..count {
        let name = format!("call-{call}");
        let host_id = recid;
        timestamp += rng.gen_range(60..86_400);
        slots.push(
            RecordBuilder::new(host_id)
                .text(868, &name)
                .int(161, timestamp)
                .int(849, rng.gen_range(0..7200))
                .build_slot(stride),
        );
        recid += 1;

        for _ in 0..rng.gen_range(1..4) {
            let (identity, dispname) = *CONTACTS.choose(rng).unwrap_or(&("bob", "Bob"));
            slots.push(
                RecordBuilder::new(recid)
                    .text(184, &name)
                    .int(7, u64::from(host_id))
                    .text(920, identity)
                    .text(924, dispname)
                    .int(3301, timestamp + rng.gen_range(0..30))
                    .build_slot(stride),
            );
            recid += 1;
        }
    }

    write_slots(&dir.join(format!("call{CALL_MAX_SIZE}.dbb")), slots.into_iter())
}

fn generate_contacts(dir: &Path) -> Result<u64, Box<dyn Error>> {
    let stride = CONTACT_MAX_SIZE + 8;
    let slots = CONTACTS.iter().zip(1..).map(|(&(name, full), id)| {
        RecordBuilder::new(id)
            .text(16, name)
            .text(20, full)
            .blob(150, &[0x89, b'P', b'N', b'G'])
            .build_slot(stride)
    });
    write_slots(&dir.join(format!("user{CONTACT_MAX_SIZE}.dbb")), slots)
}
