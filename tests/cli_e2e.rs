//! End-to-end CLI tests for dbbdump.
//!
//! These tests run the actual binary against a synthetic Skype data
//! directory and check its output files and messages.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

use common::{MSG_MAX_SIZE, said, sample_profile, write_dbb};

fn dbbdump_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_dbbdump"));
    Command::from_std(cmd)
}

/// A Skype root with one profile, and an empty output directory.
fn setup() -> (TempDir, TempDir) {
    let root = tempdir().expect("Failed to create temp dir");
    sample_profile(root.path(), "alice");
    let out = tempdir().expect("Failed to create temp dir");
    (root, out)
}

// ============================================================================
// Export Tests
// ============================================================================

mod export {
    use super::*;

    #[test]
    fn test_json_compact() {
        let (root, out) = setup();

        dbbdump_cmd()
            .args(["--json", "compact", "--skype-dir"])
            .arg(root.path())
            .arg("-o")
            .arg(out.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Dumping chat history to JSON (compact)..."))
            .stdout(predicate::str::contains("alice.js"))
            .stdout(predicate::str::contains("Done"));

        let content = fs::read_to_string(out.path().join("alice.js")).unwrap();
        assert_eq!(content.lines().count(), 4);
        assert!(content.lines().all(|l| l.ends_with("},")));
    }

    #[test]
    fn test_json_full() {
        let (root, out) = setup();

        dbbdump_cmd()
            .args(["-j", "full", "--skype-dir"])
            .arg(root.path())
            .arg("-o")
            .arg(out.path())
            .assert()
            .success();

        let content = fs::read_to_string(out.path().join("alice.js")).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert!(content.contains(r#""recid":3"#));
    }

    #[test]
    fn test_json_calls() {
        let (root, out) = setup();

        dbbdump_cmd()
            .args(["-j", "calls", "--skype-dir"])
            .arg(root.path())
            .arg("-o")
            .arg(out.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Dumping call history to JSON (full)..."));

        let content = fs::read_to_string(out.path().join("alice.calls.js")).unwrap();
        assert!(content.contains(r#""is_host":true"#));
    }

    #[test]
    fn test_html() {
        let (root, out) = setup();

        dbbdump_cmd()
            .args(["--html", "--mode", "overwrite", "--limit", "64K", "--skype-dir"])
            .arg(root.path())
            .arg("-o")
            .arg(out.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Dumping chat history to HTML..."));

        let bob = fs::read_to_string(out.path().join("alice-bob-0.html")).unwrap();
        assert!(bob.ends_with("</body></html>"));
        assert!(out.path().join("alice-carol-0.html").exists());
    }

    #[test]
    fn test_bad_file_reported_but_succeeds() {
        let (root, out) = setup();
        let bad = write_dbb(
            &root.path().join("alice"),
            "chatmsg",
            MSG_MAX_SIZE * 2,
            &[said(1, 10, "bob", "bob", "x")],
        );
        let mut bytes = fs::read(&bad).unwrap();
        bytes[0] = b'X';
        fs::write(&bad, bytes).unwrap();

        dbbdump_cmd()
            .args(["-j", "compact", "--skype-dir"])
            .arg(root.path())
            .arg("-o")
            .arg(out.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("could not be read completely"));
    }
}

// ============================================================================
// Dump Tests
// ============================================================================

mod dump {
    use super::*;

    #[test]
    fn test_dump_messages() {
        let (root, _out) = setup();
        let file = root.path().join("alice").join(format!("chatmsg{MSG_MAX_SIZE}.dbb"));

        dbbdump_cmd()
            .arg("--dump")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""body_xml":"hi there""#))
            .stdout(predicate::str::contains(r#""dialog_partner":"chat_9f3""#));
    }

    #[test]
    fn test_dump_with_kind_and_max_size() {
        let dir = tempdir().unwrap();
        let record = dbbdump::dbb::RecordBuilder::new(3).text(16, "bob").text(20, "Bob B");
        let path = dir.path().join("contacts.bin");
        fs::write(&path, record.build_slot(108)).unwrap();

        dbbdump_cmd()
            .arg("--dump")
            .arg(&path)
            .args(["--kind", "contact", "--max-size", "100"])
            .assert()
            .success()
            .stdout(predicate::str::diff("{\"fullname\":\"Bob B\",\"recid\":3,\"skypename\":\"bob\"},\n"));
    }

    #[test]
    fn test_dump_without_size_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contacts.bin");
        fs::write(&path, b"l33l").unwrap();

        dbbdump_cmd()
            .arg("--dump")
            .arg(&path)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Cannot determine record stride"));
    }

    #[test]
    fn test_dump_missing_file() {
        let dir = tempdir().unwrap();

        dbbdump_cmd()
            .arg("--dump")
            .arg(dir.path().join("chatmsg256.dbb"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot open"));
    }
}

// ============================================================================
// Argument Errors
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn test_no_action() {
        dbbdump_cmd().assert().failure();
    }

    #[test]
    fn test_conflicting_actions() {
        dbbdump_cmd().args(["-t", "-j", "full"]).assert().failure();
    }

    #[test]
    fn test_dump_options_without_dump() {
        let (root, out) = setup();
        dbbdump_cmd()
            .args(["-t", "--kind", "call", "--max-size", "5", "--skype-dir"])
            .arg(root.path())
            .arg("-o")
            .arg(out.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("Dumping").not());
        assert!(!out.path().join("alice-bob-0.html").exists());
    }

    #[test]
    fn test_bad_json_mode() {
        dbbdump_cmd()
            .args(["-j", "everything"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("everything"));
    }

    #[test]
    fn test_limit_too_small() {
        dbbdump_cmd()
            .args(["-t", "-l", "100"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("at least 1024"));
    }

    #[test]
    fn test_missing_skype_dir() {
        let dir = tempdir().unwrap();
        dbbdump_cmd()
            .args(["-j", "compact", "--skype-dir"])
            .arg(dir.path().join("nope"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot open"));
    }
}
