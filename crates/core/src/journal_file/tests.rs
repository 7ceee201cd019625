use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tempfile::tempdir;

use super::*;
use crate::game::Action;
use crate::mapgen::Strategy;
use crate::types::Direction;

fn origin() -> SessionOrigin {
    SessionOrigin::Generated { strategy: Strategy::Default }
}

fn create(path: &Path, seed: u64) -> JournalWriter {
    JournalWriter::create(path, seed, &Config::default(), &origin()).unwrap()
}

fn step(direction: Direction) -> JournalEntry {
    JournalEntry::Action { action: Action::Move(direction) }
}

#[test]
fn header_and_records_load_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roundtrip.jsonl");

    let mut writer = create(&path, 42);
    writer.append(&step(Direction::Up)).unwrap();
    writer.append(&JournalEntry::Clock { elapsed_ms: 1500 }).unwrap();
    writer.append(&JournalEntry::Revive).unwrap();

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.format_version, JOURNAL_FORMAT_VERSION);
    assert_eq!(loaded.journal.seed, 42);
    assert_eq!(loaded.journal.config, Config::default());
    assert_eq!(loaded.journal.origin, origin());
    assert_eq!(
        loaded.journal.entries,
        vec![step(Direction::Up), JournalEntry::Clock { elapsed_ms: 1500 }, JournalEntry::Revive]
    );

    assert_eq!(loaded.next_seq, 3);
    assert_ne!(loaded.last_sha256_hex, ZERO_HASH);
}

#[test]
fn hash_chain_detects_tampered_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tampered.jsonl");

    let mut writer = create(&path, 1);
    writer.append(&step(Direction::Up)).unwrap();
    writer.append(&step(Direction::Left)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    assert!(lines.len() >= 3, "expected header + 2 records");

    lines[2] = lines[2].replace("\"Left\"", "\"Right\"");
    fs::write(&path, lines.join("\n") + "\n").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::HashChainBroken { line: 3 })),
        "expected hash chain broken at line 3, got: {result:?}"
    );
}

#[test]
fn hash_chain_covers_the_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reseeded.jsonl");

    let mut writer = create(&path, 1);
    writer.append(&step(Direction::Down)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.replacen("\"seed\":1,", "\"seed\":2,", 1)).unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::HashChainBroken { line: 2 })),
        "expected hash chain broken at line 2, got: {result:?}"
    );
}

#[test]
fn hash_chain_detects_deleted_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deleted.jsonl");

    let mut writer = create(&path, 1);
    for elapsed_ms in [10, 20, 30] {
        writer.append(&JournalEntry::Clock { elapsed_ms }).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    let tampered = format!("{}\n{}\n{}\n", lines[0], lines[1], lines[3]);
    fs::write(&path, tampered).unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(
            result,
            Err(JournalLoadError::HashChainBroken { .. })
                | Err(JournalLoadError::InvalidRecord { .. })
        ),
        "expected chain corruption error, got: {result:?}"
    );
}

#[test]
fn a_line_cut_mid_write_is_incomplete() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("truncated.jsonl");

    let mut writer = create(&path, 1);
    writer.append(&step(Direction::Up)).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"seq\":1,\"ent").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::IncompleteLine { line: 3 })),
        "expected incomplete line at line 3, got: {result:?}"
    );
}

#[test]
fn empty_and_garbage_files_are_rejected() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.jsonl");
    fs::write(&empty, "").unwrap();
    assert!(matches!(load_journal_from_file(&empty), Err(JournalLoadError::EmptyFile)));

    let garbage = dir.path().join("bad_header.jsonl");
    fs::write(&garbage, "not valid json\n").unwrap();
    let result = load_journal_from_file(&garbage);
    assert!(
        matches!(result, Err(JournalLoadError::InvalidHeader { line: 1, .. })),
        "expected invalid header error, got: {result:?}"
    );
}

#[test]
fn header_only_file_loads_empty_journal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("header_only.jsonl");

    let _writer = create(&path, 555);

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.seed, 555);
    assert!(loaded.journal.is_empty());
    assert_eq!(loaded.next_seq, 0);
}

#[test]
fn resumed_writer_extends_the_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resume.jsonl");

    let mut writer = create(&path, 1);
    writer.append(&step(Direction::Right)).unwrap();
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.len(), 1);

    let mut writer = JournalWriter::resume(&path, &loaded).unwrap();
    writer.append(&JournalEntry::DrainInteractions).unwrap();
    assert_eq!(writer.next_seq(), 2);
    drop(writer);

    let reloaded = load_journal_from_file(&path).unwrap();
    assert_eq!(
        reloaded.journal.entries,
        vec![step(Direction::Right), JournalEntry::DrainInteractions]
    );
    assert_eq!(reloaded.next_seq, 2);
}

#[test]
fn save_journal_matches_streamed_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.jsonl");

    let mut journal = ActionJournal::new(7, Config::default(), origin());
    journal.push(step(Direction::Up));
    journal.push(JournalEntry::AdvanceFloor);
    save_journal(&path, &journal).unwrap();

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal, journal);
}
