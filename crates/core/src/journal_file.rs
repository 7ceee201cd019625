//! Session journals on disk.
//!
//! A journal file is JSONL. The first line is a header naming the format
//! version, seed, config and session origin. Every following line wraps one
//! [`JournalEntry`] together with its sequence number and two SHA-256 digests:
//! the digest of the previous line and its own. The chain is rooted at the
//! digest of the header, so editing the seed or config breaks the first record.
//!
//! Records are flushed one at a time. Loading stops at the first line that is
//! malformed, out of sequence or off the chain.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::mem;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::journal::{ActionJournal, JOURNAL_FORMAT_VERSION, JournalEntry, SessionOrigin};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct FileHeader {
    format_version: u16,
    seed: u64,
    config: Config,
    origin: SessionOrigin,
}

/// The part of a record that is digested.
#[derive(Serialize)]
struct Sealed<'a> {
    seq: u64,
    entry: &'a JournalEntry,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    entry: JournalEntry,
    prev_sha256_hex: String,
    sha256_hex: String,
}

const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fn sha256_hex(payload: &str, prev: &str) -> String {
    let digest = Sha256::new()
        .chain_update(payload.as_bytes())
        .chain_update(prev.as_bytes())
        .finalize();
    format!("{digest:064x}")
}

/// Tip of a hash chain plus the sequence number the next record must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HashChain {
    tip: String,
    next_seq: u64,
}

impl HashChain {
    fn rooted_at(header_json: &str) -> Self {
        Self { tip: sha256_hex(header_json, ZERO_HASH), next_seq: 0 }
    }

    fn digest(&self, entry: &JournalEntry) -> serde_json::Result<String> {
        let sealed = serde_json::to_string(&Sealed { seq: self.next_seq, entry })?;
        Ok(sha256_hex(&sealed, &self.tip))
    }

    /// Builds the record for `entry` and moves the tip past it.
    fn seal(&mut self, entry: &JournalEntry) -> serde_json::Result<FileRecord> {
        let sha256_hex = self.digest(entry)?;
        let record = FileRecord {
            seq: self.next_seq,
            entry: entry.clone(),
            prev_sha256_hex: mem::replace(&mut self.tip, sha256_hex.clone()),
            sha256_hex,
        };
        self.next_seq += 1;
        Ok(record)
    }
}

/// Appends journal entries to a JSONL file, one flushed line per entry.
pub struct JournalWriter {
    out: BufWriter<File>,
    chain: HashChain,
}

impl JournalWriter {
    /// Creates (or truncates) `path` and writes the header.
    pub fn create(
        path: &Path,
        seed: u64,
        config: &Config,
        origin: &SessionOrigin,
    ) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let header = FileHeader {
            format_version: JOURNAL_FORMAT_VERSION,
            seed,
            config: config.clone(),
            origin: origin.clone(),
        };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;

        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{header_json}")?;
        out.flush()?;
        Ok(Self { out, chain: HashChain::rooted_at(&header_json) })
    }

    /// Reopens a journal that was just loaded and keeps extending its chain.
    pub fn resume(path: &Path, loaded: &LoadedJournal) -> io::Result<Self> {
        let out = BufWriter::new(OpenOptions::new().append(true).open(path)?);
        let chain =
            HashChain { tip: loaded.last_sha256_hex.clone(), next_seq: loaded.next_seq };
        Ok(Self { out, chain })
    }

    pub fn append(&mut self, entry: &JournalEntry) -> io::Result<()> {
        let mut chain = self.chain.clone();
        let record = chain.seal(entry).map_err(io::Error::other)?;
        let line = serde_json::to_string(&record).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        self.chain = chain;
        Ok(())
    }

    pub fn next_seq(&self) -> u64 {
        self.chain.next_seq
    }
}

/// Writes a whole in-memory journal to `path`.
pub fn save_journal(path: &Path, journal: &ActionJournal) -> io::Result<()> {
    let mut writer = JournalWriter::create(path, journal.seed, &journal.config, &journal.origin)?;
    for entry in &journal.entries {
        writer.append(entry)?;
    }
    tracing::debug!(path = %path.display(), entries = journal.len(), "journal saved");
    Ok(())
}

/// A verified journal plus the chain state needed to append to it.
#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: ActionJournal,
    /// Digest of the last record, or of the header when there are none.
    pub last_sha256_hex: String,
    pub next_seq: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum JournalLoadError {
    #[error("journal I/O error")]
    Io(#[from] io::Error),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    /// The file ended without a trailing newline.
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },
    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

fn parse_header(line: &str) -> Result<(FileHeader, HashChain), JournalLoadError> {
    let invalid = |err: serde_json::Error| JournalLoadError::InvalidHeader {
        line: 1,
        message: err.to_string(),
    };
    let header: FileHeader = serde_json::from_str(line).map_err(invalid)?;
    // Re-encode so the root does not depend on whitespace in the file.
    let canonical = serde_json::to_string(&header).map_err(invalid)?;
    Ok((header, HashChain::rooted_at(&canonical)))
}

/// Checks one record line against the chain and advances it.
fn verify_record(
    line: &str,
    line_number: usize,
    chain: &mut HashChain,
) -> Result<JournalEntry, JournalLoadError> {
    let invalid = |message: String| JournalLoadError::InvalidRecord { line: line_number, message };
    if line.is_empty() {
        return Err(invalid("empty line".to_string()));
    }
    let record: FileRecord = serde_json::from_str(line).map_err(|err| invalid(err.to_string()))?;
    if record.seq != chain.next_seq {
        return Err(invalid(format!("expected seq {}, found {}", chain.next_seq, record.seq)));
    }
    if record.prev_sha256_hex != chain.tip {
        return Err(JournalLoadError::HashChainBroken { line: line_number });
    }
    let expected = chain.digest(&record.entry).map_err(|err| invalid(err.to_string()))?;
    if record.sha256_hex != expected {
        return Err(JournalLoadError::HashChainBroken { line: line_number });
    }
    chain.tip = expected;
    chain.next_seq += 1;
    Ok(record.entry)
}

/// Loads `path` and verifies every line of it.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();
    let Some(header_line) = lines.next() else {
        return Err(JournalLoadError::EmptyFile);
    };
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: content.lines().count() });
    }

    let (header, mut chain) = parse_header(header_line)?;
    let mut journal = ActionJournal::new(header.seed, header.config, header.origin);
    journal.format_version = header.format_version;

    for (index, line) in lines.enumerate() {
        let entry = verify_record(line, index + 2, &mut chain)?;
        journal.push(entry);
    }

    Ok(LoadedJournal { journal, last_sha256_hex: chain.tip, next_seq: chain.next_seq })
}

#[cfg(test)]
mod tests;
