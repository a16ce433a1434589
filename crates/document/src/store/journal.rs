//! Append-only journal for the embedded document store.
//!
//! Every mutation is appended as one BSON document before it is applied
//! in memory and synced to disk. Opening a store replays the journal from
//! the start; a torn tail left by a crash is cut off and reported. Clearing
//! a collection rewrites the journal down to the live documents.

use bson::{doc, Document};
use flowdex_core::{Error, Result};
use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the journal inside the data directory.
pub const JOURNAL_FILE: &str = "flowdex.journal";

/// Lock file guarding the data directory.
pub const LOCK_FILE: &str = "flowdex.lock";

const COMPACT_FILE: &str = "flowdex.journal.compact";

/// A single journal entry representing a change.
#[derive(Clone, Debug, PartialEq)]
pub enum JournalEntry {
    /// A document was inserted or replaced.
    Upsert {
        collection: String,
        key: String,
        document: Document,
    },
    /// A document was deleted.
    Delete { collection: String, key: String },
    /// A collection was emptied.
    Clear { collection: String },
}

impl JournalEntry {
    /// Returns the collection name for this entry.
    pub fn collection(&self) -> &str {
        match self {
            JournalEntry::Upsert { collection, .. } => collection,
            JournalEntry::Delete { collection, .. } => collection,
            JournalEntry::Clear { collection } => collection,
        }
    }

    fn to_document(&self) -> Document {
        match self {
            JournalEntry::Upsert {
                collection,
                key,
                document,
            } => doc! { "op": "upsert", "c": collection, "k": key, "d": document.clone() },
            JournalEntry::Delete { collection, key } => doc! { "op": "delete", "c": collection, "k": key },
            JournalEntry::Clear { collection } => doc! { "op": "clear", "c": collection },
        }
    }

    fn from_document(entry: &Document) -> Result<Self> {
        let field = |name: &str| {
            entry
                .get_str(name)
                .map(str::to_string)
                .map_err(|e| Error::storage(format!("journal entry without `{}`", name), e))
        };
        let collection = field("c")?;
        match entry.get_str("op").unwrap_or_default() {
            "upsert" => Ok(JournalEntry::Upsert {
                collection,
                key: field("k")?,
                document: entry
                    .get_document("d")
                    .map_err(|e| Error::storage("journal upsert without document", e))?
                    .clone(),
            }),
            "delete" => Ok(JournalEntry::Delete {
                collection,
                key: field("k")?,
            }),
            "clear" => Ok(JournalEntry::Clear { collection }),
            other => Err(Error::storage_unavailable(format!(
                "unknown journal operation `{}`",
                other
            ))),
        }
    }
}

/// An open journal file.
///
/// A lock file in the data directory is held for as long as the journal is
/// open, so a second store cannot interleave writes into the same journal.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: File,
    /// Length of the fully written prefix.
    committed: u64,
    /// Set when a failed append could not be rolled back.
    poisoned: bool,
    _lock: File,
}

impl Journal {
    /// Opens (or creates) the journal in `dir` and reads back its entries.
    pub fn open(dir: &Path) -> Result<(Self, Vec<JournalEntry>)> {
        fs::create_dir_all(dir)
            .map_err(|e| Error::storage(format!("cannot create {}", dir.display()), e))?;
        let lock = lock_dir(dir)?;
        let path = dir.join(JOURNAL_FILE);
        let mut file = open_append(&path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| Error::storage(format!("cannot read {}", path.display()), e))?;

        let (entries, valid_len) = decode_entries(&bytes);
        if valid_len < bytes.len() as u64 {
            warn!(
                path = %path.display(),
                dropped_bytes = bytes.len() as u64 - valid_len,
                "journal has a torn tail, truncating"
            );
            file.set_len(valid_len)
                .map_err(|e| Error::storage(format!("cannot truncate {}", path.display()), e))?;
        }
        debug!(path = %path.display(), entries = entries.len(), "opened journal");
        let journal = Self {
            path,
            file,
            committed: valid_len,
            poisoned: false,
            _lock: lock,
        };
        Ok((journal, entries))
    }

    /// Returns the journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry and syncs it to disk.
    ///
    /// On failure the partly written record is cut off again, so later
    /// appends follow the last complete entry. If that cut fails too the
    /// journal refuses every further append.
    pub fn append(&mut self, entry: &JournalEntry) -> Result<()> {
        if self.poisoned {
            return Err(Error::storage_unavailable(format!(
                "journal {} is unusable after a failed append",
                self.path.display()
            )));
        }
        let buf = encode_entry(entry)?;
        let written = self.file.write_all(&buf).and_then(|_| self.file.sync_data());
        match written {
            Ok(()) => {
                self.committed += buf.len() as u64;
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "journal append failed");
                self.discard_uncommitted();
                Err(Error::storage(format!("cannot append to {}", self.path.display()), e))
            }
        }
    }

    /// Replaces the journal with one upsert per live document.
    ///
    /// The new journal is written beside the old one and renamed over it.
    pub fn compact(&mut self, live: impl IntoIterator<Item = JournalEntry>) -> Result<()> {
        let mut buf = Vec::new();
        let mut entries = 0usize;
        for entry in live {
            buf.extend_from_slice(&encode_entry(&entry)?);
            entries += 1;
        }
        let staging = self.path.with_file_name(COMPACT_FILE);
        let write_staging = || -> std::io::Result<()> {
            let mut file = File::create(&staging)?;
            file.write_all(&buf)?;
            file.sync_all()
        };
        write_staging()
            .and_then(|_| fs::rename(&staging, &self.path))
            .map_err(|e| Error::storage(format!("cannot compact {}", self.path.display()), e))?;
        // The old handle now points at the replaced file.
        match open_append(&self.path) {
            Ok(file) => self.file = file,
            Err(e) => {
                self.poisoned = true;
                return Err(e);
            }
        }
        self.committed = buf.len() as u64;
        self.poisoned = false;
        debug!(path = %self.path.display(), entries, bytes = self.committed, "compacted journal");
        Ok(())
    }

    /// Cuts the file back to the last complete entry.
    fn discard_uncommitted(&mut self) {
        if let Err(e) = self.file.set_len(self.committed) {
            warn!(path = %self.path.display(), error = %e, "cannot roll back journal append");
            self.poisoned = true;
        }
    }
}

fn encode_entry(entry: &JournalEntry) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    entry
        .to_document()
        .to_writer(&mut buf)
        .map_err(|e| Error::codec("cannot encode journal entry", e))?;
    Ok(buf)
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| Error::storage(format!("cannot open {}", path.display()), e))
}

/// Takes the exclusive lock on `dir`; it is released when the file closes.
fn lock_dir(dir: &Path) -> Result<File> {
    let path = dir.join(LOCK_FILE);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| Error::storage(format!("cannot open {}", path.display()), e))?;
    match file.try_lock() {
        Ok(()) => Ok(file),
        Err(TryLockError::WouldBlock) => Err(Error::storage_unavailable(format!(
            "{} is in use by another document store",
            dir.display()
        ))),
        Err(TryLockError::Error(e)) => {
            Err(Error::storage(format!("cannot lock {}", path.display()), e))
        }
    }
}

/// Decodes entries up to the first unreadable one.
///
/// Returns the entries and the byte length of the readable prefix.
fn decode_entries(bytes: &[u8]) -> (Vec<JournalEntry>, u64) {
    let mut cursor = Cursor::new(bytes);
    let mut entries = Vec::new();
    let mut valid_len = 0u64;
    while (cursor.position() as usize) < bytes.len() {
        let entry = Document::from_reader(&mut cursor)
            .map_err(|e| Error::codec("unreadable journal entry", e))
            .and_then(|d| JournalEntry::from_document(&d));
        match entry {
            Ok(entry) => {
                entries.push(entry);
                valid_len = cursor.position();
            }
            Err(e) => {
                warn!(offset = valid_len, error = %e, "stopping journal replay");
                break;
            }
        }
    }
    (entries, valid_len)
}
