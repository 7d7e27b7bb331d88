//! On-disk snapshots of a synced collection.
//!
//! A snapshot holds one owner's cards and decks as gzip-compressed JSON so
//! the collection can be restored without reaching the remote backend.
//! Writes go through a temp file in the same directory and are renamed into
//! place, so an interrupted write never leaves a partial snapshot behind.

use std::fmt::Write as _;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::{CollectionError, Result};
use crate::models::{Card, Deck};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub owner: String,
    /// Seconds since the Unix epoch.
    pub taken_at: u64,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub decks: Vec<Deck>,
}

impl Snapshot {
    pub fn new(owner: impl Into<String>, cards: Vec<Card>, decks: Vec<Deck>) -> Self {
        let taken_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            owner: owner.into(),
            taken_at,
            cards,
            decks,
        }
    }
}

/// Stores one snapshot file per owner under a directory.
pub struct SnapshotCache {
    /// Directory where snapshot files are stored.
    pub dir: PathBuf,
}

impl SnapshotCache {
    /// Create the cache, creating `dir` if it does not exist.
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File a snapshot for `owner` lives in.
    ///
    /// ASCII letters, digits and `-` are kept; every other byte (`_`
    /// included) becomes `_xx` in lowercase hex, so distinct owners never
    /// share a file.
    pub fn path_for(&self, owner: &str) -> PathBuf {
        let mut safe = String::with_capacity(owner.len());
        for b in owner.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' {
                safe.push(char::from(b));
            } else {
                let _ = write!(safe, "_{:02x}", b);
            }
        }
        self.dir.join(format!("{}.json.gz", safe))
    }

    pub fn store(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let dest = self.path_for(&snapshot.owner);
        let tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        {
            let mut encoder = GzEncoder::new(BufWriter::new(tmp.as_file()), Compression::default());
            serde_json::to_writer(&mut encoder, snapshot)?;
            encoder.finish()?.flush()?;
        }
        tmp.persist(&dest).map_err(|e| CollectionError::Io(e.error))?;
        tracing::debug!(
            owner = %snapshot.owner,
            cards = snapshot.cards.len(),
            decks = snapshot.decks.len(),
            path = %dest.display(),
            "stored snapshot"
        );
        Ok(dest)
    }

    /// Load the snapshot for `owner`, or `None` if there is none.
    ///
    /// A file holding another owner's snapshot is treated as absent. A
    /// corrupt file is deleted so the next sync writes a fresh one.
    pub fn load(&self, owner: &str) -> Result<Option<Snapshot>> {
        let path = self.path_for(owner);
        if !path.exists() {
            return Ok(None);
        }
        match read_snapshot(&path) {
            Ok(snapshot) if snapshot.owner != owner => {
                tracing::warn!(
                    path = %path.display(),
                    expected = owner,
                    found = %snapshot.owner,
                    "snapshot belongs to another owner, ignoring"
                );
                Ok(None)
            }
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt snapshot, removing");
                let _ = fs::remove_file(&path);
                Err(CollectionError::NotFound(format!(
                    "Snapshot for '{}' was corrupt and has been removed: {}",
                    owner, e
                )))
            }
        }
    }

    /// Returns whether a snapshot existed.
    pub fn remove(&self, owner: &str) -> Result<bool> {
        let path = self.path_for(owner);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    /// Remove every snapshot and recreate the directory.
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let file = fs::File::open(path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    Ok(serde_json::from_reader(BufReader::new(decoder))?)
}
