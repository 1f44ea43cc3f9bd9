//! WishStore: the guestbook as a single JSON document.
//!
//! Reads go straight to the file. Mutations (`initialize`, `append`) run
//! under one lock for the whole read-modify-write cycle and replace the file
//! through a temp file + rename, so concurrent appends are never lost and a
//! crash mid-write leaves the previous document intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::id::IdAllocator;
use crate::message::{Message, Submission};

const SEEDS: [(&str, &str); 2] = [
    (
        "Bpk. Moh. Hasan & Ibu Sofiah",
        "Barakallahu lakum wa baraka 'alaikum wa jama'a bainakuma fii khair.",
    ),
    (
        "Bpk. Siman & Ibu Titin",
        "Selamat menempuh hidup baru anak-anakku tersayang. Semoga bahagia selalu.",
    ),
];

/// The two messages a fresh guestbook starts with, one from each family.
///
/// Returned most-recent-first like any stored list: the first entry carries
/// the larger id.
pub fn seed_messages(now_millis: i64) -> Result<Vec<Message>> {
    let mut ids = IdAllocator::after(&[], now_millis);
    let mut seeds = SEEDS
        .iter()
        .rev()
        .map(|(name, text)| -> Result<Message> {
            Ok(Message {
                id: ids.allocate()?,
                name: name.to_string(),
                text: text.to_string(),
                created_at_millis: now_millis,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    seeds.reverse();
    Ok(seeds)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// File-backed guestbook store.
#[derive(Debug)]
pub struct WishStore {
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl WishStore {
    /// Create a store without touching the filesystem.
    ///
    /// Call [`WishStore::initialize`] before serving, or use [`WishStore::open`].
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store and seed it if no document exists yet.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::new(config);
        store.initialize()?;
        Ok(store)
    }

    /// Open a store keeping `wishes.json` under `data_dir`.
    pub fn at_path(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open(StoreConfig::with_data_dir(data_dir))
    }

    /// Path of the guestbook document.
    pub fn path(&self) -> PathBuf {
        self.config.wishes_path()
    }

    /// Write the seed messages if no document exists.
    ///
    /// Returns `true` when the guestbook was created, `false` when a document
    /// (of any content, even a corrupt one) was already there.
    pub fn initialize(&self) -> Result<bool> {
        let _guard = self.lock();

        let path = self.path();
        let exists = path.try_exists().map_err(|e| unavailable(&path, e))?;
        if exists {
            debug!(path = %path.display(), "guestbook already initialized");
            return Ok(false);
        }

        let seeds = seed_messages(now_millis())?;
        let created = self.write_document(&seeds, false)?;
        if created {
            info!(path = %path.display(), count = seeds.len(), "created guestbook with seed messages");
        }
        Ok(created)
    }

    /// Read the full guestbook, most-recent-first, reporting failures.
    ///
    /// A missing document reads as an empty guestbook.
    pub fn load(&self) -> Result<Vec<Message>> {
        let path = self.path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable(&path, e)),
        };

        serde_json::from_str(&json).map_err(|source| Error::MalformedStorage { path, source })
    }

    /// Read the full guestbook, most-recent-first.
    ///
    /// Never fails: unreadable or malformed storage yields an empty list and a
    /// warning in the log.
    pub fn list_all(&self) -> Vec<Message> {
        match self.load() {
            Ok(messages) => messages,
            Err(e) => {
                warn!(path = %self.path().display(), error = %e, "guestbook unreadable, serving empty list");
                Vec::new()
            }
        }
    }

    /// Add a message at the head of the guestbook and return the whole list.
    ///
    /// Validation happens before any I/O; an invalid request never touches the
    /// file. A malformed document is reported rather than overwritten.
    pub fn append(&self, name: &str, text: &str) -> Result<Vec<Message>> {
        let submission = Submission::new(name, text)?;

        let _guard = self.lock();

        let mut messages = self.load()?;
        let now = now_millis();
        let id = IdAllocator::after(&messages, now).allocate()?;
        let message = submission.into_message(id, now);

        debug!(id = %message.id, name = %message.name, "appending guestbook message");
        messages.insert(0, message);
        self.write_document(&messages, true)?;

        Ok(messages)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives on disk; a panicked writer leaves it intact.
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically write `messages` as the guestbook document.
    ///
    /// With `replace == false` an existing document is left alone and
    /// `Ok(false)` is returned.
    fn write_document(&self, messages: &[Message], replace: bool) -> Result<bool> {
        let path = self.path();
        let dir = self.config.staging_dir();

        fs::create_dir_all(dir).map_err(|e| unavailable(dir, e))?;

        let json = serde_json::to_string_pretty(messages).map_err(Error::Encode)?;

        let mut staged = NamedTempFile::new_in(dir).map_err(|e| unavailable(dir, e))?;
        staged
            .write_all(json.as_bytes())
            .map_err(|e| unavailable(staged.path(), e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| unavailable(staged.path(), e))?;

        let persisted = if replace {
            staged.persist(&path)
        } else {
            staged.persist_noclobber(&path)
        };

        match persisted {
            Ok(_) => {}
            Err(e) if !replace && e.error.kind() == io::ErrorKind::AlreadyExists => {
                return Ok(false);
            }
            Err(e) => return Err(unavailable(&path, e.error)),
        }

        sync_dir(dir);
        Ok(true)
    }
}

/// Flush the directory entry so the rename itself survives a crash.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
            debug!(dir = %dir.display(), error = %e, "directory fsync failed");
        }
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
}

fn unavailable(path: &Path, source: io::Error) -> Error {
    Error::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    }
}
