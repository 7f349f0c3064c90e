//! Key/value storage for published records.
//!
//! Records and indexes are addressed by slash-separated keys relative to the repository
//! root (for example `briefings/2026-10-19.json`). The stores only move bytes; JSON encoding
//! lives with the services that own each record type.
//!
//! [`FsStore`] is the production implementation. [`MemoryStore`] keeps everything in a map
//! and is used by tests and by `render`-style dry runs.

use crate::error::{PublishError, PublishResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

pub trait RecordStore {
    /// Returns the bytes stored under `key`, or `None` if nothing is stored there.
    fn read(&self, key: &str) -> PublishResult<Option<Vec<u8>>>;

    /// Writes (or overwrites) the bytes stored under `key`.
    fn write(&self, key: &str, contents: &[u8]) -> PublishResult<()>;

    /// Removes `key`. Returns `false` if it did not exist.
    fn remove(&self, key: &str) -> PublishResult<bool>;

    fn exists(&self, key: &str) -> PublishResult<bool>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn read(&self, key: &str) -> PublishResult<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, contents: &[u8]) -> PublishResult<()> {
        (**self).write(key, contents)
    }

    fn remove(&self, key: &str) -> PublishResult<bool> {
        (**self).remove(key)
    }

    fn exists(&self, key: &str) -> PublishResult<bool> {
        (**self).exists(key)
    }
}

/// Validates a store key and converts it to a relative path.
///
/// Keys must be non-empty, relative, and must not contain `..` components.
fn key_to_relative_path(key: &str) -> PublishResult<PathBuf> {
    if key.trim().is_empty() {
        return Err(PublishError::InvalidInput("store key cannot be empty".into()));
    }

    let path = Path::new(key);
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(PublishError::InvalidInput(format!(
            "store key must be a relative path without '..': {}",
            key
        )));
    }

    Ok(path.to_path_buf())
}

/// Filesystem-backed store rooted at a directory (the repository working tree).
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, key: &str) -> PublishResult<PathBuf> {
        Ok(self.root.join(key_to_relative_path(key)?))
    }
}

impl RecordStore for FsStore {
    fn read(&self, key: &str) -> PublishResult<Option<Vec<u8>>> {
        let path = self.full_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PublishError::FileRead(e)),
        }
    }

    fn write(&self, key: &str, contents: &[u8]) -> PublishResult<()> {
        let path = self.full_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(PublishError::FileWrite)?;
        }
        fs::write(&path, contents).map_err(PublishError::FileWrite)
    }

    fn remove(&self, key: &str) -> PublishResult<bool> {
        let path = self.full_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PublishError::FileRemove(e)),
        }
    }

    fn exists(&self, key: &str) -> PublishResult<bool> {
        Ok(self.full_path(key)?.is_file())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys in lexical order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, key: &str) -> PublishResult<Option<Vec<u8>>> {
        key_to_relative_path(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &[u8]) -> PublishResult<()> {
        key_to_relative_path(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), contents.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> PublishResult<bool> {
        key_to_relative_path(key)?;
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn exists(&self, key: &str) -> PublishResult<bool> {
        key_to_relative_path(key)?;
        Ok(self.entries.borrow().contains_key(key))
    }
}
