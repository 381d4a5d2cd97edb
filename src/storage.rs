//! Client-persistent named slots.
//!
//! The cart keeps two slots: the serialized guest cart and the last-known
//! item count. [`FileStorage`] keeps each slot as a file in a directory,
//! [`MemoryStorage`] keeps them in process.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config;
use crate::error::{CartError, Result};

/// A store of named string slots, read and written synchronously.
pub trait SlotStorage {
    /// Read a slot, or `None` if it has never been written or was removed.
    ///
    /// Contents that are not valid UTF-8 come back as an
    /// [`std::io::ErrorKind::InvalidData`] I/O error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Slots stored as `<dir>/<key>.slot` files.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the slot, so an interrupted write never leaves a truncated slot behind.
#[derive(Debug)]
pub struct FileStorage {
    /// Directory where slot files are stored.
    pub dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a slot directory.
    ///
    /// If `dir` is `None`, uses the platform-appropriate local data directory.
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let dir = dir.unwrap_or_else(config::default_storage_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CartError::InvalidArgument(format!(
                "Invalid storage slot name: {:?}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.slot", key)))
    }

    /// Remove every slot and recreate the directory.
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
            fs::create_dir_all(&self.dir)?;
        }
        tracing::info!(dir = %self.dir.display(), "cleared slot storage");
        Ok(())
    }

    /// Directory where slot files are stored.
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl SlotStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| CartError::Io(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-process slots; nothing survives the value being dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}
