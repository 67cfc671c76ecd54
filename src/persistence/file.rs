//! JSON file backend for native builds
//!
//! The whole key space lives in one JSON object. Every write rewrites the
//! file through a temporary sibling that is renamed over the original.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::StorageBackend;
use crate::error::StorageError;

#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: RefCell<Option<BTreeMap<String, String>>>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> R,
    ) -> Result<R, StorageError> {
        let mut cached = self.entries.borrow_mut();
        if cached.is_none() {
            *cached = Some(self.load()?);
        }
        match cached.as_mut() {
            Some(entries) => Ok(f(entries)),
            None => Err(StorageError::Unavailable),
        }
    }
}

impl StorageBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    /// The cache only changes once the file write has succeeded
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut updated = self.with_entries(|entries| entries.clone())?;
        updated.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&updated)?;
        write_text_atomic(&self.path, &text)?;
        *self.entries.borrow_mut() = Some(updated);
        Ok(())
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("scores.json");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}
