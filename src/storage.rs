//! Key-value persistence for the state container.
//!
//! The container hands storage an opaque JSON blob; storage only has to give
//! the same blob back under the same key.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;

/// A place to keep serialized state between sessions.
pub trait StateStorage {
    /// Returns the blob saved under `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn save(&mut self, key: &str, blob: &str) -> anyhow::Result<()>;
}

/// Keeps blobs in memory. Useful for tests and short-lived sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// Keeps each key in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn save(&mut self, key: &str, blob: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(key);
        fs::write(&path, blob).with_context(|| format!("writing {}", path.display()))
    }
}
