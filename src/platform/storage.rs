//! String-keyed storage for JSON documents
//!
//! LocalStorage on the web, one file per key on native, and an in-memory map
//! for tests and headless runs.

use std::collections::HashMap;
use std::fmt;

/// Storage write failure
#[derive(Debug)]
pub enum StorageError {
    /// Storage is not available (no window, private mode, ...)
    Unavailable(String),
    /// The backend refused the write
    Write(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(m) => write!(f, "storage unavailable: {m}"),
            Self::Write(m) => write!(f, "storage write failed: {m}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// A string-keyed store of string values
pub trait KeyValueStore {
    /// Read a value; `None` when missing or unreadable
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use super::{KeyValueStore, StorageError};

    /// One `<key>.json` file per key inside a directory
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        fn path_for(&self, key: &str) -> PathBuf {
            let file: String = key
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
                .collect();
            self.dir.join(format!("{file}.json"))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Option<String> {
            fs::read_to_string(self.path_for(key)).ok()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            fs::create_dir_all(&self.dir)
                .map_err(|e| StorageError::Unavailable(format!("{}: {e}", self.dir.display())))?;
            let path = self.path_for(key);
            // Write-then-rename so a crash never leaves half a document
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value).map_err(|e| StorageError::Write(e.to_string()))?;
            fs::rename(&tmp, &path).map_err(|e| StorageError::Write(e.to_string()))
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            match fs::remove_file(self.path_for(key)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::Write(e.to_string())),
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{KeyValueStore, StorageError};

    /// Browser LocalStorage
    #[derive(Debug, Clone, Default)]
    pub struct LocalStorage;

    impl LocalStorage {
        pub fn new() -> Self {
            Self
        }

        fn storage() -> Option<web_sys::Storage> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Option<String> {
            Self::storage()?.get_item(key).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            let storage = Self::storage()
                .ok_or_else(|| StorageError::Unavailable("no localStorage".to_string()))?;
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::Write(format!("{e:?}")))
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            let storage = Self::storage()
                .ok_or_else(|| StorageError::Unavailable("no localStorage".to_string()))?;
            storage
                .remove_item(key)
                .map_err(|e| StorageError::Write(format!("{e:?}")))
        }
    }
}
