//! Key-value persistence for the best score and player preferences
//!
//! The browser build stores plain strings in LocalStorage; everything else
//! (native runner, tests) uses an in-memory map. Failures are reported as
//! `StorageError` and callers fall back to defaults.

use std::collections::HashMap;
use std::fmt;

/// Storage keys
pub mod keys {
    /// Best floored score, decimal integer
    pub const BEST: &str = "rc.best";
    /// Reduced motion, "1" or "0"
    pub const REDUCED_MOTION: &str = "rc.rm";
    /// Day cycle mode: auto|night|dawn|day
    pub const CYCLE: &str = "rc.cycle";
    /// Weather mode: none|rain|snow|fog|storm
    pub const WEATHER: &str = "rc.weather";
    /// Tutorial hint already seen, "1"
    pub const HINT_DONE: &str = "rc.hintDone";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// No storage backend (private mode, no window)
    Unavailable,
    Read { key: String },
    Write { key: String },
    Parse { key: String, value: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Read { key } => write!(f, "failed to read {key}"),
            Self::Write { key } => write!(f, "failed to write {key}"),
            Self::Parse { key, value } => write!(f, "unparseable value {value:?} for {key}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// String key-value store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read a key and parse it with `parse`, treating a missing key as `None`
pub fn read_parsed<S, T, F>(storage: &S, key: &str, parse: F) -> Result<Option<T>, StorageError>
where
    S: Storage + ?Sized,
    F: FnOnce(&str) -> Option<T>,
{
    match storage.get(key)? {
        None => Ok(None),
        Some(value) => parse(value.trim()).map(Some).ok_or_else(|| StorageError::Parse {
            key: key.to_string(),
            value,
        }),
    }
}

/// Like `read_parsed`, but logs failures and returns `None` instead
pub fn read_or_warn<S, T, F>(storage: &S, key: &str, parse: F) -> Option<T>
where
    S: Storage + ?Sized,
    F: FnOnce(&str) -> Option<T>,
{
    read_parsed(storage, key, parse).unwrap_or_else(|e| {
        log::warn!("{e}; using default");
        None
    })
}

/// Write a key, logging failures
pub fn write_or_warn<S: Storage + ?Sized>(storage: &mut S, key: &str, value: &str) {
    if let Err(e) = storage.set(key, value) {
        log::warn!("{e}");
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|_| StorageError::Read {
            key: key.to_string(),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(|_| StorageError::Write {
            key: key.to_string(),
        })
    }
}

/// The platform's default store; falls back to memory when the browser
/// refuses LocalStorage
pub fn open_default() -> Box<dyn Storage> {
    #[cfg(target_arch = "wasm32")]
    {
        match LocalStorage::open() {
            Ok(storage) => return Box::new(storage),
            Err(e) => log::warn!("{e}; preferences will not persist"),
        }
    }
    Box::new(MemoryStorage::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A store whose writes always fail
    struct ReadOnly(MemoryStorage);

    impl Storage for ReadOnly {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write { key: key.to_string() })
        }
    }

    #[test]
    fn test_memory_round_trip() {
        let mut s = MemoryStorage::new();
        assert_eq!(s.get(keys::BEST).unwrap(), None);
        s.set(keys::BEST, "42").unwrap();
        assert_eq!(s.get(keys::BEST).unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn test_read_parsed_reports_garbage() {
        let mut s = MemoryStorage::new();
        s.set(keys::BEST, "lots").unwrap();
        let err = read_parsed(&s, keys::BEST, |v| v.parse::<u64>().ok()).unwrap_err();
        assert_eq!(
            err,
            StorageError::Parse {
                key: keys::BEST.to_string(),
                value: "lots".to_string()
            }
        );
        assert_eq!(read_or_warn(&s, keys::BEST, |v| v.parse::<u64>().ok()), None);
    }

    #[test]
    fn test_read_parsed_trims_and_handles_missing() {
        let mut s = MemoryStorage::new();
        assert_eq!(read_parsed(&s, keys::BEST, |v| v.parse::<u64>().ok()), Ok(None));
        s.set(keys::BEST, " 17 ").unwrap();
        assert_eq!(read_parsed(&s, keys::BEST, |v| v.parse::<u64>().ok()), Ok(Some(17)));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut s = ReadOnly(MemoryStorage::new());
        write_or_warn(&mut s, keys::BEST, "1");
        assert_eq!(s.get(keys::BEST).unwrap(), None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(StorageError::Unavailable.to_string(), "storage unavailable");
        assert_eq!(
            StorageError::Write { key: "rc.rm".into() }.to_string(),
            "failed to write rc.rm"
        );
    }
}
