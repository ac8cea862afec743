use core::fmt;
use log::{debug, warn};
#[cfg(feature = "std")]
use std::{fs, path::PathBuf};

/// Failure to persist the boot counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageError;

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unable to persist the boot counter")
    }
}

/// Durable storage of the boot counter.
pub trait CounterStorage {
    /// Returns the stored value, or `None` if there is none yet.
    fn read_counter(&mut self) -> Option<u16>;
    fn write_counter(&mut self, value: u16) -> Result<(), StorageError>;
}

/// Keeps the counter in memory, which is enough for tests and for nodes
/// without durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    value: Option<u16>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    pub fn with_value(value: u16) -> MemoryStorage {
        MemoryStorage {
            value: Some(value),
            writes: 0,
        }
    }

    pub fn value(&self) -> Option<u16> {
        self.value
    }

    /// Returns how often the counter has been written.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CounterStorage for MemoryStorage {
    fn read_counter(&mut self) -> Option<u16> {
        self.value
    }

    fn write_counter(&mut self, value: u16) -> Result<(), StorageError> {
        self.value = Some(value);
        self.writes += 1;
        Ok(())
    }
}

/// Keeps the counter as two little-endian bytes in a file.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStorage {
    path: PathBuf,
}

#[cfg(feature = "std")]
impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> FileStorage {
        FileStorage { path: path.into() }
    }
}

#[cfg(feature = "std")]
impl CounterStorage for FileStorage {
    fn read_counter(&mut self) -> Option<u16> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.len() >= 2 => {
                Some(u16::from_le_bytes([bytes[0], bytes[1]]))
            }
            Ok(_) => {
                warn!("Boot counter file {:?} is truncated", self.path);
                None
            }
            Err(_) => None,
        }
    }

    fn write_counter(&mut self, value: u16) -> Result<(), StorageError> {
        fs::write(&self.path, value.to_le_bytes()).map_err(|e| {
            warn!("Unable to write boot counter to {:?}: {}", self.path, e);
            StorageError
        })
    }
}

/// The boot counter, cached in memory.
///
/// Storage is only read on the first or a forced read. After a configured
/// number of cached reads, the counter is incremented and persisted, so a
/// long-running node doesn't send the same counter forever.
///
/// While a value hasn't been persisted, storage is behind and isn't read.
/// Reads that would go to storage retry persisting instead, so the counter
/// never goes back.
#[derive(Debug)]
pub struct ReplayCounterStore<S> {
    storage: S,
    counter: u16,
    cache_reads: u16,
    max_cache_reads: u16,
    unpersisted: bool,
}

impl<S: CounterStorage> ReplayCounterStore<S> {
    pub fn new(storage: S, max_cache_reads: u16) -> ReplayCounterStore<S> {
        ReplayCounterStore {
            storage,
            counter: 0,
            cache_reads: 0,
            max_cache_reads,
            unpersisted: false,
        }
    }

    /// Returns the boot counter.
    ///
    /// A forced read always goes to storage and doesn't count as a cached
    /// read.
    pub fn read(&mut self, force_refresh: bool) -> u16 {
        if force_refresh || self.cache_reads == 0 {
            if self.unpersisted {
                self.persist();
            } else if let Some(value) = self.storage.read_counter() {
                self.counter = value;
            }
            debug!("Boot counter read from storage: {}", self.counter);
            self.cache_reads = 0;
        } else if self.cache_reads >= self.max_cache_reads {
            self.counter = self.counter.wrapping_add(1);
            self.persist();
            debug!("Boot counter incremented to {}", self.counter);
            self.cache_reads = 0;
        }

        if !force_refresh {
            self.cache_reads = self.cache_reads.saturating_add(1);
        }

        self.counter
    }

    /// Sets and persists the boot counter.
    pub fn write(&mut self, value: u16) {
        self.counter = value;
        self.persist();
    }

    /// Increments the stored counter, as done once when a node boots or
    /// initializes its connection, and returns the new value.
    pub fn on_boot(&mut self) -> u16 {
        let counter = self.read(true).wrapping_add(1);
        self.write(counter);
        debug!("Boot counter is now {}", counter);
        counter
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        self.unpersisted = self.storage.write_counter(self.counter).is_err();
        if self.unpersisted {
            warn!("Boot counter {} not persisted", self.counter);
        }
    }
}
