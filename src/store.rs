use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, error, warn};

use crate::chain;
use crate::error::{LedgerError, Result};
use crate::models::VoteRecord;

/// What an audit read found in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredLedger {
    Records(Vec<VoteRecord>),
    /// Content exists but does not parse as a ledger.
    Unreadable(String),
}

/// Durable, ordered storage for the ledger's records.
///
/// Implementations must make `replace_all` atomic with respect to `load`:
/// a concurrent reader sees either the old or the new sequence in full.
pub trait LedgerStore: Send + Sync {
    /// Lenient read used for writing: unparseable content reads as empty.
    fn load(&self) -> Result<Vec<VoteRecord>>;

    /// Strict read used for auditing: unparseable content is reported.
    fn load_strict(&self) -> Result<StoredLedger> {
        Ok(StoredLedger::Records(self.load()?))
    }

    fn replace_all(&self, records: &[VoteRecord]) -> Result<()>;

    fn append(&self, record: VoteRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);
        self.replace_all(&records)
    }

    /// Recomputes the whole chain from stored content.
    fn verify(&self) -> Result<bool> {
        Ok(match self.load_strict()? {
            StoredLedger::Records(records) => chain::verify_chain(&records).is_ok(),
            StoredLedger::Unreadable(_) => false,
        })
    }
}

/// Ledger persisted as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating missing parent directories.
    /// The file itself is only written on the first save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LedgerError::storage(parent, e))?;
        }
        Ok(JsonFileStore { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomically(&self, records: &[VoteRecord]) -> io::Result<()> {
        let temp = self.temp_path();
        let contents = serde_json::to_string_pretty(records)?;

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&temp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, &self.path)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Vec<VoteRecord>> {
        match self.load_strict()? {
            StoredLedger::Records(records) => Ok(records),
            StoredLedger::Unreadable(reason) => {
                warn!(
                    "Ledger {} is unreadable ({}), starting from an empty ledger",
                    self.path.display(),
                    reason
                );
                Ok(Vec::new())
            }
        }
    }

    fn load_strict(&self) -> Result<StoredLedger> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(StoredLedger::Records(Vec::new()))
            }
            Err(e) => {
                error!("Failed to read ledger {}: {}", self.path.display(), e);
                return Err(LedgerError::storage(&self.path, e));
            }
        };

        if contents.trim().is_empty() {
            return Ok(StoredLedger::Records(Vec::new()));
        }

        match serde_json::from_str::<Vec<VoteRecord>>(&contents) {
            Ok(records) => {
                debug!("Loaded {} records from {}", records.len(), self.path.display());
                Ok(StoredLedger::Records(records))
            }
            Err(e) => Ok(StoredLedger::Unreadable(e.to_string())),
        }
    }

    fn replace_all(&self, records: &[VoteRecord]) -> Result<()> {
        self.write_atomically(records).map_err(|e| {
            error!("Failed to save ledger {}: {}", self.path.display(), e);
            let _ = fs::remove_file(self.temp_path());
            LedgerError::storage(&self.path, e)
        })
    }
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<VoteRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<VoteRecord>) -> Self {
        MemoryStore {
            records: RwLock::new(records),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Vec<VoteRecord>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.clone())
    }

    fn replace_all(&self, records: &[VoteRecord]) -> Result<()> {
        let mut stored = self.records.write().unwrap_or_else(|e| e.into_inner());
        *stored = records.to_vec();
        Ok(())
    }
}
