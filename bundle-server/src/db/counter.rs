//! Serial number counter
//!
//! One persisted text value holding the next integer to allocate. Reads of
//! a missing or unreadable value yield `""` rather than an error; callers that
//! need a number decide what an empty value means.

use redb::WriteTransaction;
use tracing::{error, info};

use super::storage::{BundleStorage, StorageResult};

/// Meta key of the counter value
pub const COUNTER_KEY: &str = "current_bundle_no";

/// Value written when no counter exists yet
pub const INITIAL_COUNTER: &str = "1";

#[derive(Debug, Clone)]
pub struct SequenceCounter {
    storage: BundleStorage,
}

impl SequenceCounter {
    pub fn new(storage: BundleStorage) -> Self {
        Self { storage }
    }

    /// Last stored value, `""` when absent or unreadable
    pub fn read(&self) -> String {
        match self.storage.get_meta(COUNTER_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => String::new(),
            Err(e) => {
                error!(error = %e, "Failed to read serial counter");
                String::new()
            }
        }
    }

    /// Overwrite the stored value
    pub fn write(&self, value: &str) -> StorageResult<()> {
        let txn = self.storage.begin_write()?;
        self.write_in(&txn, value)?;
        txn.commit()?;
        Ok(())
    }

    /// Read inside a write transaction (allocation path)
    pub fn read_in(&self, txn: &WriteTransaction) -> StorageResult<String> {
        Ok(self
            .storage
            .get_meta_in(txn, COUNTER_KEY)?
            .unwrap_or_default())
    }

    pub fn write_in(&self, txn: &WriteTransaction, value: &str) -> StorageResult<()> {
        self.storage.set_meta(txn, COUNTER_KEY, value)
    }

    /// Seed the counter with [`INITIAL_COUNTER`] when it does not exist yet
    pub fn ensure_initialized(&self) -> StorageResult<()> {
        let txn = self.storage.begin_write()?;
        if self.storage.get_meta_in(&txn, COUNTER_KEY)?.is_none() {
            self.write_in(&txn, INITIAL_COUNTER)?;
            info!(value = INITIAL_COUNTER, "Initialized serial counter");
        }
        txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_absent_is_empty() {
        let counter = SequenceCounter::new(BundleStorage::open_in_memory().unwrap());
        assert_eq!(counter.read(), "");
    }

    #[test]
    fn test_write_then_read() {
        let counter = SequenceCounter::new(BundleStorage::open_in_memory().unwrap());
        counter.write("17").unwrap();
        assert_eq!(counter.read(), "17");
        counter.write("3").unwrap();
        assert_eq!(counter.read(), "3");
    }

    #[test]
    fn test_ensure_initialized_keeps_existing_value() {
        let counter = SequenceCounter::new(BundleStorage::open_in_memory().unwrap());
        counter.ensure_initialized().unwrap();
        assert_eq!(counter.read(), "1");

        counter.write("99").unwrap();
        counter.ensure_initialized().unwrap();
        assert_eq!(counter.read(), "99");
    }
}
