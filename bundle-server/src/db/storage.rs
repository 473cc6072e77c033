//! redb-based storage for bundles, archived bundles and variants
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `bundles` | uid | Bundle JSON (active store) |
//! | `bundles_by_sr` | sr_no | uid |
//! | `sold_bundles` | uid | SoldBundle JSON (archive store) |
//! | `sold_bundles_by_sr` | sr_no | uid |
//! | `variants` | s_no | Variant JSON |
//! | `meta` | key | text (serial counter) |
//!
//! redb admits one write transaction at a time; multi-step lifecycle changes
//! run inside a single [`WriteTransaction`] so they commit or vanish together.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Bundle, SoldBundle, Variant};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Active bundles: key = uid, value = JSON
const BUNDLES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("bundles");

/// Index: sr_no -> uid (active store)
const BUNDLES_BY_SR_TABLE: TableDefinition<&str, &str> = TableDefinition::new("bundles_by_sr");

/// Archived bundles: key = uid, value = JSON
const SOLD_BUNDLES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sold_bundles");

/// Index: sr_no -> uid (archive store)
const SOLD_BY_SR_TABLE: TableDefinition<&str, &str> = TableDefinition::new("sold_bundles_by_sr");

/// Variants: key = s_no, value = JSON
const VARIANTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("variants");

/// Single text values
const META_TABLE: TableDefinition<&str, &str> = TableDefinition::new("meta");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub bundle_count: u64,
    pub sold_bundle_count: u64,
    pub variant_count: u64,
}

/// Bundle tracker storage
#[derive(Clone)]
pub struct BundleStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for BundleStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleStorage").finish_non_exhaustive()
    }
}

impl BundleStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (tests, dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BUNDLES_TABLE)?;
            let _ = write_txn.open_table(BUNDLES_BY_SR_TABLE)?;
            let _ = write_txn.open_table(SOLD_BUNDLES_TABLE)?;
            let _ = write_txn.open_table(SOLD_BY_SR_TABLE)?;
            let _ = write_txn.open_table(VARIANTS_TABLE)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Active bundles ==========

    /// Get an active bundle by uid
    pub fn get_bundle(&self, uid: &str) -> StorageResult<Option<Bundle>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BUNDLES_TABLE)?;
        read_json(&table, uid)
    }

    /// Get an active bundle by serial
    pub fn find_bundle_by_sr(&self, sr_no: &str) -> StorageResult<Option<Bundle>> {
        let read_txn = self.db.begin_read()?;
        let idx = read_txn.open_table(BUNDLES_BY_SR_TABLE)?;
        let Some(uid) = idx.get(sr_no)?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let table = read_txn.open_table(BUNDLES_TABLE)?;
        read_json(&table, &uid)
    }

    /// All active bundles (ACTIVE and RETURNED), unordered
    pub fn list_bundles(&self) -> StorageResult<Vec<Bundle>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BUNDLES_TABLE)?;
        let mut bundles = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            bundles.push(serde_json::from_slice(guard.value())?);
        }
        Ok(bundles)
    }

    pub fn get_bundle_in(
        &self,
        txn: &WriteTransaction,
        uid: &str,
    ) -> StorageResult<Option<Bundle>> {
        let table = txn.open_table(BUNDLES_TABLE)?;
        read_json(&table, uid)
    }

    pub fn find_bundle_by_sr_in(
        &self,
        txn: &WriteTransaction,
        sr_no: &str,
    ) -> StorageResult<Option<Bundle>> {
        let uid = {
            let idx = txn.open_table(BUNDLES_BY_SR_TABLE)?;
            let value = idx.get(sr_no)?.map(|g| g.value().to_string());
            value
        };
        match uid {
            Some(uid) => self.get_bundle_in(txn, &uid),
            None => Ok(None),
        }
    }

    /// Insert or overwrite an active bundle and its serial index entry
    pub fn put_bundle(&self, txn: &WriteTransaction, bundle: &Bundle) -> StorageResult<()> {
        let mut table = txn.open_table(BUNDLES_TABLE)?;
        let value = serde_json::to_vec(bundle)?;
        table.insert(bundle.uid.as_str(), value.as_slice())?;

        let mut idx = txn.open_table(BUNDLES_BY_SR_TABLE)?;
        idx.insert(bundle.sr_no.as_str(), bundle.uid.as_str())?;

        Ok(())
    }

    /// Remove an active bundle. The serial index entry is only dropped when
    /// it still points at this uid.
    pub fn remove_bundle(&self, txn: &WriteTransaction, bundle: &Bundle) -> StorageResult<bool> {
        let mut table = txn.open_table(BUNDLES_TABLE)?;
        let removed = table.remove(bundle.uid.as_str())?.is_some();

        let mut idx = txn.open_table(BUNDLES_BY_SR_TABLE)?;
        let points_here = idx
            .get(bundle.sr_no.as_str())?
            .is_some_and(|g| g.value() == bundle.uid);
        if points_here {
            idx.remove(bundle.sr_no.as_str())?;
        }

        Ok(removed)
    }

    // ========== Archived bundles ==========

    pub fn find_sold_by_sr(&self, sr_no: &str) -> StorageResult<Option<SoldBundle>> {
        let read_txn = self.db.begin_read()?;
        let idx = read_txn.open_table(SOLD_BY_SR_TABLE)?;
        let Some(uid) = idx.get(sr_no)?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let table = read_txn.open_table(SOLD_BUNDLES_TABLE)?;
        read_json(&table, &uid)
    }

    pub fn find_sold_by_sr_in(
        &self,
        txn: &WriteTransaction,
        sr_no: &str,
    ) -> StorageResult<Option<SoldBundle>> {
        let uid = {
            let idx = txn.open_table(SOLD_BY_SR_TABLE)?;
            let value = idx.get(sr_no)?.map(|g| g.value().to_string());
            value
        };
        match uid {
            Some(uid) => {
                let table = txn.open_table(SOLD_BUNDLES_TABLE)?;
                read_json(&table, &uid)
            }
            None => Ok(None),
        }
    }

    pub fn put_sold_bundle(&self, txn: &WriteTransaction, sold: &SoldBundle) -> StorageResult<()> {
        let mut table = txn.open_table(SOLD_BUNDLES_TABLE)?;
        let value = serde_json::to_vec(sold)?;
        table.insert(sold.uid(), value.as_slice())?;

        let mut idx = txn.open_table(SOLD_BY_SR_TABLE)?;
        idx.insert(sold.sr_no(), sold.uid())?;

        Ok(())
    }

    /// Whether `sr_no` is resident in either store
    pub fn serial_in_use(&self, txn: &WriteTransaction, sr_no: &str) -> StorageResult<bool> {
        let active = txn.open_table(BUNDLES_BY_SR_TABLE)?;
        if active.get(sr_no)?.is_some() {
            return Ok(true);
        }
        let sold = txn.open_table(SOLD_BY_SR_TABLE)?;
        Ok(sold.get(sr_no)?.is_some())
    }

    // ========== Variants ==========

    pub fn get_variant(&self, s_no: &str) -> StorageResult<Option<Variant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VARIANTS_TABLE)?;
        read_json(&table, s_no)
    }

    pub fn list_variants(&self) -> StorageResult<Vec<Variant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VARIANTS_TABLE)?;
        let mut variants = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            variants.push(serde_json::from_slice(guard.value())?);
        }
        Ok(variants)
    }

    pub fn put_variant(&self, txn: &WriteTransaction, variant: &Variant) -> StorageResult<()> {
        let mut table = txn.open_table(VARIANTS_TABLE)?;
        write_json(&mut table, &variant.s_no, variant)
    }

    // ========== Meta ==========

    pub fn get_meta(&self, key: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META_TABLE)?;
        let value = table.get(key)?.map(|g| g.value().to_string());
        Ok(value)
    }

    pub fn get_meta_in(&self, txn: &WriteTransaction, key: &str) -> StorageResult<Option<String>> {
        let table = txn.open_table(META_TABLE)?;
        let value = table.get(key)?.map(|g| g.value().to_string());
        Ok(value)
    }

    pub fn set_meta(&self, txn: &WriteTransaction, key: &str, value: &str) -> StorageResult<()> {
        let mut table = txn.open_table(META_TABLE)?;
        table.insert(key, value)?;
        Ok(())
    }

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;
        let bundles = read_txn.open_table(BUNDLES_TABLE)?;
        let sold = read_txn.open_table(SOLD_BUNDLES_TABLE)?;
        let variants = read_txn.open_table(VARIANTS_TABLE)?;

        Ok(StorageStats {
            bundle_count: bundles.len()?,
            sold_bundle_count: sold.len()?,
            variant_count: variants.len()?,
        })
    }
}

fn read_json<T, Tb>(table: &Tb, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    Tb: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

fn write_json<T: Serialize>(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let bytes = serde_json::to_vec(value)?;
    table.insert(key, bytes.as_slice())?;
    Ok(())
}
