//! LMDB-backed storage for committed certifications.
//!
//! Two named databases live in one environment:
//!
//! - `certifications`: record id → JSON record
//! - `certification_names`: trimmed name → record id
//!
//! The name index is the authoritative uniqueness guard. Both entries are
//! written in one write transaction with `NO_OVERWRITE`, so two concurrent
//! inserts of the same name cannot both commit.

use std::fs;
use std::path::PathBuf;

use lmdb::{Cursor, Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::certification::CertificationRecord;
use crate::config::StoreConfig;
use crate::error::CertError;
use crate::validation::FieldError;

const RECORDS_DB: &str = "certifications";
const NAMES_DB: &str = "certification_names";

pub struct CertDbState {
    env: Environment,
    records: Database,
    names: Database,
    path: PathBuf,
}

impl CertDbState {
    /// Opens (or creates) the store described by `config`.
    ///
    /// # Errors
    ///
    /// Any failure to create the directory or open the environment is
    /// reported as [`CertError::StorageUnavailable`].
    pub fn open(config: &StoreConfig) -> Result<Self, CertError> {
        let dir = config.lmdb_dir();
        info!("Opening certification store at {}", dir.display());

        fs::create_dir_all(&dir).map_err(|e| {
            CertError::StorageUnavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        let env = Environment::new()
            .set_max_dbs(2)
            .set_map_size(config.map_size)
            .open(&dir)
            .map_err(|e| unavailable(&dir, e))?;

        let records = env
            .create_db(Some(RECORDS_DB), DatabaseFlags::empty())
            .map_err(|e| unavailable(&dir, e))?;
        let names = env
            .create_db(Some(NAMES_DB), DatabaseFlags::empty())
            .map_err(|e| unavailable(&dir, e))?;

        Ok(Self { env, records, names, path: dir })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Inserts a new record and claims its name.
    ///
    /// # Errors
    ///
    /// A name already claimed by another record yields a uniqueness
    /// [`CertError::Validation`]; nothing is written in that case.
    pub fn create(&self, record: &CertificationRecord) -> Result<CertificationRecord, CertError> {
        let json = serde_json::to_vec(record)?;
        let mut txn = self.env.begin_rw_txn()?;

        match txn.put(self.names, &record.name, &record.id, WriteFlags::NO_OVERWRITE) {
            Ok(()) => {}
            Err(lmdb::Error::KeyExist) => {
                debug!("Rejected duplicate certification name '{}'", record.name);
                return Err(FieldError::duplicate_name(&record.name).into());
            }
            Err(e) => return Err(e.into()),
        }
        txn.put(self.records, &record.id, &json, WriteFlags::NO_OVERWRITE)?;
        txn.commit()?;

        Ok(record.clone())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<CertificationRecord>, CertError> {
        let txn = self.env.begin_ro_txn()?;
        match txn.get(self.records, &id) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Id of the record currently holding `name`, if any.
    pub fn find_id_by_name(&self, name: &str) -> Result<Option<String>, CertError> {
        let txn = self.env.begin_ro_txn()?;
        match txn.get(self.names, &name) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(bytes).into_owned())),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every committed record.
    ///
    /// # Errors
    ///
    /// A stored value that no longer parses as a record fails the whole read
    /// with [`CertError::Serialization`], so the list never disagrees with
    /// [`CertDbState::count`].
    pub fn get_all(&self) -> Result<Vec<CertificationRecord>, CertError> {
        let txn = self.env.begin_ro_txn()?;
        let mut cursor = txn.open_ro_cursor(self.records)?;

        let mut records = Vec::new();
        for (key, value) in cursor.iter() {
            let record = serde_json::from_slice::<CertificationRecord>(value).map_err(|e| {
                warn!("Unreadable record {}: {e}", String::from_utf8_lossy(key));
                e
            })?;
            records.push(record);
        }

        Ok(records)
    }

    pub fn count(&self) -> Result<usize, CertError> {
        let txn = self.env.begin_ro_txn()?;
        let mut cursor = txn.open_ro_cursor(self.records)?;
        Ok(cursor.iter().count())
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, id: &str, bytes: &[u8]) -> Result<(), CertError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.records, &id, &bytes, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    /// Replaces a committed record, moving its name claim when renamed.
    ///
    /// Returns `Ok(None)` if no record has `record.id`.
    pub fn update(&self, record: &CertificationRecord) -> Result<Option<CertificationRecord>, CertError> {
        let json = serde_json::to_vec(record)?;
        let mut txn = self.env.begin_rw_txn()?;

        let existing: CertificationRecord = match txn.get(self.records, &record.id) {
            Ok(bytes) => serde_json::from_slice(bytes)?,
            Err(lmdb::Error::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if existing.name != record.name {
            match txn.put(self.names, &record.name, &record.id, WriteFlags::NO_OVERWRITE) {
                Ok(()) => {}
                Err(lmdb::Error::KeyExist) => {
                    return Err(FieldError::duplicate_name(&record.name).into());
                }
                Err(e) => return Err(e.into()),
            }
            txn.del(self.names, &existing.name, None)?;
        }

        txn.put(self.records, &record.id, &json, WriteFlags::empty())?;
        txn.commit()?;

        Ok(Some(record.clone()))
    }

    /// Removes a record and releases its name. Returns whether it existed.
    pub fn delete_by_id(&self, id: &str) -> Result<bool, CertError> {
        let mut txn = self.env.begin_rw_txn()?;

        let existing: CertificationRecord = match txn.get(self.records, &id) {
            Ok(bytes) => serde_json::from_slice(bytes)?,
            Err(lmdb::Error::NotFound) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        txn.del(self.records, &id, None)?;
        match txn.del(self.names, &existing.name, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;

        Ok(true)
    }

    pub fn clear_all_records(&self) -> Result<(), CertError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.clear_db(self.records)?;
        txn.clear_db(self.names)?;
        txn.commit()?;
        info!("Cleared all certifications in {}", self.path.display());
        Ok(())
    }

    /// Flushes and releases the environment.
    pub fn close(self) -> Result<(), CertError> {
        self.env.sync(true)?;
        info!("Closed certification store at {}", self.path.display());
        Ok(())
    }
}

fn unavailable(dir: &std::path::Path, err: lmdb::Error) -> CertError {
    warn!("Failed to open LMDB environment at {}: {err}", dir.display());
    CertError::StorageUnavailable(format!("{}: {err}", dir.display()))
}
