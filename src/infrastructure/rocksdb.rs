use crate::domain::ports::ProfileMedium;
use crate::error::{FlowError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding serialized payer profiles.
pub const CF_PROFILES: &str = "profiles";

/// A persistent profile medium backed by RocksDB.
///
/// Profiles live in their own column family, keyed by the lowercased email.
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbProfileMedium {
    db: Arc<DB>,
}

impl RocksDbProfileMedium {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "profiles" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_profiles = ColumnFamilyDescriptor::new(CF_PROFILES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_profiles])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn profiles(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PROFILES).ok_or_else(|| {
            FlowError::InternalError(Box::new(std::io::Error::other(
                "Profiles column family not found",
            )))
        })
    }
}

#[async_trait]
impl ProfileMedium for RocksDbProfileMedium {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.profiles()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let cf = self.profiles()?;
        self.db.put_cf(cf, key.as_bytes(), value)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let cf = self.profiles()?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }
}
