// crates/lino-store/src/rocks.rs
//
// RocksDB-backed persistent key-value store.
//
// Keys and values are stored as-is; the ledger core has already namespaced
// keys and JSON-encoded values before they reach this layer.

use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use lino_core::error::LinoError;
use lino_core::traits::KvStore;

/// RocksDB wrapper implementing `KvStore`.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, LinoError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| LinoError::Storage(format!("Failed to open RocksDB at {}: {}", path, e)))?;

        Ok(Self { db })
    }
}

impl KvStore for RocksStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LinoError> {
        self.db
            .get(key)
            .map_err(|e| LinoError::Storage(format!("RocksDB get failed: {}", e)))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), LinoError> {
        self.db
            .put(key, value)
            .map_err(|e| LinoError::Storage(format!("RocksDB put failed: {}", e)))
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), LinoError> {
        self.db
            .delete(key)
            .map_err(|e| LinoError::Storage(format!("RocksDB delete failed: {}", e)))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LinoError> {
        let mut out = Vec::new();
        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item
                .map_err(|e| LinoError::Storage(format!("RocksDB iteration error: {}", e)))?;
            // Without a prefix extractor the iterator runs past the prefix.
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_db_path(label: &str) -> String {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("lino_test_{}_{}", label, Uuid::now_v7()));
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_rocks_roundtrip_and_scan() {
        let path = temp_db_path("rocks");
        let mut store = RocksStore::open(&path).unwrap();
        store.set(b"g/1", b"one").unwrap();
        store.set(b"g/2", b"two").unwrap();
        store.set(b"h/1", b"other").unwrap();

        assert_eq!(store.get(b"g/1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.prefix_scan(b"g/").unwrap().len(), 2);

        store.delete(b"g/1").unwrap();
        assert_eq!(store.get(b"g/1").unwrap(), None);
        let _ = std::fs::remove_dir_all(&path);
    }
}
