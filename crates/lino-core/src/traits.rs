// crates/lino-core/src/traits.rs
//
// Storage interface for the Lino ledger core.
//
// The core sees the committed state as an opaque ordered byte map. Whatever
// commits it (Merkle store, RocksDB, memory) lives behind `KvStore`.

use crate::error::LinoError;

/// Ordered key-value store holding one module's committed state.
///
/// All methods are synchronous; state transitions run on a single thread in
/// block order.
pub trait KvStore {
    /// Read the value at `key`, or `None` if absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LinoError>;

    /// Write `value` at `key`, replacing any previous value.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), LinoError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), LinoError>;

    /// Every `(key, value)` whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LinoError>;

    /// Whether `key` currently holds a value.
    fn has(&self, key: &[u8]) -> Result<bool, LinoError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LinoError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), LinoError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), LinoError> {
        (**self).delete(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LinoError> {
        (**self).prefix_scan(prefix)
    }
}
