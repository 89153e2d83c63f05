// crates/lino-store/src/cache.rs
//
// Write-buffering overlay over another store.
//
// Reads fall through to the parent; writes and deletes stay in the overlay
// until `write()` flushes them. Dropping the cache discards them, which is
// how a failed deferred event leaves no partial state behind.

use std::collections::BTreeMap;

use lino_core::error::LinoError;
use lino_core::traits::KvStore;

/// Buffered view of a parent store.
pub struct CacheStore<'a> {
    parent: &'a mut dyn KvStore,
    /// `None` marks a pending delete.
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> CacheStore<'a> {
    pub fn new(parent: &'a mut dyn KvStore) -> Self {
        Self {
            parent,
            pending: BTreeMap::new(),
        }
    }

    /// Number of buffered writes and deletes.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush every buffered operation to the parent, in key order.
    pub fn write(self) -> Result<(), LinoError> {
        let CacheStore { parent, pending } = self;
        tracing::trace!("Flushing {} cached writes", pending.len());
        for (key, value) in pending {
            match value {
                Some(v) => parent.set(&key, &v)?,
                None => parent.delete(&key)?,
            }
        }
        Ok(())
    }

    /// Drop every buffered operation.
    pub fn discard(self) {
        tracing::trace!("Discarding {} cached writes", self.pending.len());
    }
}

impl KvStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LinoError> {
        match self.pending.get(key) {
            Some(value) => Ok(value.clone()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), LinoError> {
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), LinoError> {
        self.pending.insert(key.to_vec(), None);
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LinoError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.prefix_scan(prefix)?.into_iter().collect();
        for (key, value) in self
            .pending
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
