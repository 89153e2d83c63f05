// crates/lino-global/src/context.rs
//
// Per-block execution context.
//
// A `Context` owns nothing: it borrows the module's store, carries the block
// header, and accumulates the events registered during the block until the
// end-of-block commit writes them to their buckets.

use std::collections::BTreeMap;

use lino_core::event::Event;
use lino_core::time::BlockHeader;
use lino_core::traits::KvStore;

/// Events registered during the current block, keyed by target time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCache {
    pending: BTreeMap<i64, Vec<Event>>,
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unix_time: i64, event: Event) {
        self.pending.entry(unix_time).or_default().push(event);
    }

    /// Cached events for `unix_time`, in registration order.
    pub fn events_at(&self, unix_time: i64) -> &[Event] {
        self.pending
            .get(&unix_time)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn remove(&mut self, unix_time: i64) -> Option<Vec<Event>> {
        self.pending.remove(&unix_time)
    }

    /// Append everything from `other` after this cache's own events.
    pub fn merge(&mut self, other: EventCache) {
        for (time, events) in other.pending {
            self.pending.entry(time).or_default().extend(events);
        }
    }

    /// Drain all buckets in ascending time order.
    pub fn drain(&mut self) -> impl Iterator<Item = (i64, Vec<Event>)> {
        std::mem::take(&mut self.pending).into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total number of cached events.
    pub fn len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }
}

/// Store handle, block header and in-block event cache for one block.
pub struct Context<'a> {
    store: &'a mut dyn KvStore,
    header: BlockHeader,
    event_cache: EventCache,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a mut dyn KvStore, header: BlockHeader) -> Self {
        Self {
            store,
            header,
            event_cache: EventCache::new(),
        }
    }

    pub fn header(&self) -> BlockHeader {
        self.header
    }

    pub fn block_time(&self) -> i64 {
        self.header.time
    }

    pub fn block_height(&self) -> i64 {
        self.header.height
    }

    pub fn num_txs(&self) -> i64 {
        self.header.num_txs
    }

    pub fn store(&self) -> &dyn KvStore {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut dyn KvStore {
        &mut *self.store
    }

    pub fn event_cache(&self) -> &EventCache {
        &self.event_cache
    }

    pub fn event_cache_mut(&mut self) -> &mut EventCache {
        &mut self.event_cache
    }

    /// Give up the context, returning whatever is still cached.
    pub fn into_event_cache(self) -> EventCache {
        self.event_cache
    }
}
