// crates/lino-store/src/lib.rs
//
// lino-store: Storage backends for the Lino ledger core.
//
// Provides an ordered in-memory store (tests and the simulated node), a
// write-buffering cache that runs one deferred event in isolation, and a
// RocksDB-backed store behind the `rocksdb` feature.

pub mod cache;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use cache::CacheStore;
pub use memory::MemStore;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksStore;
