// crates/lino-global/src/lib.rs
//
// lino-global: Global economic state and time-keyed event scheduler for the
// Lino ledger.
//
// `GlobalManager` owns the money supply, the content reward window, the
// inflation pools, per-day stake statistics and TPS, and schedules deferred
// events in per-second buckets that are drained once per block through an
// `EventExecutor`.

pub mod context;
pub mod executor;
pub mod export;
mod inflation;
pub mod manager;
pub mod model;
pub mod param;
pub mod storage;

#[cfg(test)]
mod testutil;

// Re-export key types for ergonomic access from downstream crates.
pub use context::{Context, EventCache};
pub use executor::{
    AccountKeeper, EventExecutor, GlobalEventExecutor, NoPenalty, PenaltyScorer, ProposalKeeper,
};
pub use export::GlobalTables;
pub use manager::{ExecutionSummary, GlobalManager, PeriodicEvent, LEGACY_PARAM_CHANGE_DELAY_SEC};
pub use model::{
    ConsumptionMeta, EventError, GlobalMeta, GlobalTime, InflationPool, LinoStakeStat, Tps,
};
pub use param::ParamHolder;
pub use storage::GlobalStorage;
