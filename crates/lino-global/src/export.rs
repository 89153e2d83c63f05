// crates/lino-global/src/export.rs
//
// Whole-module state snapshot for genesis export and import.

use serde::{Deserialize, Serialize};

use lino_core::error::LinoError;
use lino_core::event::TimeEventList;

use crate::context::Context;
use crate::manager::GlobalManager;
use crate::model::{ConsumptionMeta, GlobalMeta, GlobalTime, InflationPool, LinoStakeStat, Tps};

/// Everything the global module persists, in deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTables {
    pub global_meta: GlobalMeta,
    pub consumption_meta: ConsumptionMeta,
    pub inflation_pool: InflationPool,
    pub tps: Tps,
    pub global_time: GlobalTime,
    /// Sorted by day.
    pub stake_stats: Vec<(i64, LinoStakeStat)>,
    /// Sorted by numeric time, not key order.
    pub time_events: Vec<(i64, TimeEventList)>,
}

impl GlobalManager {
    /// Snapshot the module state. Cached registrations are committed first.
    pub fn export_tables(&self, ctx: &mut Context<'_>) -> Result<GlobalTables, LinoError> {
        self.commit_event_cache(ctx)?;
        let store = ctx.store();
        Ok(GlobalTables {
            global_meta: self.storage.get_global_meta(store)?,
            consumption_meta: self.storage.get_consumption_meta(store)?,
            inflation_pool: self.storage.get_inflation_pool(store)?,
            tps: self.storage.get_tps(store)?,
            global_time: self.storage.get_global_time(store)?,
            stake_stats: self.storage.lino_stake_stats(store)?,
            time_events: self.storage.time_event_lists(store)?,
        })
    }

    /// Write a snapshot back, replacing the singleton records and every
    /// listed bucket and stake stat.
    pub fn import_tables(&self, ctx: &mut Context<'_>, tables: &GlobalTables) -> Result<(), LinoError> {
        let store = ctx.store_mut();
        self.storage.set_global_meta(store, &tables.global_meta)?;
        self.storage.set_consumption_meta(store, &tables.consumption_meta)?;
        self.storage.set_inflation_pool(store, &tables.inflation_pool)?;
        self.storage.set_tps(store, &tables.tps)?;
        self.storage.set_global_time(store, &tables.global_time)?;
        for (day, stat) in &tables.stake_stats {
            self.storage.set_lino_stake_stat(store, *day, stat)?;
        }
        for (time, list) in &tables.time_events {
            self.storage.set_time_event_list(store, *time, list)?;
        }
        tracing::info!(
            "Imported global state: {} stake stats, {} event buckets",
            tables.stake_stats.len(),
            tables.time_events.len()
        );
        Ok(())
    }
}
