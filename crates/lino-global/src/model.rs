// crates/lino-global/src/model.rs
//
// Records persisted by the global economic store.

use serde::{Deserialize, Serialize};

use lino_core::coin::Coin;
use lino_core::dec::Dec;
use lino_core::event::Event;

/// Money supply and consumption totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMeta {
    pub total_lino_coin: Coin,
    /// Total supply snapshotted at the last annual boundary; base of hourly inflation.
    pub last_year_total_lino_coin: Coin,
    pub cumulative_consumption: Coin,
    pub last_year_cumulative_consumption: Coin,
}

/// Content reward pool and the window of donations still waiting to claim from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionMeta {
    pub consumption_friction_rate: Dec,
    pub consumption_window: Coin,
    pub consumption_reward_pool: Coin,
    pub consumption_freezing_period_sec: i64,
}

/// Inflation accumulated for the non-content beneficiaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationPool {
    pub infra_inflation_pool: Coin,
    pub developer_inflation_pool: Coin,
    pub validator_inflation_pool: Coin,
}

/// Throughput gauge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tps {
    pub current_tps: Dec,
    pub max_tps: Dec,
}

/// One day's stake and the friction owed to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinoStakeStat {
    pub total_consumption_friction: Coin,
    pub unclaimed_friction: Coin,
    pub total_lino_stake: Coin,
    pub unclaimed_lino_stake: Coin,
}

/// Block clock of the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTime {
    /// Time of the first block; zero until that block begins.
    pub chain_start_time: i64,
    pub last_block_time: i64,
    /// Whole minutes since chain start already processed by the periodic hooks.
    pub past_minutes: i64,
}

/// A deferred event whose execution failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventError {
    /// Bucket time the event was scheduled for.
    pub time: i64,
    pub event: Event,
    pub error: String,
}
