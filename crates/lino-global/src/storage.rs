// crates/lino-global/src/storage.rs
//
// Persistent layout of the global module.
//
// Key format (all under the `global/` namespace):
//   - 0x01 + decimal unix time  -> TimeEventList
//   - 0x02                      -> GlobalTime
//   - 0x03                      -> GlobalMeta
//   - 0x04                      -> Vec<EventError>
//   - 0x05                      -> InflationPool
//   - 0x07                      -> ConsumptionMeta
//   - 0x08                      -> Tps
//   - 0x09 + decimal day index  -> LinoStakeStat
//
// Values are JSON. Time-event keys and stake-stat keys live under different
// sub-store bytes so the two time granularities never collide.

use serde::de::DeserializeOwned;
use serde::Serialize;

use lino_core::error::LinoError;
use lino_core::event::TimeEventList;
use lino_core::time::timestamp_key;
use lino_core::traits::KvStore;

use crate::model::{
    ConsumptionMeta, EventError, GlobalMeta, GlobalTime, InflationPool, LinoStakeStat, Tps,
};

const NAMESPACE: &[u8] = b"global/";

const TIME_EVENT_SUBSTORE: u8 = 0x01;
const GLOBAL_TIME_SUBSTORE: u8 = 0x02;
const GLOBAL_META_SUBSTORE: u8 = 0x03;
const EVENT_ERROR_SUBSTORE: u8 = 0x04;
const INFLATION_POOL_SUBSTORE: u8 = 0x05;
pub(crate) const CONSUMPTION_META_SUBSTORE: u8 = 0x07;
const TPS_SUBSTORE: u8 = 0x08;
const LINO_STAKE_STAT_SUBSTORE: u8 = 0x09;

pub(crate) fn key(substore: u8, suffix: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(NAMESPACE.len() + 1 + suffix.len());
    k.extend_from_slice(NAMESPACE);
    k.push(substore);
    k.extend_from_slice(suffix.as_bytes());
    k
}

fn get_record<T: DeserializeOwned>(store: &dyn KvStore, key: &[u8]) -> Result<Option<T>, LinoError> {
    match store.get(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn set_record<T: Serialize>(store: &mut dyn KvStore, key: &[u8], value: &T) -> Result<(), LinoError> {
    let json = serde_json::to_vec(value)?;
    store.set(key, &json)
}

/// Typed accessors over the global namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalStorage;

impl GlobalStorage {
    pub fn new() -> Self {
        Self
    }

    fn get_required<T: DeserializeOwned>(
        &self,
        store: &dyn KvStore,
        substore: u8,
        what: &str,
    ) -> Result<T, LinoError> {
        get_record(store, &key(substore, ""))?
            .ok_or_else(|| LinoError::Uninitialized(what.to_string()))
    }

    // --- time events ---

    /// Bucket at `unix_time`; `NotFound` when no bucket exists.
    pub fn get_time_event_list(
        &self,
        store: &dyn KvStore,
        unix_time: i64,
    ) -> Result<TimeEventList, LinoError> {
        get_record(store, &key(TIME_EVENT_SUBSTORE, &timestamp_key(unix_time)))?
            .ok_or_else(|| LinoError::NotFound(format!("time event list at {}", unix_time)))
    }

    /// Overwrite the whole bucket at `unix_time`.
    pub fn set_time_event_list(
        &self,
        store: &mut dyn KvStore,
        unix_time: i64,
        list: &TimeEventList,
    ) -> Result<(), LinoError> {
        set_record(store, &key(TIME_EVENT_SUBSTORE, &timestamp_key(unix_time)), list)
    }

    pub fn remove_time_event_list(&self, store: &mut dyn KvStore, unix_time: i64) -> Result<(), LinoError> {
        store.delete(&key(TIME_EVENT_SUBSTORE, &timestamp_key(unix_time)))
    }

    /// Every stored bucket, sorted by numeric time.
    pub fn time_event_lists(&self, store: &dyn KvStore) -> Result<Vec<(i64, TimeEventList)>, LinoError> {
        let prefix = key(TIME_EVENT_SUBSTORE, "");
        let mut out = Vec::new();
        for (k, v) in store.prefix_scan(&prefix)? {
            let time = parse_suffix(&k[prefix.len()..])?;
            out.push((time, serde_json::from_slice(&v)?));
        }
        out.sort_by_key(|(time, _)| *time);
        Ok(out)
    }

    // --- singletons ---

    pub fn get_global_meta(&self, store: &dyn KvStore) -> Result<GlobalMeta, LinoError> {
        self.get_required(store, GLOBAL_META_SUBSTORE, "global meta")
    }

    pub fn set_global_meta(&self, store: &mut dyn KvStore, meta: &GlobalMeta) -> Result<(), LinoError> {
        set_record(store, &key(GLOBAL_META_SUBSTORE, ""), meta)
    }

    pub fn get_consumption_meta(&self, store: &dyn KvStore) -> Result<ConsumptionMeta, LinoError> {
        self.get_required(store, CONSUMPTION_META_SUBSTORE, "consumption meta")
    }

    pub fn set_consumption_meta(
        &self,
        store: &mut dyn KvStore,
        meta: &ConsumptionMeta,
    ) -> Result<(), LinoError> {
        set_record(store, &key(CONSUMPTION_META_SUBSTORE, ""), meta)
    }

    pub fn get_inflation_pool(&self, store: &dyn KvStore) -> Result<InflationPool, LinoError> {
        self.get_required(store, INFLATION_POOL_SUBSTORE, "inflation pool")
    }

    pub fn set_inflation_pool(&self, store: &mut dyn KvStore, pool: &InflationPool) -> Result<(), LinoError> {
        set_record(store, &key(INFLATION_POOL_SUBSTORE, ""), pool)
    }

    pub fn get_tps(&self, store: &dyn KvStore) -> Result<Tps, LinoError> {
        self.get_required(store, TPS_SUBSTORE, "tps")
    }

    pub fn set_tps(&self, store: &mut dyn KvStore, tps: &Tps) -> Result<(), LinoError> {
        set_record(store, &key(TPS_SUBSTORE, ""), tps)
    }

    /// Global time; all zero before the first block.
    pub fn get_global_time(&self, store: &dyn KvStore) -> Result<GlobalTime, LinoError> {
        Ok(get_record(store, &key(GLOBAL_TIME_SUBSTORE, ""))?.unwrap_or_default())
    }

    pub fn set_global_time(&self, store: &mut dyn KvStore, time: &GlobalTime) -> Result<(), LinoError> {
        set_record(store, &key(GLOBAL_TIME_SUBSTORE, ""), time)
    }

    // --- per-day stake statistics ---

    /// Stake stat for `day`; an all-zero record when the day was never written.
    pub fn get_lino_stake_stat(&self, store: &dyn KvStore, day: i64) -> Result<LinoStakeStat, LinoError> {
        Ok(get_record(store, &key(LINO_STAKE_STAT_SUBSTORE, &day.to_string()))?.unwrap_or_default())
    }

    pub fn set_lino_stake_stat(
        &self,
        store: &mut dyn KvStore,
        day: i64,
        stat: &LinoStakeStat,
    ) -> Result<(), LinoError> {
        set_record(store, &key(LINO_STAKE_STAT_SUBSTORE, &day.to_string()), stat)
    }

    /// Every stored stake stat, sorted by day.
    pub fn lino_stake_stats(&self, store: &dyn KvStore) -> Result<Vec<(i64, LinoStakeStat)>, LinoError> {
        let prefix = key(LINO_STAKE_STAT_SUBSTORE, "");
        let mut out = Vec::new();
        for (k, v) in store.prefix_scan(&prefix)? {
            let day = parse_suffix(&k[prefix.len()..])?;
            out.push((day, serde_json::from_slice(&v)?));
        }
        out.sort_by_key(|(day, _)| *day);
        Ok(out)
    }

    // --- event errors ---

    pub fn get_event_errors(&self, store: &dyn KvStore) -> Result<Vec<EventError>, LinoError> {
        Ok(get_record(store, &key(EVENT_ERROR_SUBSTORE, ""))?.unwrap_or_default())
    }

    pub fn set_event_errors(&self, store: &mut dyn KvStore, errors: &[EventError]) -> Result<(), LinoError> {
        set_record(store, &key(EVENT_ERROR_SUBSTORE, ""), &errors)
    }
}

fn parse_suffix(suffix: &[u8]) -> Result<i64, LinoError> {
    std::str::from_utf8(suffix)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| LinoError::Storage(format!("malformed key suffix {:?}", suffix)))
}
