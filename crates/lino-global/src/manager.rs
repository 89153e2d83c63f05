// crates/lino-global/src/manager.rs
//
// GlobalManager: genesis, the block clock, and the time-keyed event scheduler.
//
// Events registered during a block go to the context's event cache and reach
// their buckets when `commit_event_cache` runs (end of block, and before any
// bucket is drained). Draining executes every bucket in
// `[last_block_time, block_time)`, each event inside its own cache store so a
// failing event leaves no partial writes and does not stop its siblings.

use lino_core::coin::Coin;
use lino_core::error::LinoError;
use lino_core::event::{Event, TimeEventList};
use lino_core::time::{
    day_index, minute_index, MINUTES_PER_DAY, MINUTES_PER_HOUR, MINUTES_PER_MONTH,
    MINUTES_PER_YEAR, SECONDS_PER_DAY,
};
use lino_store::CacheStore;

use crate::context::Context;
use crate::executor::EventExecutor;
use crate::model::{
    ConsumptionMeta, EventError, GlobalMeta, GlobalTime, InflationPool, LinoStakeStat, Tps,
};
use crate::param::ParamHolder;
use crate::storage::GlobalStorage;

/// Fixed param-change delay used by blocks below the legacy cutover height.
pub const LEGACY_PARAM_CHANGE_DELAY_SEC: i64 = 3600;

/// Gaps longer than this are drained by scanning stored buckets instead of
/// probing every second.
const BUCKET_SCAN_THRESHOLD_SEC: i64 = SECONDS_PER_DAY;

/// Calendar boundary crossed during `on_begin_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicEvent {
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

/// Outcome of draining due event buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub buckets: usize,
    pub executed: usize,
    pub failed: usize,
}

/// Orchestrates the global economic state and the deferred event queue.
#[derive(Debug, Clone, Default)]
pub struct GlobalManager {
    pub(crate) storage: GlobalStorage,
    pub(crate) params: ParamHolder,
    legacy_param_change_height: Option<i64>,
}

impl GlobalManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks below `height` schedule param changes with the legacy fixed delay.
    pub fn with_legacy_param_change_height(mut self, height: i64) -> Self {
        self.legacy_param_change_height = Some(height);
        self
    }

    pub fn params(&self) -> &ParamHolder {
        &self.params
    }

    pub fn storage(&self) -> &GlobalStorage {
        &self.storage
    }

    /// Write the genesis records. The parameter set must already be initialized.
    ///
    /// # Arguments
    /// * `total_lino` - Genesis money supply; also the first year's inflation base.
    pub fn init_global_manager(&self, ctx: &mut Context<'_>, total_lino: Coin) -> Result<(), LinoError> {
        if total_lino.is_negative() {
            return Err(LinoError::NegativeCoin(format!("genesis supply {}", total_lino)));
        }
        let init = self.params.get_global_init_params(ctx.store())?;
        let store = ctx.store_mut();
        self.storage.set_global_meta(
            store,
            &GlobalMeta {
                total_lino_coin: total_lino,
                last_year_total_lino_coin: total_lino,
                cumulative_consumption: Coin::zero(),
                last_year_cumulative_consumption: Coin::zero(),
            },
        )?;
        self.storage.set_consumption_meta(
            store,
            &ConsumptionMeta {
                consumption_friction_rate: init.consumption_friction_rate,
                consumption_window: Coin::zero(),
                consumption_reward_pool: Coin::zero(),
                consumption_freezing_period_sec: init.consumption_freezing_period_sec,
            },
        )?;
        self.storage.set_inflation_pool(store, &InflationPool::default())?;
        self.storage.set_tps(
            store,
            &Tps {
                current_tps: Default::default(),
                max_tps: init.max_tps,
            },
        )?;
        self.storage.set_global_time(store, &GlobalTime::default())?;
        self.storage.set_lino_stake_stat(store, 0, &LinoStakeStat::default())?;
        tracing::info!("Global state initialized with total supply {}", total_lino);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Event scheduling
    // -----------------------------------------------------------------

    /// Schedule `event` for `unix_time`.
    ///
    /// # Errors
    /// `ExpiredEvent` if `unix_time` is before the current block time.
    pub fn register_event_at_time(
        &self,
        ctx: &mut Context<'_>,
        unix_time: i64,
        event: Event,
    ) -> Result<(), LinoError> {
        let block_time = ctx.block_time();
        if unix_time < block_time {
            return Err(LinoError::ExpiredEvent {
                time: unix_time,
                block_time,
            });
        }
        tracing::debug!("Registered {} event at {}", event.kind(), unix_time);
        ctx.event_cache_mut().push(unix_time, event);
        Ok(())
    }

    /// Append every cached registration to its bucket, in ascending time order.
    pub fn commit_event_cache(&self, ctx: &mut Context<'_>) -> Result<(), LinoError> {
        let cached: Vec<(i64, Vec<Event>)> = ctx.event_cache_mut().drain().collect();
        for (time, events) in cached {
            let mut list = match self.storage.get_time_event_list(ctx.store(), time) {
                Ok(list) => list,
                Err(LinoError::NotFound(_)) => TimeEventList::default(),
                Err(e) => return Err(e),
            };
            list.events.extend(events);
            self.storage.set_time_event_list(ctx.store_mut(), time, &list)?;
        }
        Ok(())
    }

    /// Stored and still-cached events for `unix_time`; `None` if there are none.
    pub fn get_time_event_list_at_time(
        &self,
        ctx: &Context<'_>,
        unix_time: i64,
    ) -> Result<Option<TimeEventList>, LinoError> {
        let mut list = match self.storage.get_time_event_list(ctx.store(), unix_time) {
            Ok(list) => list,
            Err(LinoError::NotFound(_)) => TimeEventList::default(),
            Err(e) => return Err(e),
        };
        list.events
            .extend(ctx.event_cache().events_at(unix_time).iter().cloned());
        if list.is_empty() {
            return Ok(None);
        }
        Ok(Some(list))
    }

    /// Drop the bucket at `unix_time`, stored or cached. Absent buckets are fine.
    pub fn remove_time_event_list(&self, ctx: &mut Context<'_>, unix_time: i64) -> Result<(), LinoError> {
        ctx.event_cache_mut().remove(unix_time);
        self.storage.remove_time_event_list(ctx.store_mut(), unix_time)
    }

    /// Schedule `events[i]` at `now + interval_sec * (i + 1)` for `i` in `0..times`.
    pub fn register_coin_return_event(
        &self,
        ctx: &mut Context<'_>,
        events: &[Event],
        times: i64,
        interval_sec: i64,
    ) -> Result<(), LinoError> {
        if times < 0 || events.len() < times as usize {
            return Err(LinoError::InvalidState(format!(
                "{} coin return events for {} instalments",
                events.len(),
                times
            )));
        }
        if interval_sec <= 0 {
            return Err(LinoError::InvalidParam(format!(
                "coin return interval {}s",
                interval_sec
            )));
        }
        let now = ctx.block_time();
        let due = (1..=times)
            .map(|i| {
                interval_sec
                    .checked_mul(i)
                    .ok_or_else(|| LinoError::Overflow(format!("{}s * {}", interval_sec, i)))
                    .and_then(|offset| offset_time(now, offset))
            })
            .collect::<Result<Vec<i64>, LinoError>>()?;
        for (at, event) in due.into_iter().zip(events) {
            self.register_event_at_time(ctx, at, event.clone())?;
        }
        Ok(())
    }

    /// Schedule a parameter change `delay_sec` from now.
    pub fn register_param_change_event(
        &self,
        ctx: &mut Context<'_>,
        event: Event,
        delay_sec: i64,
    ) -> Result<(), LinoError> {
        let at = offset_time(ctx.block_time(), delay_sec)?;
        self.register_event_at_time(ctx, at, event)
    }

    /// Schedule the end of a proposal's voting window.
    pub fn register_proposal_decide_event(
        &self,
        ctx: &mut Context<'_>,
        decide_sec: i64,
        event: Event,
    ) -> Result<(), LinoError> {
        let at = offset_time(ctx.block_time(), decide_sec)?;
        self.register_event_at_time(ctx, at, event)
    }

    /// Delay between acceptance and application of a parameter change at this height.
    pub fn param_change_delay(&self, ctx: &Context<'_>) -> Result<i64, LinoError> {
        if let Some(cutover) = self.legacy_param_change_height {
            if ctx.block_height() < cutover {
                return Ok(LEGACY_PARAM_CHANGE_DELAY_SEC);
            }
        }
        Ok(self.params.get_proposal_param(ctx.store())?.change_param_execution_sec)
    }

    /// Run every bucket that came due since the previous block, then delete it.
    ///
    /// Event failures are logged and recorded as `EventError`s. Only storage
    /// or decoding failures are returned.
    pub fn execute_events(
        &self,
        ctx: &mut Context<'_>,
        executor: &mut dyn EventExecutor,
    ) -> Result<ExecutionSummary, LinoError> {
        self.commit_event_cache(ctx)?;
        let start = self.storage.get_global_time(ctx.store())?.last_block_time;
        let end = ctx.block_time();
        let mut summary = ExecutionSummary::default();
        if end <= start {
            return Ok(summary);
        }

        let due: Vec<(i64, TimeEventList)> = if end - start > BUCKET_SCAN_THRESHOLD_SEC {
            self.storage
                .time_event_lists(ctx.store())?
                .into_iter()
                .filter(|(t, _)| *t >= start && *t < end)
                .collect()
        } else {
            let mut found = Vec::new();
            for t in start..end {
                match self.storage.get_time_event_list(ctx.store(), t) {
                    Ok(list) => found.push((t, list)),
                    Err(LinoError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
            found
        };

        for (time, list) in due {
            tracing::debug!("Executing {} events due at {}", list.len(), time);
            summary.buckets += 1;
            for event in &list.events {
                if self.execute_event(ctx, time, event, executor)? {
                    summary.executed += 1;
                } else {
                    summary.failed += 1;
                }
            }
            self.storage.remove_time_event_list(ctx.store_mut(), time)?;
        }
        Ok(summary)
    }

    /// Execute one event in isolation. Returns whether it succeeded.
    fn execute_event(
        &self,
        ctx: &mut Context<'_>,
        time: i64,
        event: &Event,
        executor: &mut dyn EventExecutor,
    ) -> Result<bool, LinoError> {
        let header = ctx.header();
        let mut cache = CacheStore::new(ctx.store_mut());
        let (result, spawned) = {
            let mut sub = Context::new(&mut cache, header);
            let result = executor.execute(&mut sub, event);
            (result, sub.into_event_cache())
        };
        match result {
            Ok(()) => {
                cache.write()?;
                ctx.event_cache_mut().merge(spawned);
                Ok(true)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                cache.discard();
                tracing::warn!("{} event due at {} failed: {}", event.kind(), time, e);
                let mut errors = self.storage.get_event_errors(ctx.store())?;
                errors.push(EventError {
                    time,
                    event: event.clone(),
                    error: e.to_string(),
                });
                self.storage.set_event_errors(ctx.store_mut(), &errors)?;
                Ok(false)
            }
        }
    }

    pub fn get_event_errors(&self, ctx: &Context<'_>) -> Result<Vec<EventError>, LinoError> {
        self.storage.get_event_errors(ctx.store())
    }

    // -----------------------------------------------------------------
    // Block clock
    // -----------------------------------------------------------------

    /// Advance the block clock and run every calendar hook crossed since the
    /// previous block. Returns the boundaries crossed, in order.
    pub fn on_begin_block(&self, ctx: &mut Context<'_>) -> Result<Vec<PeriodicEvent>, LinoError> {
        let now = ctx.block_time();
        let mut time = self.storage.get_global_time(ctx.store())?;
        if time.chain_start_time == 0 {
            time.chain_start_time = now;
            time.last_block_time = now;
            self.storage.set_global_time(ctx.store_mut(), &time)?;
            tracing::info!("Chain started at {}", now);
        }

        let now_minutes = minute_index(now, time.chain_start_time);
        let mut fired = Vec::new();
        for minute in (time.past_minutes + 1)..=now_minutes {
            self.run_periodic_at(ctx, minute, &mut fired)?;
        }
        if now_minutes > time.past_minutes {
            time.past_minutes = now_minutes;
            self.storage.set_global_time(ctx.store_mut(), &time)?;
        }
        Ok(fired)
    }

    fn run_periodic_at(
        &self,
        ctx: &mut Context<'_>,
        minute: i64,
        fired: &mut Vec<PeriodicEvent>,
    ) -> Result<(), LinoError> {
        if minute % MINUTES_PER_HOUR == 0 {
            self.distribute_hourly_inflation(ctx)?;
            fired.push(PeriodicEvent::Hourly);
        }
        if minute % MINUTES_PER_DAY == 0 {
            self.record_consumption_and_lino_stake_for_day(ctx, minute / MINUTES_PER_DAY)?;
            fired.push(PeriodicEvent::Daily);
        }
        if minute % MINUTES_PER_MONTH == 0 {
            fired.push(PeriodicEvent::Monthly);
        }
        if minute % MINUTES_PER_YEAR == 0 {
            self.set_total_lino_and_recalculate_growth_rate(ctx)?;
            fired.push(PeriodicEvent::Yearly);
        }
        Ok(())
    }

    /// Commit the block's event registrations and record its time.
    pub fn on_end_block(&self, ctx: &mut Context<'_>) -> Result<(), LinoError> {
        self.commit_event_cache(ctx)?;
        let mut time = self.storage.get_global_time(ctx.store())?;
        time.last_block_time = ctx.block_time();
        self.storage.set_global_time(ctx.store_mut(), &time)
    }

    pub fn get_last_block_time(&self, ctx: &Context<'_>) -> Result<i64, LinoError> {
        Ok(self.storage.get_global_time(ctx.store())?.last_block_time)
    }

    pub fn get_chain_start_time(&self, ctx: &Context<'_>) -> Result<i64, LinoError> {
        Ok(self.storage.get_global_time(ctx.store())?.chain_start_time)
    }

    /// Day index of `unix_time` relative to chain start.
    pub fn get_past_day(&self, ctx: &Context<'_>, unix_time: i64) -> Result<i64, LinoError> {
        let start = self.storage.get_global_time(ctx.store())?.chain_start_time;
        Ok(day_index(unix_time, start))
    }
}

/// `base + offset_sec`, or `Overflow` past the end of the clock.
pub(crate) fn offset_time(base: i64, offset_sec: i64) -> Result<i64, LinoError> {
    base.checked_add(offset_sec)
        .ok_or_else(|| LinoError::Overflow(format!("time {} + {}s", base, offset_sec)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{coin_return, genesis, RecordingExecutor};
    use lino_core::time::BlockHeader;
    use lino_store::MemStore;

    const BASE: i64 = 1_600_000_000;

    #[test]
    fn test_register_rejects_past_time() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE + 100, 0));
        let res = gm.register_event_at_time(&mut ctx, BASE + 99, coin_return("a", 1));
        assert!(matches!(res, Err(LinoError::ExpiredEvent { time, .. }) if time == BASE + 99));
        assert!(gm.get_time_event_list_at_time(&ctx, BASE + 99).unwrap().is_none());

        // the current second is still allowed
        gm.register_event_at_time(&mut ctx, BASE + 100, coin_return("a", 1))
            .unwrap();
    }

    #[test]
    fn test_cache_visible_before_commit() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        gm.register_event_at_time(&mut ctx, BASE + 10, coin_return("a", 1))
            .unwrap();
        gm.register_event_at_time(&mut ctx, BASE + 10, coin_return("b", 2))
            .unwrap();
        let list = gm.get_time_event_list_at_time(&ctx, BASE + 10).unwrap().unwrap();
        assert_eq!(list.events, vec![coin_return("a", 1), coin_return("b", 2)]);
        assert!(gm.storage.get_time_event_list(ctx.store(), BASE + 10).is_err());

        gm.commit_event_cache(&mut ctx).unwrap();
        assert!(ctx.event_cache().is_empty());
        let stored = gm.storage.get_time_event_list(ctx.store(), BASE + 10).unwrap();
        assert_eq!(stored.events, list.events);
    }

    #[test]
    fn test_commit_appends_to_existing_bucket() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        gm.register_event_at_time(&mut ctx, BASE + 5, coin_return("a", 1))
            .unwrap();
        gm.commit_event_cache(&mut ctx).unwrap();
        gm.register_event_at_time(&mut ctx, BASE + 5, coin_return("b", 1))
            .unwrap();
        gm.commit_event_cache(&mut ctx).unwrap();
        let list = gm.get_time_event_list_at_time(&ctx, BASE + 5).unwrap().unwrap();
        assert_eq!(list.events, vec![coin_return("a", 1), coin_return("b", 1)]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        gm.remove_time_event_list(&mut ctx, BASE + 7).unwrap();
        assert!(gm.get_time_event_list_at_time(&ctx, BASE + 7).unwrap().is_none());

        gm.register_event_at_time(&mut ctx, BASE + 7, coin_return("a", 1))
            .unwrap();
        gm.commit_event_cache(&mut ctx).unwrap();
        gm.register_event_at_time(&mut ctx, BASE + 7, coin_return("b", 1))
            .unwrap();
        gm.remove_time_event_list(&mut ctx, BASE + 7).unwrap();
        gm.remove_time_event_list(&mut ctx, BASE + 7).unwrap();
        assert!(gm.get_time_event_list_at_time(&ctx, BASE + 7).unwrap().is_none());
    }

    #[test]
    fn test_coin_return_schedule() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        let events: Vec<Event> = (0..5).map(|i| coin_return("u", i)).collect();
        let hour = 3600;
        gm.register_coin_return_event(&mut ctx, &events, 5, 10 * hour)
            .unwrap();
        gm.commit_event_cache(&mut ctx).unwrap();

        assert!(gm.get_time_event_list_at_time(&ctx, BASE).unwrap().is_none());
        for (i, event) in events.iter().enumerate() {
            let at = BASE + 10 * hour * (i as i64 + 1);
            let list = gm.get_time_event_list_at_time(&ctx, at).unwrap().unwrap();
            assert_eq!(list.events, vec![event.clone()]);
        }
    }

    #[test]
    fn test_coin_return_needs_enough_events() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        let events = vec![coin_return("u", 1)];
        assert!(gm.register_coin_return_event(&mut ctx, &events, 2, 60).is_err());
        assert!(gm.register_coin_return_event(&mut ctx, &events, 1, 0).is_err());
        assert!(ctx.event_cache().is_empty());
    }

    #[test]
    fn test_coin_return_overflow_schedules_nothing() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        let events: Vec<Event> = (0..3).map(|i| coin_return("u", i)).collect();

        // third instalment offset overflows; the first two are valid
        let res = gm.register_coin_return_event(&mut ctx, &events, 3, i64::MAX / 3 + 1);
        assert!(matches!(res, Err(LinoError::Overflow(_))));
        assert!(ctx.event_cache().is_empty());

        // second instalment time overflows
        let res = gm.register_coin_return_event(&mut ctx, &events, 2, i64::MAX / 2);
        assert!(matches!(res, Err(LinoError::Overflow(_))));
        assert!(ctx.event_cache().is_empty());
    }

    #[test]
    fn test_far_future_delays_overflow() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        let res = gm.register_param_change_event(&mut ctx, coin_return("u", 1), i64::MAX);
        assert!(matches!(res, Err(LinoError::Overflow(_))));
        let res = gm.register_proposal_decide_event(&mut ctx, i64::MAX, coin_return("u", 1));
        assert!(matches!(res, Err(LinoError::Overflow(_))));
        assert!(ctx.event_cache().is_empty());

        assert_eq!(offset_time(BASE, 60).unwrap(), BASE + 60);
    }

    #[test]
    fn test_param_change_delay_cutover() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE).with_legacy_param_change_height(100);
        {
            let ctx = Context::new(&mut store, BlockHeader::new(99, BASE, 0));
            assert_eq!(gm.param_change_delay(&ctx).unwrap(), LEGACY_PARAM_CHANGE_DELAY_SEC);
        }
        let ctx = Context::new(&mut store, BlockHeader::new(100, BASE, 0));
        assert_eq!(gm.param_change_delay(&ctx).unwrap(), SECONDS_PER_DAY);
    }

    #[test]
    fn test_execute_events_runs_window_in_order() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        {
            let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
            gm.register_event_at_time(&mut ctx, BASE, coin_return("now", 1))
                .unwrap();
            gm.register_event_at_time(&mut ctx, BASE + 3, coin_return("b", 1))
                .unwrap();
            gm.register_event_at_time(&mut ctx, BASE + 1, coin_return("a", 1))
                .unwrap();
            gm.register_event_at_time(&mut ctx, BASE + 5, coin_return("later", 1))
                .unwrap();
            gm.on_end_block(&mut ctx).unwrap();
        }

        let mut exec = RecordingExecutor::default();
        let mut ctx = Context::new(&mut store, BlockHeader::new(3, BASE + 5, 0));
        let summary = gm.execute_events(&mut ctx, &mut exec).unwrap();
        assert_eq!(summary.buckets, 3);
        assert_eq!(summary.executed, 3);
        assert_eq!(exec.seen, vec!["now", "a", "b"]);
        assert!(gm.get_time_event_list_at_time(&ctx, BASE + 1).unwrap().is_none());
        assert!(gm.get_time_event_list_at_time(&ctx, BASE + 5).unwrap().is_some());
    }

    #[test]
    fn test_failed_event_does_not_stop_siblings() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        {
            let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
            gm.register_event_at_time(&mut ctx, BASE + 1, coin_return("ok1", 1))
                .unwrap();
            gm.register_event_at_time(&mut ctx, BASE + 1, coin_return("fail", 1))
                .unwrap();
            gm.register_event_at_time(&mut ctx, BASE + 1, coin_return("ok2", 1))
                .unwrap();
            gm.on_end_block(&mut ctx).unwrap();
        }

        let mut exec = RecordingExecutor::default();
        let mut ctx = Context::new(&mut store, BlockHeader::new(3, BASE + 2, 0));
        let summary = gm.execute_events(&mut ctx, &mut exec).unwrap();
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(exec.seen, vec!["ok1", "fail", "ok2"]);

        // the failing event's write was rolled back, the others kept theirs
        assert!(ctx.store().get(b"mark/ok1").unwrap().is_some());
        assert!(ctx.store().get(b"mark/fail").unwrap().is_none());
        assert!(ctx.store().get(b"mark/ok2").unwrap().is_some());

        let errors = gm.get_event_errors(&ctx).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].time, BASE + 1);
        assert_eq!(errors[0].event, coin_return("fail", 1));
        assert!(gm.get_time_event_list_at_time(&ctx, BASE + 1).unwrap().is_none());
    }

    #[test]
    fn test_events_spawned_during_execution_are_cached() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        {
            let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
            gm.register_event_at_time(&mut ctx, BASE + 1, coin_return("spawn", 1))
                .unwrap();
            gm.on_end_block(&mut ctx).unwrap();
        }
        let mut exec = RecordingExecutor::default();
        let mut ctx = Context::new(&mut store, BlockHeader::new(3, BASE + 2, 0));
        gm.execute_events(&mut ctx, &mut exec).unwrap();
        assert_eq!(ctx.event_cache().events_at(BASE + 2 + 60).len(), 1);
    }

    #[test]
    fn test_long_gap_drains_by_scan() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        {
            let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
            gm.register_event_at_time(&mut ctx, BASE + 10, coin_return("a", 1))
                .unwrap();
            gm.register_event_at_time(&mut ctx, BASE + 3 * SECONDS_PER_DAY, coin_return("b", 1))
                .unwrap();
            gm.on_end_block(&mut ctx).unwrap();
        }
        let mut exec = RecordingExecutor::default();
        let mut ctx = Context::new(
            &mut store,
            BlockHeader::new(3, BASE + 2 * SECONDS_PER_DAY, 0),
        );
        let summary = gm.execute_events(&mut ctx, &mut exec).unwrap();
        assert_eq!(summary.executed, 1);
        assert_eq!(exec.seen, vec!["a"]);
    }

    #[test]
    fn test_begin_block_sets_chain_start_and_fires_hourly() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, 0);
        {
            let mut ctx = Context::new(&mut store, BlockHeader::new(1, BASE, 0));
            assert!(gm.on_begin_block(&mut ctx).unwrap().is_empty());
            assert_eq!(gm.get_chain_start_time(&ctx).unwrap(), BASE);
            assert_eq!(gm.get_last_block_time(&ctx).unwrap(), BASE);
            gm.on_end_block(&mut ctx).unwrap();
        }
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, BASE + 3600, 0));
        let fired = gm.on_begin_block(&mut ctx).unwrap();
        assert_eq!(fired, vec![PeriodicEvent::Hourly]);
        // second call in the same block fires nothing
        assert!(gm.on_begin_block(&mut ctx).unwrap().is_empty());
    }

    #[test]
    fn test_begin_block_fires_daily_over_gap() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, 0);
        {
            let mut ctx = Context::new(&mut store, BlockHeader::new(1, BASE, 0));
            gm.on_begin_block(&mut ctx).unwrap();
            gm.on_end_block(&mut ctx).unwrap();
        }
        let mut ctx = Context::new(
            &mut store,
            BlockHeader::new(2, BASE + 2 * SECONDS_PER_DAY, 0),
        );
        let fired = gm.on_begin_block(&mut ctx).unwrap();
        let daily = fired.iter().filter(|e| **e == PeriodicEvent::Daily).count();
        let hourly = fired.iter().filter(|e| **e == PeriodicEvent::Hourly).count();
        assert_eq!(daily, 2);
        assert_eq!(hourly, 48);
        assert_eq!(gm.get_past_day(&ctx, ctx.block_time()).unwrap(), 2);
    }

    #[test]
    fn test_get_past_day() {
        let mut store = MemStore::new();
        let gm = genesis(&mut store, BASE);
        let ctx = Context::new(&mut store, BlockHeader::new(2, BASE, 0));
        assert_eq!(gm.get_past_day(&ctx, BASE - 10).unwrap(), 0);
        assert_eq!(gm.get_past_day(&ctx, BASE + SECONDS_PER_DAY).unwrap(), 1);
    }
}
