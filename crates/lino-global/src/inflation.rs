// crates/lino-global/src/inflation.rs
//
// Inflation, content reward, stake interest and TPS accounting.
//
// Minting happens in two steps. Hourly distribution moves newly created
// coin into the reward and inflation pools without touching the supply;
// the supply grows only when a pool pays out (reward claims and the
// get-and-reset pool accessors).

use lino_core::coin::Coin;
use lino_core::dec::Dec;
use lino_core::error::LinoError;
use lino_core::event::Event;
use lino_core::time::HOURS_PER_YEAR;

use crate::context::Context;
use crate::manager::{offset_time, GlobalManager};
use crate::model::{ConsumptionMeta, GlobalMeta, InflationPool, LinoStakeStat, Tps};

fn ensure_non_negative(amount: Coin, what: &str) -> Result<(), LinoError> {
    if amount.is_negative() {
        return Err(LinoError::NegativeCoin(format!("{} {}", what, amount)));
    }
    Ok(())
}

impl GlobalManager {
    // -----------------------------------------------------------------
    // Inflation
    // -----------------------------------------------------------------

    /// Mint one hour of inflation into the pools.
    ///
    /// `this_hour = trunc(last_year_total * growth_rate / HOURS_PER_YEAR)`.
    /// The content creator, validator and infra shares are truncated
    /// products of `this_hour`; the developer share is the remainder.
    pub fn distribute_hourly_inflation(&self, ctx: &mut Context<'_>) -> Result<(), LinoError> {
        let meta = self.storage.get_global_meta(ctx.store())?;
        let allocation = self.params.get_global_allocation_param(ctx.store())?;

        let this_hour = Coin::from_dec_truncated(
            meta.last_year_total_lino_coin
                .to_dec()?
                .mul(allocation.global_growth_rate)?
                .quo_int(HOURS_PER_YEAR)?,
        );
        let content_creator = this_hour.mul_dec(allocation.content_creator_allocation)?;
        let validator = this_hour.mul_dec(allocation.validator_allocation)?;
        let infra = this_hour.mul_dec(allocation.infra_allocation)?;
        let developer = this_hour
            .checked_minus(content_creator)
            .and_then(|rest| rest.checked_minus(validator))
            .and_then(|rest| rest.checked_minus(infra))
            .map_err(|_| {
                LinoError::InvalidState(format!(
                    "allocations exceed hourly inflation {}",
                    this_hour
                ))
            })?;

        let mut consumption = self.storage.get_consumption_meta(ctx.store())?;
        consumption.consumption_reward_pool = consumption.consumption_reward_pool + content_creator;
        self.storage.set_consumption_meta(ctx.store_mut(), &consumption)?;

        let mut pool = self.storage.get_inflation_pool(ctx.store())?;
        pool.validator_inflation_pool = pool.validator_inflation_pool + validator;
        pool.infra_inflation_pool = pool.infra_inflation_pool + infra;
        pool.developer_inflation_pool = pool.developer_inflation_pool + developer;
        self.storage.set_inflation_pool(ctx.store_mut(), &pool)?;

        tracing::debug!(
            "Hourly inflation {}: content {}, validator {}, infra {}, developer {}",
            this_hour,
            content_creator,
            validator,
            infra,
            developer
        );
        Ok(())
    }

    /// Annual rollover: recompute the growth rate from consumption growth,
    /// roll the consumption counters and snapshot the supply.
    ///
    /// The rate is `(this_year - last_year) / last_year`, kept unchanged when
    /// there was no consumption last year and bounded to `[0, 1]`.
    pub fn set_total_lino_and_recalculate_growth_rate(&self, ctx: &mut Context<'_>) -> Result<(), LinoError> {
        let mut meta = self.storage.get_global_meta(ctx.store())?;
        let allocation = self.params.get_global_allocation_param(ctx.store())?;

        let last_year = meta.last_year_cumulative_consumption;
        let this_year = meta.cumulative_consumption;
        let growth_rate = if last_year.is_zero() {
            allocation.global_growth_rate
        } else {
            let increment = this_year - last_year;
            if increment > last_year {
                Dec::one()
            } else {
                increment.ratio(last_year)?.clamp_to(Dec::zero(), Dec::one())
            }
        };
        self.params.update_global_growth_rate(ctx.store_mut(), growth_rate)?;

        meta.last_year_cumulative_consumption = this_year;
        meta.cumulative_consumption = Coin::zero();
        meta.last_year_total_lino_coin = meta.total_lino_coin;
        self.storage.set_global_meta(ctx.store_mut(), &meta)?;

        tracing::info!(
            "Annual rollover: growth rate {} (consumption {} -> {}), supply {}",
            growth_rate,
            last_year,
            this_year,
            meta.total_lino_coin
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Content reward window
    // -----------------------------------------------------------------

    /// Record a donation's friction and weight, and schedule its reward event
    /// one freezing period from now.
    pub fn add_friction_and_register_content_reward_event(
        &self,
        ctx: &mut Context<'_>,
        event: Event,
        friction: Coin,
        evaluate: Coin,
    ) -> Result<(), LinoError> {
        ensure_non_negative(friction, "friction")?;
        ensure_non_negative(evaluate, "evaluate")?;

        let mut consumption = self.storage.get_consumption_meta(ctx.store())?;
        let release_at = offset_time(ctx.block_time(), consumption.consumption_freezing_period_sec)?;
        self.register_event_at_time(ctx, release_at, event)?;

        consumption.consumption_window = consumption.consumption_window + evaluate;
        self.storage.set_consumption_meta(ctx.store_mut(), &consumption)?;

        let day = self.get_past_day(ctx, ctx.block_time())?;
        let mut stat = self.storage.get_lino_stake_stat(ctx.store(), day)?;
        stat.total_consumption_friction = stat.total_consumption_friction + friction;
        stat.unclaimed_friction = stat.unclaimed_friction + friction;
        self.storage.set_lino_stake_stat(ctx.store_mut(), day, &stat)
    }

    /// Pay the content reward for `evaluate` out of the reward pool.
    ///
    /// `reward = trunc(pool * evaluate * (1 - penalty_score) / window)`. The
    /// reward leaves the pool and enters circulation; `evaluate` leaves the
    /// window. A zero `evaluate` returns zero and touches nothing.
    ///
    /// # Errors
    /// `InvalidParam` for a penalty outside `[0, 1]`, `InvalidState` when
    /// `evaluate` exceeds the window.
    pub fn get_reward_and_pop_from_window(
        &self,
        ctx: &mut Context<'_>,
        evaluate: Coin,
        penalty_score: Dec,
    ) -> Result<Coin, LinoError> {
        if evaluate.is_zero() {
            return Ok(Coin::zero());
        }
        ensure_non_negative(evaluate, "evaluate")?;
        if penalty_score.is_negative() || penalty_score > Dec::one() {
            return Err(LinoError::InvalidParam(format!(
                "penalty score {} is outside [0, 1]",
                penalty_score
            )));
        }

        let mut consumption = self.storage.get_consumption_meta(ctx.store())?;
        if evaluate > consumption.consumption_window {
            return Err(LinoError::InvalidState(format!(
                "evaluate {} exceeds consumption window {}",
                evaluate, consumption.consumption_window
            )));
        }

        let ratio = evaluate
            .to_dec()?
            .mul(Dec::one() - penalty_score)?
            .quo(consumption.consumption_window.to_dec()?)?;
        let reward = consumption.consumption_reward_pool.mul_dec(ratio)?;

        consumption.consumption_reward_pool = consumption.consumption_reward_pool.checked_minus(reward)?;
        consumption.consumption_window = consumption.consumption_window.checked_minus(evaluate)?;
        self.storage.set_consumption_meta(ctx.store_mut(), &consumption)?;
        self.add_total_lino_coin(ctx, reward)?;
        Ok(reward)
    }

    // -----------------------------------------------------------------
    // Inflation pools
    // -----------------------------------------------------------------

    fn add_total_lino_coin(&self, ctx: &mut Context<'_>, amount: Coin) -> Result<(), LinoError> {
        if amount.is_zero() {
            return Ok(());
        }
        let mut meta = self.storage.get_global_meta(ctx.store())?;
        meta.total_lino_coin = meta.total_lino_coin + amount;
        self.storage.set_global_meta(ctx.store_mut(), &meta)
    }

    fn drain_pool(
        &self,
        ctx: &mut Context<'_>,
        select: fn(&mut InflationPool) -> &mut Coin,
    ) -> Result<Coin, LinoError> {
        let mut pool = self.storage.get_inflation_pool(ctx.store())?;
        let amount = std::mem::take(select(&mut pool));
        self.storage.set_inflation_pool(ctx.store_mut(), &pool)?;
        self.add_total_lino_coin(ctx, amount)?;
        Ok(amount)
    }

    /// Drain the validator pool into circulation.
    pub fn get_validator_hourly_inflation(&self, ctx: &mut Context<'_>) -> Result<Coin, LinoError> {
        self.drain_pool(ctx, |p| &mut p.validator_inflation_pool)
    }

    /// Drain the developer pool into circulation.
    pub fn pop_developer_monthly_inflation(&self, ctx: &mut Context<'_>) -> Result<Coin, LinoError> {
        self.drain_pool(ctx, |p| &mut p.developer_inflation_pool)
    }

    /// Drain the infra pool into circulation.
    pub fn pop_infra_monthly_inflation(&self, ctx: &mut Context<'_>) -> Result<Coin, LinoError> {
        self.drain_pool(ctx, |p| &mut p.infra_inflation_pool)
    }

    /// Return coin to the validator pool (e.g. an unpaid validator share).
    pub fn add_to_validator_inflation_pool(&self, ctx: &mut Context<'_>, amount: Coin) -> Result<(), LinoError> {
        ensure_non_negative(amount, "validator inflation")?;
        let mut pool = self.storage.get_inflation_pool(ctx.store())?;
        pool.validator_inflation_pool = pool.validator_inflation_pool + amount;
        self.storage.set_inflation_pool(ctx.store_mut(), &pool)
    }

    /// Return coin to the developer pool.
    pub fn add_to_developer_inflation_pool(&self, ctx: &mut Context<'_>, amount: Coin) -> Result<(), LinoError> {
        ensure_non_negative(amount, "developer inflation")?;
        let mut pool = self.storage.get_inflation_pool(ctx.store())?;
        pool.developer_inflation_pool = pool.developer_inflation_pool + amount;
        self.storage.set_inflation_pool(ctx.store_mut(), &pool)
    }

    // -----------------------------------------------------------------
    // Consumption
    // -----------------------------------------------------------------

    /// Count `amount` toward this year's consumption.
    pub fn add_consumption(&self, ctx: &mut Context<'_>, amount: Coin) -> Result<(), LinoError> {
        ensure_non_negative(amount, "consumption")?;
        let mut meta = self.storage.get_global_meta(ctx.store())?;
        meta.cumulative_consumption = meta.cumulative_consumption + amount;
        self.storage.set_global_meta(ctx.store_mut(), &meta)
    }

    pub fn get_consumption(&self, ctx: &Context<'_>) -> Result<Coin, LinoError> {
        Ok(self.storage.get_global_meta(ctx.store())?.cumulative_consumption)
    }

    pub fn get_consumption_friction_rate(&self, ctx: &Context<'_>) -> Result<Dec, LinoError> {
        Ok(self.storage.get_consumption_meta(ctx.store())?.consumption_friction_rate)
    }

    pub fn get_consumption_window(&self, ctx: &Context<'_>) -> Result<Coin, LinoError> {
        Ok(self.storage.get_consumption_meta(ctx.store())?.consumption_window)
    }

    pub fn get_total_lino_coin(&self, ctx: &Context<'_>) -> Result<Coin, LinoError> {
        Ok(self.storage.get_global_meta(ctx.store())?.total_lino_coin)
    }

    pub fn get_global_meta(&self, ctx: &Context<'_>) -> Result<GlobalMeta, LinoError> {
        self.storage.get_global_meta(ctx.store())
    }

    pub fn get_consumption_meta(&self, ctx: &Context<'_>) -> Result<ConsumptionMeta, LinoError> {
        self.storage.get_consumption_meta(ctx.store())
    }

    pub fn get_inflation_pool(&self, ctx: &Context<'_>) -> Result<InflationPool, LinoError> {
        self.storage.get_inflation_pool(ctx.store())
    }

    // -----------------------------------------------------------------
    // Stake statistics and interest
    // -----------------------------------------------------------------

    pub fn get_lino_stake_stat(&self, ctx: &Context<'_>, day: i64) -> Result<LinoStakeStat, LinoError> {
        self.storage.get_lino_stake_stat(ctx.store(), day)
    }

    /// Add `amount` to today's total and unclaimed stake.
    pub fn add_lino_stake_to_stat(&self, ctx: &mut Context<'_>, amount: Coin) -> Result<(), LinoError> {
        ensure_non_negative(amount, "stake")?;
        let day = self.get_past_day(ctx, ctx.block_time())?;
        let mut stat = self.storage.get_lino_stake_stat(ctx.store(), day)?;
        stat.total_lino_stake = stat.total_lino_stake + amount;
        stat.unclaimed_lino_stake = stat.unclaimed_lino_stake + amount;
        self.storage.set_lino_stake_stat(ctx.store_mut(), day, &stat)
    }

    /// Remove `amount` from today's total and unclaimed stake.
    pub fn minus_lino_stake_from_stat(&self, ctx: &mut Context<'_>, amount: Coin) -> Result<(), LinoError> {
        ensure_non_negative(amount, "stake")?;
        let day = self.get_past_day(ctx, ctx.block_time())?;
        let mut stat = self.storage.get_lino_stake_stat(ctx.store(), day)?;
        stat.total_lino_stake = stat.total_lino_stake.checked_minus(amount)?;
        stat.unclaimed_lino_stake = stat.unclaimed_lino_stake.checked_minus(amount)?;
        self.storage.set_lino_stake_stat(ctx.store_mut(), day, &stat)
    }

    /// Claim the friction owed to `stake` for every full day since `since`.
    ///
    /// Each visited day with unclaimed stake pays
    /// `trunc(unclaimed_friction * stake / unclaimed_stake)` and has the
    /// claim removed from its unclaimed counters, so repeating the call
    /// yields less. A stake larger than a day's unclaimed stake claims the
    /// whole day.
    pub fn get_interest_since(
        &self,
        ctx: &mut Context<'_>,
        since: i64,
        stake: Coin,
    ) -> Result<Coin, LinoError> {
        ensure_non_negative(stake, "stake")?;
        if stake.is_zero() {
            return Ok(Coin::zero());
        }
        let first_day = self.get_past_day(ctx, since)?;
        let today = self.get_past_day(ctx, ctx.block_time())?;

        let mut total = Coin::zero();
        for day in first_day..today {
            let mut stat = self.storage.get_lino_stake_stat(ctx.store(), day)?;
            if !stat.unclaimed_lino_stake.is_positive() {
                continue;
            }
            let claim = stake.min(stat.unclaimed_lino_stake);
            let interest = stat
                .unclaimed_friction
                .mul_ratio(claim, stat.unclaimed_lino_stake)?;
            stat.unclaimed_friction = stat.unclaimed_friction.checked_minus(interest)?;
            stat.unclaimed_lino_stake = stat.unclaimed_lino_stake.checked_minus(claim)?;
            self.storage.set_lino_stake_stat(ctx.store_mut(), day, &stat)?;
            total = total + interest;
        }
        Ok(total)
    }

    /// Open today's stake record.
    pub fn record_consumption_and_lino_stake(&self, ctx: &mut Context<'_>) -> Result<(), LinoError> {
        let day = self.get_past_day(ctx, ctx.block_time())?;
        self.record_consumption_and_lino_stake_for_day(ctx, day)
    }

    /// Open the stake record of `day` from the one before it.
    ///
    /// Stake carries forward. Friction starts from zero when the previous day
    /// had stake to claim it; otherwise the previous day's friction rolls
    /// into the new day.
    pub fn record_consumption_and_lino_stake_for_day(
        &self,
        ctx: &mut Context<'_>,
        day: i64,
    ) -> Result<(), LinoError> {
        if day <= 0 {
            return Ok(());
        }
        let previous = self.storage.get_lino_stake_stat(ctx.store(), day - 1)?;
        let existing = self.storage.get_lino_stake_stat(ctx.store(), day)?;

        let mut next = LinoStakeStat {
            total_consumption_friction: existing.total_consumption_friction,
            unclaimed_friction: existing.unclaimed_friction,
            total_lino_stake: previous.total_lino_stake,
            unclaimed_lino_stake: previous.total_lino_stake,
        };
        if previous.total_lino_stake.is_zero() {
            next.total_consumption_friction =
                next.total_consumption_friction + previous.total_consumption_friction;
            next.unclaimed_friction = next.unclaimed_friction + previous.unclaimed_friction;
        }
        self.storage.set_lino_stake_stat(ctx.store_mut(), day, &next)?;
        tracing::debug!("Opened stake record for day {}: stake {}", day, next.total_lino_stake);
        Ok(())
    }

    // -----------------------------------------------------------------
    // TPS
    // -----------------------------------------------------------------

    /// Recompute current TPS from this block's transactions and the time
    /// since `last_block_time`; raise the running maximum if exceeded.
    pub fn update_tps(&self, ctx: &mut Context<'_>, last_block_time: i64) -> Result<(), LinoError> {
        let mut tps = self.storage.get_tps(ctx.store())?;
        let elapsed = ctx.block_time() - last_block_time;
        tps.current_tps = if elapsed <= 0 {
            Dec::zero()
        } else {
            Dec::from_ratio(ctx.num_txs() as i128, elapsed as i128)?
        };
        if tps.current_tps > tps.max_tps {
            tps.max_tps = tps.current_tps;
        }
        self.storage.set_tps(ctx.store_mut(), &tps)
    }

    /// `current_tps / max_tps`, zero while no maximum is known.
    pub fn get_tps_capacity_ratio(&self, ctx: &Context<'_>) -> Result<Dec, LinoError> {
        let tps = self.storage.get_tps(ctx.store())?;
        if tps.max_tps <= Dec::zero() {
            return Ok(Dec::zero());
        }
        Ok(tps.current_tps.quo(tps.max_tps)?.clamp_to(Dec::zero(), Dec::one()))
    }

    pub fn get_tps(&self, ctx: &Context<'_>) -> Result<Tps, LinoError> {
        self.storage.get_tps(ctx.store())
    }
}
