// crates/lino-daemon/src/workload.rs
//
// Deterministic synthetic traffic for the simulated chain.
//
// Each block carries a fixed number of donations rotated across a small set
// of authors. Calendar boundaries drive the rest: validators are paid every
// hour, the staker claims interest and stakes more every day, and developer
// and infra pools are paid out every month.

use lino_core::coin::Coin;
use lino_core::error::LinoError;
use lino_core::event::PostRewardEvent;
use lino_core::time::SECONDS_PER_DAY;
use lino_core::traits::KvStore;
use lino_global::{Context, GlobalManager, PeriodicEvent};

use crate::accounts::AccountBook;

pub const AUTHORS: [&str; 3] = ["alice", "bob", "carol"];
pub const CONSUMER: &str = "reader";
pub const STAKER: &str = "staker";
pub const VALIDATOR: &str = "validator";
pub const DEVELOPER: &str = "developer";
pub const INFRA: &str = "infra";
const APP: &str = "lino-app";

/// What one block of workload did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadSummary {
    pub donations: u32,
    /// Coins moved from inflation pools into accounts.
    pub minted: Coin,
    pub interest: Coin,
}

#[derive(Debug, Clone)]
pub struct Workload {
    donations_per_block: u32,
    donation_amount: Coin,
    stake_per_day: Coin,
}

impl Workload {
    pub fn new(donations_per_block: u32, donation_amount: Coin, stake_per_day: Coin) -> Self {
        Self {
            donations_per_block,
            donation_amount,
            stake_per_day,
        }
    }

    /// Open every account the workload pays into.
    pub fn create_accounts(&self, store: &mut dyn KvStore, book: &AccountBook) -> Result<(), LinoError> {
        for name in AUTHORS
            .iter()
            .chain([CONSUMER, STAKER, VALIDATOR, DEVELOPER, INFRA].iter())
        {
            book.create_account(store, name)?;
        }
        Ok(())
    }

    /// Run this block's traffic after the begin-block phase.
    pub fn apply(
        &self,
        ctx: &mut Context<'_>,
        gm: &GlobalManager,
        book: &AccountBook,
        fired: &[PeriodicEvent],
    ) -> Result<WorkloadSummary, LinoError> {
        let mut summary = WorkloadSummary::default();
        for hook in fired {
            match hook {
                PeriodicEvent::Hourly => {
                    let paid = gm.get_validator_hourly_inflation(ctx)?;
                    book.credit(ctx.store_mut(), VALIDATOR, paid)?;
                    summary.minted = summary.minted + paid;
                }
                PeriodicEvent::Daily => {
                    summary.interest = summary.interest + self.claim_and_stake(ctx, gm, book)?;
                }
                PeriodicEvent::Monthly => {
                    let developer = gm.pop_developer_monthly_inflation(ctx)?;
                    let infra = gm.pop_infra_monthly_inflation(ctx)?;
                    book.credit(ctx.store_mut(), DEVELOPER, developer)?;
                    book.credit(ctx.store_mut(), INFRA, infra)?;
                    summary.minted = summary.minted + developer + infra;
                    tracing::info!("Monthly payout: developer {}, infra {}", developer, infra);
                }
                PeriodicEvent::Yearly => {}
            }
        }

        for i in 0..self.donations_per_block {
            self.donate(ctx, gm, book, i)?;
            summary.donations += 1;
        }
        Ok(summary)
    }

    /// Claim yesterday's interest for the staker, then stake today's deposit.
    fn claim_and_stake(
        &self,
        ctx: &mut Context<'_>,
        gm: &GlobalManager,
        book: &AccountBook,
    ) -> Result<Coin, LinoError> {
        let today = gm.get_past_day(ctx, ctx.block_time())?;
        let mut interest = Coin::zero();
        if today > 0 {
            let stake = gm.get_lino_stake_stat(ctx, today - 1)?.total_lino_stake;
            let since = ctx.block_time() - SECONDS_PER_DAY;
            interest = gm.get_interest_since(ctx, since, stake)?;
            book.credit(ctx.store_mut(), STAKER, interest)?;
        }
        gm.add_lino_stake_to_stat(ctx, self.stake_per_day)?;
        tracing::debug!("Day {}: staker claimed {}", today, interest);
        Ok(interest)
    }

    /// One donation: the author receives it net of friction, and the full
    /// amount minus friction enters the reward window.
    fn donate(
        &self,
        ctx: &mut Context<'_>,
        gm: &GlobalManager,
        book: &AccountBook,
        index: u32,
    ) -> Result<(), LinoError> {
        let height = ctx.block_height();
        let author = AUTHORS[(height as usize + index as usize) % AUTHORS.len()];
        let rate = gm.get_consumption_friction_rate(ctx)?;
        let friction = self.donation_amount.mul_dec(rate)?;
        let net = self.donation_amount.checked_minus(friction)?;

        book.credit(ctx.store_mut(), author, net)?;
        gm.add_consumption(ctx, self.donation_amount)?;
        let event = PostRewardEvent {
            post_author: author.to_string(),
            post_id: format!("{}-{}-{}", author, height, index),
            consumer: CONSUMER.to_string(),
            evaluate: net,
            original: self.donation_amount,
            friction,
            from_app: APP.to_string(),
        };
        gm.add_friction_and_register_content_reward_event(ctx, event.into(), friction, net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lino_core::param::{GlobalAllocationParam, GlobalInitParams, ProposalParam};
    use lino_core::time::BlockHeader;
    use lino_store::MemStore;

    const T0: i64 = 1_600_000_000;

    fn setup(store: &mut MemStore) -> (GlobalManager, Workload) {
        let gm = GlobalManager::new();
        gm.params()
            .init_param(
                store,
                &GlobalAllocationParam::default(),
                &ProposalParam::default(),
                &GlobalInitParams::default(),
            )
            .unwrap();
        {
            let mut ctx = Context::new(store, BlockHeader::new(0, T0, 0));
            gm.init_global_manager(&mut ctx, Coin::from_lino(10_000_000_000)).unwrap();
            gm.on_begin_block(&mut ctx).unwrap();
        }
        let workload = Workload::new(2, Coin::from_lino(100), Coin::from_lino(1_000));
        workload.create_accounts(store, &AccountBook).unwrap();
        (gm, workload)
    }

    #[test]
    fn test_donations_rotate_authors_and_fill_window() {
        let mut store = MemStore::new();
        let (gm, workload) = setup(&mut store);
        let mut ctx = Context::new(&mut store, BlockHeader::new(1, T0 + 60, 2));
        let summary = workload.apply(&mut ctx, &gm, &AccountBook, &[]).unwrap();
        assert_eq!(summary.donations, 2);
        assert!(summary.minted.is_zero());

        // 5% friction on 100 LINO
        let net = Coin::from_lino(95);
        assert_eq!(AccountBook.balance(ctx.store(), "bob").unwrap(), net);
        assert_eq!(AccountBook.balance(ctx.store(), "carol").unwrap(), net);
        assert_eq!(AccountBook.balance(ctx.store(), "alice").unwrap(), Coin::zero());
        assert_eq!(gm.get_consumption_window(&ctx).unwrap(), net + net);
        assert_eq!(gm.get_consumption(&ctx).unwrap(), Coin::from_lino(200));
        assert_eq!(
            gm.get_lino_stake_stat(&ctx, 0).unwrap().unclaimed_friction,
            Coin::from_lino(10)
        );
        let release = T0 + 60 + GlobalInitParams::default().consumption_freezing_period_sec;
        assert_eq!(ctx.event_cache().events_at(release).len(), 2);
    }

    #[test]
    fn test_hourly_pays_validator_pool() {
        let mut store = MemStore::new();
        let (gm, workload) = setup(&mut store);
        let mut ctx = Context::new(&mut store, BlockHeader::new(60, T0 + 3600, 0));
        gm.distribute_hourly_inflation(&mut ctx).unwrap();
        let pool = gm.get_inflation_pool(&ctx).unwrap().validator_inflation_pool;
        assert!(pool.is_positive());

        let summary = workload
            .apply(&mut ctx, &gm, &AccountBook, &[PeriodicEvent::Hourly])
            .unwrap();
        assert_eq!(summary.minted, pool);
        assert_eq!(AccountBook.balance(ctx.store(), VALIDATOR).unwrap(), pool);
        assert!(gm.get_inflation_pool(&ctx).unwrap().validator_inflation_pool.is_zero());
    }

    #[test]
    fn test_daily_claims_interest_then_stakes() {
        let mut store = MemStore::new();
        let (gm, workload) = setup(&mut store);
        {
            let mut ctx = Context::new(&mut store, BlockHeader::new(1, T0 + 60, 0));
            gm.add_lino_stake_to_stat(&mut ctx, Coin::from_lino(1_000)).unwrap();
            workload.apply(&mut ctx, &gm, &AccountBook, &[]).unwrap();
        }
        let mut ctx = Context::new(&mut store, BlockHeader::new(2, T0 + SECONDS_PER_DAY, 0));
        gm.record_consumption_and_lino_stake(&mut ctx).unwrap();
        let summary = workload
            .apply(&mut ctx, &gm, &AccountBook, &[PeriodicEvent::Daily])
            .unwrap();

        // sole staker takes all of day 0's friction
        assert_eq!(summary.interest, Coin::from_lino(10));
        assert_eq!(AccountBook.balance(ctx.store(), STAKER).unwrap(), Coin::from_lino(10));
        assert_eq!(
            gm.get_lino_stake_stat(&ctx, 1).unwrap().total_lino_stake,
            Coin::from_lino(2_000)
        );
    }
}
