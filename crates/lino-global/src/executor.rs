// crates/lino-global/src/executor.rs
//
// Event dispatch.
//
// `EventExecutor` is the seam between the scheduler and the modules that
// own each event's effects. `GlobalEventExecutor` is the standard dispatcher:
// it matches on the event variant and calls into the global manager, the
// parameter holder, or the account/proposal collaborators.

use lino_core::coin::Coin;
use lino_core::dec::Dec;
use lino_core::error::LinoError;
use lino_core::event::{Event, PostRewardEvent, ProposalDecisionEvent};

use crate::context::Context;
use crate::manager::GlobalManager;

/// Executes one due event against the block context.
pub trait EventExecutor {
    fn execute(&mut self, ctx: &mut Context<'_>, event: &Event) -> Result<(), LinoError>;
}

/// Account balances, as far as deferred events need them.
pub trait AccountKeeper {
    /// Credit `amount` to `username`.
    ///
    /// # Errors
    /// `NotFound` if the account does not exist.
    fn add_coin_to_username(
        &mut self,
        ctx: &mut Context<'_>,
        username: &str,
        amount: Coin,
    ) -> Result<(), LinoError>;
}

/// Proposal lifecycle, as far as deferred events need it.
pub trait ProposalKeeper {
    /// Close voting on a proposal and act on the outcome. Accepted
    /// parameter changes are scheduled through `gm`.
    fn decide_proposal(
        &mut self,
        ctx: &mut Context<'_>,
        gm: &GlobalManager,
        event: &ProposalDecisionEvent,
    ) -> Result<(), LinoError>;
}

/// Penalty score in `[0, 1]` applied to a post reward.
pub trait PenaltyScorer {
    fn penalty_score(&self, ctx: &Context<'_>, event: &PostRewardEvent) -> Result<Dec, LinoError>;
}

/// Scorer that never penalizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPenalty;

impl PenaltyScorer for NoPenalty {
    fn penalty_score(&self, _ctx: &Context<'_>, _event: &PostRewardEvent) -> Result<Dec, LinoError> {
        Ok(Dec::zero())
    }
}

/// Standard dispatcher for every `Event` variant.
pub struct GlobalEventExecutor<A, P> {
    gm: GlobalManager,
    accounts: A,
    proposals: P,
    penalty: Box<dyn PenaltyScorer>,
}

impl<A: AccountKeeper, P: ProposalKeeper> GlobalEventExecutor<A, P> {
    pub fn new(gm: GlobalManager, accounts: A, proposals: P) -> Self {
        Self {
            gm,
            accounts,
            proposals,
            penalty: Box::new(NoPenalty),
        }
    }

    pub fn with_penalty_scorer(mut self, scorer: Box<dyn PenaltyScorer>) -> Self {
        self.penalty = scorer;
        self
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut A {
        &mut self.accounts
    }

    pub fn proposals(&self) -> &P {
        &self.proposals
    }

    fn execute_post_reward(&mut self, ctx: &mut Context<'_>, event: &PostRewardEvent) -> Result<(), LinoError> {
        let penalty = self.penalty.penalty_score(ctx, event)?;
        let reward = self
            .gm
            .get_reward_and_pop_from_window(ctx, event.evaluate, penalty)?;
        if reward.is_zero() {
            return Ok(());
        }
        self.accounts
            .add_coin_to_username(ctx, &event.post_author, reward)?;
        tracing::debug!(
            "Paid {} to {} for post {}",
            reward,
            event.post_author,
            event.post_id
        );
        Ok(())
    }
}

impl<A: AccountKeeper, P: ProposalKeeper> EventExecutor for GlobalEventExecutor<A, P> {
    fn execute(&mut self, ctx: &mut Context<'_>, event: &Event) -> Result<(), LinoError> {
        match event {
            Event::PostReward(e) => self.execute_post_reward(ctx, e),
            Event::CoinReturn(e) => self.accounts.add_coin_to_username(ctx, &e.username, e.amount),
            Event::ParamChange(e) => self.gm.params().update_param(ctx.store_mut(), &e.param),
            Event::ProposalDecision(e) => self.proposals.decide_proposal(ctx, &self.gm, e),
        }
    }
}
