// crates/lino-daemon/src/accounts.rs
//
// Minimal account and proposal books backing the event dispatcher.
//
// Balances and pending proposals live in the block store under their own
// prefixes, so an event that fails after crediting an account leaves no
// trace once its cache is discarded.

use lino_core::coin::Coin;
use lino_core::error::LinoError;
use lino_core::event::{ParamChangeEvent, ProposalDecisionEvent, ProposalType};
use lino_core::param::Parameter;
use lino_core::traits::KvStore;
use lino_global::{AccountKeeper, Context, GlobalManager, ProposalKeeper};

const ACCOUNT_PREFIX: &[u8] = b"account/";
const PROPOSAL_PREFIX: &[u8] = b"proposal/";

fn account_key(username: &str) -> Vec<u8> {
    [ACCOUNT_PREFIX, username.as_bytes()].concat()
}

fn proposal_key(id: &str) -> Vec<u8> {
    [PROPOSAL_PREFIX, id.as_bytes()].concat()
}

/// Username -> balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountBook;

impl AccountBook {
    pub fn new() -> Self {
        Self
    }

    /// Open an account with a zero balance. Existing accounts are left alone.
    pub fn create_account(&self, store: &mut dyn KvStore, username: &str) -> Result<(), LinoError> {
        let key = account_key(username);
        if store.has(&key)? {
            return Ok(());
        }
        store.set(&key, &serde_json::to_vec(&Coin::zero())?)
    }

    pub fn balance(&self, store: &dyn KvStore, username: &str) -> Result<Coin, LinoError> {
        match store.get(&account_key(username))? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Err(LinoError::NotFound(format!("account {}", username))),
        }
    }

    /// Every account in username order.
    pub fn balances(&self, store: &dyn KvStore) -> Result<Vec<(String, Coin)>, LinoError> {
        store
            .prefix_scan(ACCOUNT_PREFIX)?
            .into_iter()
            .map(|(key, value)| {
                let name = String::from_utf8(key[ACCOUNT_PREFIX.len()..].to_vec())
                    .map_err(|e| LinoError::Serialization(e.to_string()))?;
                Ok((name, serde_json::from_slice(&value)?))
            })
            .collect()
    }

    pub fn credit(&self, store: &mut dyn KvStore, username: &str, amount: Coin) -> Result<(), LinoError> {
        if amount.is_negative() {
            return Err(LinoError::NegativeCoin(format!("credit {} to {}", amount, username)));
        }
        let balance = self.balance(store, username)? + amount;
        store.set(&account_key(username), &serde_json::to_vec(&balance)?)
    }
}

impl AccountKeeper for AccountBook {
    fn add_coin_to_username(
        &mut self,
        ctx: &mut Context<'_>,
        username: &str,
        amount: Coin,
    ) -> Result<(), LinoError> {
        self.credit(ctx.store_mut(), username, amount)
    }
}

/// Pending change-param proposals, keyed by proposal id.
///
/// Voting is outside this book; a proposal that reaches its decision time
/// is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposalBook;

impl ProposalBook {
    pub fn new() -> Self {
        Self
    }

    /// Store `param` under `id` and schedule its decision one voting window out.
    pub fn submit_param_change(
        &self,
        ctx: &mut Context<'_>,
        gm: &GlobalManager,
        id: &str,
        param: &Parameter,
    ) -> Result<(), LinoError> {
        param.validate()?;
        let key = proposal_key(id);
        if ctx.store().has(&key)? {
            return Err(LinoError::InvalidState(format!("proposal {} already exists", id)));
        }
        ctx.store_mut().set(&key, &serde_json::to_vec(param)?)?;
        let decide_sec = gm.params().get_proposal_param(ctx.store())?.change_param_decide_sec;
        let decision = ProposalDecisionEvent {
            proposal_type: ProposalType::ChangeParam,
            proposal_id: id.to_string(),
        };
        gm.register_proposal_decide_event(ctx, decide_sec, decision.into())?;
        tracing::info!("Proposal {} submitted, decided in {}s", id, decide_sec);
        Ok(())
    }

    pub fn pending(&self, store: &dyn KvStore, id: &str) -> Result<Option<Parameter>, LinoError> {
        match store.get(&proposal_key(id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl ProposalKeeper for ProposalBook {
    fn decide_proposal(
        &mut self,
        ctx: &mut Context<'_>,
        gm: &GlobalManager,
        event: &ProposalDecisionEvent,
    ) -> Result<(), LinoError> {
        if event.proposal_type != ProposalType::ChangeParam {
            return Err(LinoError::InvalidEvent(format!(
                "no handler for {:?} proposal {}",
                event.proposal_type, event.proposal_id
            )));
        }
        let param = self
            .pending(ctx.store(), &event.proposal_id)?
            .ok_or_else(|| LinoError::NotFound(format!("proposal {}", event.proposal_id)))?;
        ctx.store_mut().delete(&proposal_key(&event.proposal_id))?;
        let delay = gm.param_change_delay(ctx)?;
        gm.register_param_change_event(ctx, ParamChangeEvent { param }.into(), delay)?;
        tracing::info!(
            "Proposal {} accepted, applies in {}s",
            event.proposal_id,
            delay
        );
        Ok(())
    }
}
