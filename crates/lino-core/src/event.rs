// crates/lino-core/src/event.rs
//
// Deferred ledger events and the per-second bucket that stores them.
//
// `Event` is a closed sum type. It is encoded as `{"type": ..., "value": ...}`
// so stored buckets keep decoding when new variants are appended.

use serde::{Deserialize, Serialize};

use crate::coin::Coin;
use crate::param::Parameter;

/// Post reward released after the consumption freezing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRewardEvent {
    pub post_author: String,
    pub post_id: String,
    pub consumer: String,
    /// Consumption weight this donation added to the window.
    pub evaluate: Coin,
    /// Amount the consumer originally donated.
    pub original: Coin,
    /// Friction taken from the donation.
    pub friction: Coin,
    pub from_app: String,
}

/// Why a coin-return instalment is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    VoteReturn,
    DelegationReturn,
    DeveloperDeposit,
    ValidatorDeposit,
}

/// One instalment of a staged coin return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinReturnEvent {
    pub username: String,
    pub amount: Coin,
    pub return_type: ReturnType,
}

/// Apply an accepted parameter change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamChangeEvent {
    pub param: Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    ChangeParam,
    ContentCensorship,
    ProtocolUpgrade,
}

/// Close the voting window of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDecisionEvent {
    pub proposal_type: ProposalType,
    pub proposal_id: String,
}

/// A deferred action scheduled for a specific second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Event {
    PostReward(PostRewardEvent),
    CoinReturn(CoinReturnEvent),
    ParamChange(ParamChangeEvent),
    ProposalDecision(ProposalDecisionEvent),
}

impl Event {
    /// Stable tag of the variant, matching its serialized `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PostReward(_) => "post_reward",
            Event::CoinReturn(_) => "coin_return",
            Event::ParamChange(_) => "param_change",
            Event::ProposalDecision(_) => "proposal_decision",
        }
    }
}

impl From<PostRewardEvent> for Event {
    fn from(e: PostRewardEvent) -> Self {
        Event::PostReward(e)
    }
}

impl From<CoinReturnEvent> for Event {
    fn from(e: CoinReturnEvent) -> Self {
        Event::CoinReturn(e)
    }
}

impl From<ParamChangeEvent> for Event {
    fn from(e: ParamChangeEvent) -> Self {
        Event::ParamChange(e)
    }
}

impl From<ProposalDecisionEvent> for Event {
    fn from(e: ProposalDecisionEvent) -> Self {
        Event::ProposalDecision(e)
    }
}

/// Every event scheduled for one second, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEventList {
    pub events: Vec<Event>,
}

impl TimeEventList {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
