// crates/lino-core/src/param.rs
//
// Governance-adjustable parameter records read by the economic core.

use serde::{Deserialize, Serialize};

use crate::dec::Dec;
use crate::error::LinoError;
use crate::time::SECONDS_PER_DAY;

/// Annual growth rate and the split of each hour's inflation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAllocationParam {
    pub global_growth_rate: Dec,
    pub infra_allocation: Dec,
    pub content_creator_allocation: Dec,
    pub developer_allocation: Dec,
    pub validator_allocation: Dec,
}

impl Default for GlobalAllocationParam {
    fn default() -> Self {
        Self {
            global_growth_rate: Dec::from_raw(98_000_000_000_000_000),
            infra_allocation: Dec::zero(),
            content_creator_allocation: Dec::from_raw(850_000_000_000_000_000),
            developer_allocation: Dec::from_raw(100_000_000_000_000_000),
            validator_allocation: Dec::from_raw(50_000_000_000_000_000),
        }
    }
}

impl GlobalAllocationParam {
    /// Check that every rate lies in `[0, 1]` and the four allocations sum to one.
    pub fn validate(&self) -> Result<(), LinoError> {
        let rates = [
            ("global_growth_rate", self.global_growth_rate),
            ("infra_allocation", self.infra_allocation),
            ("content_creator_allocation", self.content_creator_allocation),
            ("developer_allocation", self.developer_allocation),
            ("validator_allocation", self.validator_allocation),
        ];
        for (name, rate) in rates {
            if rate.is_negative() || rate > Dec::one() {
                return Err(LinoError::InvalidParam(format!(
                    "{} = {} is outside [0, 1]",
                    name, rate
                )));
            }
        }
        let sum = self.infra_allocation
            + self.content_creator_allocation
            + self.developer_allocation
            + self.validator_allocation;
        if sum != Dec::one() {
            return Err(LinoError::InvalidParam(format!(
                "allocations sum to {}, expected 1",
                sum
            )));
        }
        Ok(())
    }
}

/// Proposal timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalParam {
    /// Voting window of a change-param proposal.
    pub change_param_decide_sec: i64,
    /// Delay between an accepted change-param proposal and its application.
    pub change_param_execution_sec: i64,
}

impl Default for ProposalParam {
    fn default() -> Self {
        Self {
            change_param_decide_sec: 7 * SECONDS_PER_DAY,
            change_param_execution_sec: SECONDS_PER_DAY,
        }
    }
}

impl ProposalParam {
    pub fn validate(&self) -> Result<(), LinoError> {
        if self.change_param_decide_sec <= 0 || self.change_param_execution_sec <= 0 {
            return Err(LinoError::InvalidParam(
                "proposal durations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Genesis-only settings of the economic core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalInitParams {
    pub max_tps: Dec,
    pub consumption_friction_rate: Dec,
    pub consumption_freezing_period_sec: i64,
}

impl Default for GlobalInitParams {
    fn default() -> Self {
        Self {
            max_tps: Dec::from_int(1000),
            consumption_friction_rate: Dec::from_raw(50_000_000_000_000_000),
            consumption_freezing_period_sec: 7 * SECONDS_PER_DAY,
        }
    }
}

/// A parameter record carried by a param-change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Parameter {
    GlobalAllocation(GlobalAllocationParam),
    Proposal(ProposalParam),
}

impl Parameter {
    pub fn validate(&self) -> Result<(), LinoError> {
        match self {
            Parameter::GlobalAllocation(p) => p.validate(),
            Parameter::Proposal(p) => p.validate(),
        }
    }
}
