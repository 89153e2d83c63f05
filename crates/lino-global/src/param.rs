// crates/lino-global/src/param.rs
//
// Parameter holder: the governance-adjustable values the economic core reads.
//
// Key format (under the `param/` namespace):
//   - 0x01 -> GlobalAllocationParam
//   - 0x02 -> ProposalParam
//   - 0x03 -> GlobalInitParams

use lino_core::dec::Dec;
use lino_core::error::LinoError;
use lino_core::param::{GlobalAllocationParam, GlobalInitParams, Parameter, ProposalParam};
use lino_core::traits::KvStore;

const ALLOCATION_KEY: &[u8] = b"param/\x01";
const PROPOSAL_KEY: &[u8] = b"param/\x02";
const INIT_KEY: &[u8] = b"param/\x03";

/// Reads and writes parameter records in the `param/` namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamHolder;

impl ParamHolder {
    pub fn new() -> Self {
        Self
    }

    /// Write the genesis parameter set.
    pub fn init_param(
        &self,
        store: &mut dyn KvStore,
        allocation: &GlobalAllocationParam,
        proposal: &ProposalParam,
        init: &GlobalInitParams,
    ) -> Result<(), LinoError> {
        allocation.validate()?;
        proposal.validate()?;
        self.set_global_allocation_param(store, allocation)?;
        self.set_proposal_param(store, proposal)?;
        self.set_global_init_params(store, init)
    }

    pub fn get_global_allocation_param(&self, store: &dyn KvStore) -> Result<GlobalAllocationParam, LinoError> {
        read(store, ALLOCATION_KEY, "global allocation param")
    }

    pub fn set_global_allocation_param(
        &self,
        store: &mut dyn KvStore,
        param: &GlobalAllocationParam,
    ) -> Result<(), LinoError> {
        write(store, ALLOCATION_KEY, param)
    }

    /// Replace only the growth rate, keeping the allocations.
    pub fn update_global_growth_rate(&self, store: &mut dyn KvStore, rate: Dec) -> Result<(), LinoError> {
        let mut param = self.get_global_allocation_param(store)?;
        param.global_growth_rate = rate;
        self.set_global_allocation_param(store, &param)
    }

    pub fn get_proposal_param(&self, store: &dyn KvStore) -> Result<ProposalParam, LinoError> {
        read(store, PROPOSAL_KEY, "proposal param")
    }

    pub fn set_proposal_param(&self, store: &mut dyn KvStore, param: &ProposalParam) -> Result<(), LinoError> {
        write(store, PROPOSAL_KEY, param)
    }

    pub fn get_global_init_params(&self, store: &dyn KvStore) -> Result<GlobalInitParams, LinoError> {
        read(store, INIT_KEY, "global init params")
    }

    pub fn set_global_init_params(
        &self,
        store: &mut dyn KvStore,
        param: &GlobalInitParams,
    ) -> Result<(), LinoError> {
        write(store, INIT_KEY, param)
    }

    /// Apply a validated parameter change.
    pub fn update_param(&self, store: &mut dyn KvStore, param: &Parameter) -> Result<(), LinoError> {
        param.validate()?;
        match param {
            Parameter::GlobalAllocation(p) => self.set_global_allocation_param(store, p),
            Parameter::Proposal(p) => self.set_proposal_param(store, p),
        }
    }
}

fn read<T: serde::de::DeserializeOwned>(store: &dyn KvStore, key: &[u8], what: &str) -> Result<T, LinoError> {
    let bytes = store
        .get(key)?
        .ok_or_else(|| LinoError::Uninitialized(what.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write<T: serde::Serialize>(store: &mut dyn KvStore, key: &[u8], value: &T) -> Result<(), LinoError> {
    store.set(key, &serde_json::to_vec(value)?)
}
