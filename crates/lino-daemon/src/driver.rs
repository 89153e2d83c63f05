// crates/lino-daemon/src/driver.rs
//
// Block driver for the Lino daemon.
//
// Produces a simulated chain: block `h` carries time
// `genesis_time + h * block_interval_sec`. Every block runs the begin-block
// phase (calendar hooks, TPS, due events), the synthetic workload, and the
// end-block phase against a single store.

use std::time::Duration;

use lino_core::coin::Coin;
use lino_core::error::LinoError;
use lino_core::time::BlockHeader;
use lino_core::traits::KvStore;
use lino_global::{
    Context, ExecutionSummary, GlobalEventExecutor, GlobalManager, GlobalTables, PeriodicEvent,
};

use crate::accounts::{AccountBook, ProposalBook};
use crate::config::{DaemonConfig, ScheduledProposal};
use crate::workload::{Workload, WorkloadSummary};

/// Outcome of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub height: i64,
    pub time: i64,
    pub fired: Vec<PeriodicEvent>,
    pub execution: ExecutionSummary,
    pub workload: WorkloadSummary,
    pub total_supply: Coin,
}

pub struct BlockDriver {
    store: Box<dyn KvStore>,
    gm: GlobalManager,
    executor: GlobalEventExecutor<AccountBook, ProposalBook>,
    workload: Workload,
    proposals: Vec<ScheduledProposal>,
    genesis_time: i64,
    block_interval_sec: i64,
    txs_per_block: i64,
    tick: Duration,
    height: i64,
}

impl BlockDriver {
    /// Build a driver over `store`, writing genesis state if the store is empty
    /// and resuming from the last committed block otherwise.
    pub fn open(mut store: Box<dyn KvStore>, config: &DaemonConfig) -> Result<Self, LinoError> {
        if config.block_interval_sec <= 0 {
            return Err(LinoError::InvalidParam(format!(
                "block interval {}s",
                config.block_interval_sec
            )));
        }
        let mut gm = GlobalManager::new();
        if let Some(height) = config.legacy_param_change_height {
            gm = gm.with_legacy_param_change_height(height);
        }
        let workload = Workload::new(
            config.donations_per_block,
            Coin::from_lino(config.donation_amount),
            Coin::from_lino(config.stake_per_day),
        );

        let height = match gm.storage().get_global_meta(store.as_ref()) {
            Ok(_) => {
                let last = gm.storage().get_global_time(store.as_ref())?.last_block_time;
                let height = if last == 0 {
                    0
                } else {
                    (last - config.genesis_time) / config.block_interval_sec
                };
                tracing::info!("Resuming at height {} (block time {})", height, last);
                height
            }
            Err(LinoError::Uninitialized(_)) => {
                Self::write_genesis(store.as_mut(), &gm, &workload, config)?;
                0
            }
            Err(e) => return Err(e),
        };

        let executor = GlobalEventExecutor::new(gm.clone(), AccountBook::new(), ProposalBook::new());
        Ok(Self {
            store,
            gm,
            executor,
            workload,
            proposals: config.proposals.clone(),
            genesis_time: config.genesis_time,
            block_interval_sec: config.block_interval_sec,
            txs_per_block: config.txs_per_block,
            tick: Duration::from_millis(config.tick_ms),
            height,
        })
    }

    fn write_genesis(
        store: &mut dyn KvStore,
        gm: &GlobalManager,
        workload: &Workload,
        config: &DaemonConfig,
    ) -> Result<(), LinoError> {
        gm.params().init_param(
            store,
            &config.genesis.allocation(),
            &config.genesis.proposal(),
            &config.genesis.init(),
        )?;
        workload.create_accounts(store, &AccountBook::new())?;
        let header = BlockHeader::new(0, config.genesis_time, 0);
        let mut ctx = Context::new(store, header);
        gm.init_global_manager(&mut ctx, config.total_supply())
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    fn header(&self, height: i64, num_txs: i64) -> BlockHeader {
        BlockHeader::new(height, self.genesis_time + height * self.block_interval_sec, num_txs)
    }

    /// Produce the next block. Any error returned here is fatal to the node.
    pub fn advance_block(&mut self) -> Result<BlockSummary, LinoError> {
        let header = self.header(self.height + 1, self.txs_per_block);
        let mut ctx = Context::new(self.store.as_mut(), header);

        let fired = self.gm.on_begin_block(&mut ctx)?;
        let last_block_time = self.gm.get_last_block_time(&ctx)?;
        self.gm.update_tps(&mut ctx, last_block_time)?;
        let execution = self.gm.execute_events(&mut ctx, &mut self.executor)?;

        let workload = self
            .workload
            .apply(&mut ctx, &self.gm, self.executor.accounts(), &fired)?;
        for proposal in self.proposals.iter().filter(|p| p.height == header.height) {
            let submitted = self.executor.proposals().submit_param_change(
                &mut ctx,
                &self.gm,
                &proposal.id,
                &proposal.param,
            );
            match submitted {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => tracing::warn!("Proposal {} rejected: {}", proposal.id, e),
            }
        }

        self.gm.on_end_block(&mut ctx)?;
        let total_supply = self.gm.get_total_lino_coin(&ctx)?;
        self.height = header.height;

        let summary = BlockSummary {
            height: header.height,
            time: header.time,
            fired,
            execution,
            workload,
            total_supply,
        };
        if summary.fired.iter().any(|e| *e != PeriodicEvent::Hourly) {
            tracing::info!(
                "=== {:?} === block {} @ {}: supply {}, interest claimed {}",
                summary.fired,
                summary.height,
                summary.time,
                summary.total_supply,
                summary.workload.interest
            );
        } else {
            tracing::debug!(
                "Block {} @ {}: {} events ({} failed), {} donations, minted {}, supply {}",
                summary.height,
                summary.time,
                summary.execution.executed,
                summary.execution.failed,
                summary.workload.donations,
                summary.workload.minted,
                summary.total_supply
            );
        }
        Ok(summary)
    }

    /// Produce blocks every tick until Ctrl-C or until `max_blocks` have been
    /// produced (0 = unbounded). Returns the number of blocks produced.
    pub async fn run(&mut self, max_blocks: u64) -> Result<u64, LinoError> {
        tracing::info!(
            "Block driver started at height {} (interval {}s, tick {:?})",
            self.height,
            self.block_interval_sec,
            self.tick
        );

        let mut produced = 0u64;
        while max_blocks == 0 || produced < max_blocks {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Block driver received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.tick) => {
                    self.advance_block()?;
                    produced += 1;
                }
            }
        }
        Ok(produced)
    }

    /// Snapshot the global tables at the current height.
    pub fn export(&mut self) -> Result<GlobalTables, LinoError> {
        let header = self.header(self.height, 0);
        let mut ctx = Context::new(self.store.as_mut(), header);
        self.gm.export_tables(&mut ctx)
    }

    pub fn balances(&self) -> Result<Vec<(String, Coin)>, LinoError> {
        self.executor.accounts().balances(self.store.as_ref())
    }
}
