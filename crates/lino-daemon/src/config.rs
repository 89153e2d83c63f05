// crates/lino-daemon/src/config.rs
//
// Runtime configuration for the Lino daemon.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;

use lino_core::coin::Coin;
use lino_core::dec::Dec;
use lino_core::param::{GlobalAllocationParam, GlobalInitParams, Parameter, ProposalParam};

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Storage backend: "memory" or "rocksdb".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Directory for the RocksDB backend.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Unix time of block 0.
    #[serde(default = "default_genesis_time")]
    pub genesis_time: i64,

    /// Simulated seconds between blocks.
    #[serde(default = "default_block_interval_sec")]
    pub block_interval_sec: i64,

    /// Wall-clock milliseconds between blocks.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Blocks to produce before exiting; 0 runs until Ctrl-C.
    #[serde(default)]
    pub blocks: u64,

    #[serde(default = "default_txs_per_block")]
    pub txs_per_block: i64,

    #[serde(default = "default_donations_per_block")]
    pub donations_per_block: u32,

    /// Whole LINO per donation.
    #[serde(default = "default_donation_amount")]
    pub donation_amount: i64,

    /// Whole LINO staked at each day boundary.
    #[serde(default = "default_stake_per_day")]
    pub stake_per_day: i64,

    /// Genesis money supply in whole LINO.
    #[serde(default = "default_total_lino")]
    pub total_lino: i64,

    #[serde(default)]
    pub genesis: GenesisParams,

    /// Heights below this use the one-hour param-change delay.
    #[serde(default)]
    pub legacy_param_change_height: Option<i64>,

    /// Write the global state here as JSON on shutdown.
    #[serde(default)]
    pub export_path: Option<String>,

    /// Change-param proposals submitted at fixed heights.
    #[serde(default)]
    pub proposals: Vec<ScheduledProposal>,
}

/// A change-param proposal the driver submits when it reaches `height`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledProposal {
    pub height: i64,
    pub id: String,
    pub param: Parameter,
}

/// Genesis parameter set. Rates are decimal strings, e.g. `"0.098"`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenesisParams {
    #[serde(default = "default_growth_rate")]
    pub global_growth_rate: Dec,
    #[serde(default = "default_infra_allocation")]
    pub infra_allocation: Dec,
    #[serde(default = "default_content_creator_allocation")]
    pub content_creator_allocation: Dec,
    #[serde(default = "default_developer_allocation")]
    pub developer_allocation: Dec,
    #[serde(default = "default_validator_allocation")]
    pub validator_allocation: Dec,
    #[serde(default = "default_max_tps")]
    pub max_tps: Dec,
    #[serde(default = "default_friction_rate")]
    pub consumption_friction_rate: Dec,
    #[serde(default = "default_freezing_period_sec")]
    pub consumption_freezing_period_sec: i64,
    #[serde(default = "default_change_param_execution_sec")]
    pub change_param_execution_sec: i64,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_data_dir() -> String {
    "~/.lino/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_genesis_time() -> i64 {
    // 2019-01-01T00:00:00Z
    1_546_300_800
}

fn default_block_interval_sec() -> i64 {
    60
}

fn default_tick_ms() -> u64 {
    100
}

fn default_txs_per_block() -> i64 {
    20
}

fn default_donations_per_block() -> u32 {
    2
}

fn default_donation_amount() -> i64 {
    10
}

fn default_stake_per_day() -> i64 {
    1_000
}

fn default_total_lino() -> i64 {
    10_000_000_000
}

fn default_growth_rate() -> Dec {
    GlobalAllocationParam::default().global_growth_rate
}

fn default_infra_allocation() -> Dec {
    GlobalAllocationParam::default().infra_allocation
}

fn default_content_creator_allocation() -> Dec {
    GlobalAllocationParam::default().content_creator_allocation
}

fn default_developer_allocation() -> Dec {
    GlobalAllocationParam::default().developer_allocation
}

fn default_validator_allocation() -> Dec {
    GlobalAllocationParam::default().validator_allocation
}

fn default_max_tps() -> Dec {
    GlobalInitParams::default().max_tps
}

fn default_friction_rate() -> Dec {
    GlobalInitParams::default().consumption_friction_rate
}

fn default_freezing_period_sec() -> i64 {
    GlobalInitParams::default().consumption_freezing_period_sec
}

fn default_change_param_execution_sec() -> i64 {
    ProposalParam::default().change_param_execution_sec
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            global_growth_rate: default_growth_rate(),
            infra_allocation: default_infra_allocation(),
            content_creator_allocation: default_content_creator_allocation(),
            developer_allocation: default_developer_allocation(),
            validator_allocation: default_validator_allocation(),
            max_tps: default_max_tps(),
            consumption_friction_rate: default_friction_rate(),
            consumption_freezing_period_sec: default_freezing_period_sec(),
            change_param_execution_sec: default_change_param_execution_sec(),
        }
    }
}

impl GenesisParams {
    pub fn allocation(&self) -> GlobalAllocationParam {
        GlobalAllocationParam {
            global_growth_rate: self.global_growth_rate,
            infra_allocation: self.infra_allocation,
            content_creator_allocation: self.content_creator_allocation,
            developer_allocation: self.developer_allocation,
            validator_allocation: self.validator_allocation,
        }
    }

    pub fn proposal(&self) -> ProposalParam {
        ProposalParam {
            change_param_execution_sec: self.change_param_execution_sec,
            ..ProposalParam::default()
        }
    }

    pub fn init(&self) -> GlobalInitParams {
        GlobalInitParams {
            max_tps: self.max_tps,
            consumption_friction_rate: self.consumption_friction_rate,
            consumption_freezing_period_sec: self.consumption_freezing_period_sec,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            genesis_time: default_genesis_time(),
            block_interval_sec: default_block_interval_sec(),
            tick_ms: default_tick_ms(),
            blocks: 0,
            txs_per_block: default_txs_per_block(),
            donations_per_block: default_donations_per_block(),
            donation_amount: default_donation_amount(),
            stake_per_day: default_stake_per_day(),
            total_lino: default_total_lino(),
            genesis: GenesisParams::default(),
            legacy_param_change_height: None,
            export_path: None,
            proposals: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn total_supply(&self) -> Coin {
        Coin::from_lino(self.total_lino)
    }
}
