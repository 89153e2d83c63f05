// crates/lino-daemon/src/main.rs
//
// Binary entrypoint for the Lino daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, opens the
// configured store, and drives simulated blocks through the global economic
// core until Ctrl-C or the configured block count.

mod accounts;
mod config;
mod driver;
mod workload;

use clap::Parser;
use config::DaemonConfig;
use driver::BlockDriver;

use lino_core::error::LinoError;
use lino_core::traits::KvStore;
use lino_store::MemStore;

/// Lino daemon: runs the global economic core against a simulated chain.
#[derive(Parser, Debug)]
#[command(name = "lino-daemon", version = "0.1.0", about = "Lino ledger global state daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.lino/config.toml")]
    config: String,

    /// Number of blocks to produce; overrides the config file. 0 runs until Ctrl-C.
    #[arg(long)]
    blocks: Option<u64>,

    /// Write the global state as JSON to this path on shutdown.
    #[arg(long)]
    export: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let loaded = DaemonConfig::load(&expand_tilde(&args.config));
    let log_level = match &loaded {
        Ok(cfg) => cfg.log_level.clone(),
        Err(_) => DaemonConfig::default().log_level,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let mut daemon_config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", args.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                args.config,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI flags override the config file.
    if let Some(blocks) = args.blocks {
        daemon_config.blocks = blocks;
    }
    if args.export.is_some() {
        daemon_config.export_path = args.export.clone();
    }

    tracing::info!("Lino Daemon v0.1.0");
    tracing::info!("Storage backend: {}", daemon_config.backend);
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!(
        "Genesis: {} ({}), supply {} LINO",
        daemon_config.genesis_time,
        chrono::DateTime::from_timestamp(daemon_config.genesis_time, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "out of range".to_string()),
        daemon_config.total_lino
    );
    tracing::info!("Block interval: {}s", daemon_config.block_interval_sec);

    let store = open_store(&daemon_config)?;
    let mut driver = BlockDriver::open(store, &daemon_config)?;

    let produced = match driver.run(daemon_config.blocks).await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!("Fatal error at height {}: {}", driver.height() + 1, e);
            return Err(e.into());
        }
    };
    tracing::info!("Produced {} blocks, now at height {}", produced, driver.height());

    for (name, balance) in driver.balances()? {
        tracing::info!("  {:<10} {}", name, balance);
    }

    if let Some(path) = &daemon_config.export_path {
        let path = expand_tilde(path);
        let tables = driver.export()?;
        std::fs::write(&path, serde_json::to_string_pretty(&tables)?)?;
        tracing::info!("Exported global state to {}", path);
    }

    tracing::info!("Lino daemon shut down gracefully");
    Ok(())
}

/// Open the configured storage backend.
fn open_store(config: &DaemonConfig) -> Result<Box<dyn KvStore>, LinoError> {
    match config.backend.as_str() {
        "memory" => Ok(Box::new(MemStore::new())),
        "rocksdb" => open_rocks(config),
        other => Err(LinoError::InvalidParam(format!(
            "unknown backend '{}', use 'memory' or 'rocksdb'",
            other
        ))),
    }
}

#[cfg(feature = "rocksdb")]
fn open_rocks(config: &DaemonConfig) -> Result<Box<dyn KvStore>, LinoError> {
    let path = format!("{}/global_rocksdb", expand_tilde(&config.data_dir));
    let store = lino_store::RocksStore::open(&path)?;
    tracing::info!("RocksDB opened at {}", path);
    Ok(Box::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocks(_config: &DaemonConfig) -> Result<Box<dyn KvStore>, LinoError> {
    Err(LinoError::InvalidParam(
        "built without the 'rocksdb' feature".to_string(),
    ))
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
