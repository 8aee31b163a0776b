use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use nvmtank::{EvictionKind, TankConfig};

/// Minimal CLI for the nvmtank attribute store
#[derive(Parser, Debug)]
#[command(name = "nvmtank", version, about = "Paged NVM attribute tank CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

/// Device and geometry flags shared by all commands (override NVM_* env).
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Device file (default: $NVM_DEVICE or ATTR_TANK.dat)
    #[arg(long)]
    pub device: Option<PathBuf>,
    /// Raw page size in bytes, checksum included
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Device pages (mirror half included)
    #[arg(long)]
    pub num_pages: Option<u64>,
    /// Cache slots
    #[arg(long)]
    pub cache_size: Option<usize>,
    /// Disable mirror redundancy
    #[arg(long, default_value_t = false)]
    pub no_redundancy: bool,
    /// Eviction policy: first-fit | lru
    #[arg(long)]
    pub eviction: Option<String>,
}

impl DeviceArgs {
    pub fn tank_config(&self) -> TankConfig {
        let mut cfg = TankConfig::from_env();
        if let Some(d) = &self.device {
            cfg.device = d.clone();
        }
        if let Some(ps) = self.page_size {
            cfg.pager.page_size = ps;
        }
        if let Some(n) = self.num_pages {
            cfg.pager.num_pages = n;
        }
        if let Some(c) = self.cache_size {
            cfg.pager.cache_size = c;
        }
        if self.no_redundancy {
            cfg.pager.redundancy = false;
        }
        if let Some(k) = self.eviction.as_deref().and_then(EvictionKind::parse) {
            cfg.pager.eviction = k;
        }
        cfg
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Read attribute by id
    Get {
        #[command(flatten)]
        dev: DeviceArgs,
        #[arg(long)]
        id: u16,
        /// Write the raw value to this file instead of dumping it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Set attribute by id
    Set {
        #[command(flatten)]
        dev: DeviceArgs,
        #[arg(long)]
        id: u16,
        /// Value: UTF-8 text or "hex:bc" / "hex:de:ad:be:ef"
        #[arg(long)]
        value: String,
    },
    /// Print tank metadata (cursor, set attributes). --json prints one JSON object.
    Status {
        #[command(flatten)]
        dev: DeviceArgs,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Verify every page checksum and repair from the mirror where possible
    Scrub {
        #[command(flatten)]
        dev: DeviceArgs,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Hex dump of one logical page (data region)
    Dump {
        #[command(flatten)]
        dev: DeviceArgs,
        #[arg(long)]
        page: u64,
    },
}
