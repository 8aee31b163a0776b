//! Centralized configuration for the pager and the attribute tank.
//!
//! - PagerConfig: geometry of the paged device (raw page size, page count),
//!   cache slot count, mirror redundancy and the eviction policy.
//! - TankConfig: device path + PagerConfig for the attribute tank.
//!
//! Both can be loaded from env (`from_env`) and overridden with fluent setters.
//! Env:
//! - NVM_DEVICE      (default "ATTR_TANK.dat")
//! - NVM_PAGE_SIZE   (default 1024, raw bytes incl. checksum)
//! - NVM_NUM_PAGES   (default 50, device pages incl. mirror half)
//! - NVM_CACHE_SIZE  (default 2)
//! - NVM_REDUNDANCY  (default on; "0|false|off|no" disables)
//! - NVM_EVICTION    ("first-fit" | "lru", default first-fit)

use std::fmt;
use std::path::PathBuf;

use crate::consts::{
    CHECKSUM_SIZE, DEFAULT_CACHE_SIZE, DEFAULT_DEVICE, DEFAULT_NUM_PAGES, DEFAULT_PAGE_SIZE,
    ENV_CACHE_SIZE, ENV_DEVICE, ENV_EVICTION, ENV_NUM_PAGES, ENV_PAGE_SIZE, ENV_REDUNDANCY,
};
use crate::error::{NvmError, Result};
use crate::pager::EvictionKind;

#[inline]
fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        let s = v.trim().to_ascii_lowercase();
        !(s == "0" || s == "false" || s == "off" || s == "no")
    })
}

#[inline]
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Geometry and cache settings of a Pager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerConfig {
    /// Raw page size in bytes (data + 1 checksum byte).
    pub page_size: usize,
    /// Device pages. With redundancy the second half holds mirrors.
    pub num_pages: u64,
    /// Number of cache slots (fixed for the pager lifetime).
    pub cache_size: usize,
    /// Keep a mirror copy of each page and recover from it on checksum mismatch.
    pub redundancy: bool,
    /// Slot replacement policy.
    pub eviction: EvictionKind,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            num_pages: DEFAULT_NUM_PAGES,
            cache_size: DEFAULT_CACHE_SIZE,
            redundancy: true,
            eviction: EvictionKind::FirstFit,
        }
    }
}

impl PagerConfig {
    pub fn new(page_size: usize, num_pages: u64, cache_size: usize) -> Self {
        Self {
            page_size,
            num_pages,
            cache_size,
            ..Self::default()
        }
    }

    /// Load from env on top of defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(n) = env_parse::<usize>(ENV_PAGE_SIZE) {
            cfg.page_size = n;
        }
        if let Some(n) = env_parse::<u64>(ENV_NUM_PAGES) {
            cfg.num_pages = n;
        }
        if let Some(n) = env_parse::<usize>(ENV_CACHE_SIZE) {
            cfg.cache_size = n;
        }
        if let Some(on) = env_flag(ENV_REDUNDANCY) {
            cfg.redundancy = on;
        }
        if let Ok(v) = std::env::var(ENV_EVICTION) {
            if let Some(k) = EvictionKind::parse(&v) {
                cfg.eviction = k;
            }
        }
        cfg
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_num_pages(mut self, num_pages: u64) -> Self {
        self.num_pages = num_pages;
        self
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn with_redundancy(mut self, on: bool) -> Self {
        self.redundancy = on;
        self
    }

    pub fn with_eviction(mut self, kind: EvictionKind) -> Self {
        self.eviction = kind;
        self
    }

    pub fn build(self) -> Self {
        self
    }

    /// Reject geometries the pager cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size <= CHECKSUM_SIZE {
            return Err(NvmError::config(format!(
                "page_size {} leaves no room for data (checksum is {} B)",
                self.page_size, CHECKSUM_SIZE
            )));
        }
        if self.cache_size == 0 {
            return Err(NvmError::config("cache_size must be >= 1"));
        }
        let min_pages = if self.redundancy { 2 } else { 1 };
        if self.num_pages < min_pages {
            return Err(NvmError::config(format!(
                "num_pages {} too small (need >= {} with redundancy={})",
                self.num_pages, min_pages, self.redundancy
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PagerConfig {{ page_size: {}, num_pages: {}, cache_size: {}, redundancy: {}, eviction: {} }}",
            self.page_size,
            self.num_pages,
            self.cache_size,
            self.redundancy,
            self.eviction.as_str(),
        )
    }
}

/// Attribute tank configuration: where the device lives and how it is paged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TankConfig {
    pub device: PathBuf,
    pub pager: PagerConfig,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            pager: PagerConfig::default(),
        }
    }
}

impl TankConfig {
    pub fn new<P: Into<PathBuf>>(device: P) -> Self {
        Self {
            device: device.into(),
            pager: PagerConfig::default(),
        }
    }

    pub fn from_env() -> Self {
        let mut cfg = Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            pager: PagerConfig::from_env(),
        };
        if let Ok(v) = std::env::var(ENV_DEVICE) {
            let s = v.trim();
            if !s.is_empty() {
                cfg.device = PathBuf::from(s);
            }
        }
        cfg
    }

    pub fn with_device<P: Into<PathBuf>>(mut self, device: P) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_pager(mut self, pager: PagerConfig) -> Self {
        self.pager = pager;
        self
    }

    pub fn build(self) -> Self {
        self
    }
}

impl fmt::Display for TankConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TankConfig {{ device: {}, pager: {} }}",
            self.device.display(),
            self.pager
        )
    }
}
