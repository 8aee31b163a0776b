//! pager/core: структура Pager, конструкторы, геометрия устройства и счётчики.

use log::debug;

use crate::config::PagerConfig;
use crate::consts::CHECKSUM_SIZE;
use crate::device::BlockDevice;
use crate::error::Result;

use super::cache::{CacheSlot, EvictionPolicy};

/// Per-instance counters (single-threaded, plain integers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PagerStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub writebacks: u64,
    pub flush_writes: u64,
    pub repairs: u64,
}

/// Paged view of a raw device with a fixed-size write-back cache.
///
/// Logical page `p` lives at byte `p * raw_page_size`. With redundancy on,
/// the device page count is rounded down to even and split in half: callers
/// see the first half, and page `p` is mirrored at `p + num_redundant_pages`.
pub struct Pager<D: BlockDevice> {
    pub(crate) dev: D,
    pub(crate) raw_page_size: usize,
    pub(crate) data_page_size: usize,
    /// Logical capacity visible to callers.
    pub(crate) num_pages: u64,
    /// Mirror distance (== num_pages without redundancy, unused then).
    pub(crate) num_redundant_pages: u64,
    pub(crate) with_redundancy: bool,
    pub(crate) cache: Vec<CacheSlot>,
    pub(crate) policy: Box<dyn EvictionPolicy>,
    pub(crate) stats: PagerStats,
}

impl<D: BlockDevice> Pager<D> {
    /// Positional constructor: raw page size, device page count, cache slots, redundancy.
    pub fn new(
        dev: D,
        page_size: usize,
        num_pages: u64,
        cache_size: usize,
        with_redundancy: bool,
    ) -> Result<Self> {
        let cfg = PagerConfig::new(page_size, num_pages, cache_size).with_redundancy(with_redundancy);
        Self::with_config(dev, &cfg)
    }

    pub fn with_config(dev: D, cfg: &PagerConfig) -> Result<Self> {
        let policy = cfg.eviction.build(cfg.cache_size);
        Self::with_policy(dev, cfg, policy)
    }

    /// Construct with a caller-supplied replacement policy.
    pub fn with_policy(dev: D, cfg: &PagerConfig, policy: Box<dyn EvictionPolicy>) -> Result<Self> {
        cfg.validate()?;

        let raw_page_size = cfg.page_size;
        let data_page_size = raw_page_size - CHECKSUM_SIZE;
        let (num_pages, num_redundant_pages) = if cfg.redundancy {
            let even = cfg.num_pages - (cfg.num_pages % 2);
            (even / 2, even / 2)
        } else {
            (cfg.num_pages, cfg.num_pages)
        };

        let cache = (0..cfg.cache_size)
            .map(|_| CacheSlot::new(raw_page_size))
            .collect();

        debug!(
            "pager open: device={}, raw_page_size={}, logical_pages={}, mirror_offset={}, cache_slots={}, redundancy={}, eviction={}",
            dev.name(),
            raw_page_size,
            num_pages,
            num_redundant_pages,
            cfg.cache_size,
            cfg.redundancy,
            policy.name()
        );

        Ok(Self {
            dev,
            raw_page_size,
            data_page_size,
            num_pages,
            num_redundant_pages,
            with_redundancy: cfg.redundancy,
            cache,
            policy,
            stats: PagerStats::default(),
        })
    }

    /// Usable data bytes per logical page (raw size minus checksum).
    #[inline]
    pub fn page_size(&self) -> usize {
        self.data_page_size
    }

    #[inline]
    pub fn raw_page_size(&self) -> usize {
        self.raw_page_size
    }

    /// Logical capacity in pages.
    #[inline]
    pub fn num_pages(&self) -> u64 {
        self.num_pages
    }

    /// Logical capacity in data bytes.
    #[inline]
    pub fn capacity_bytes(&self) -> u64 {
        self.num_pages * self.data_page_size as u64
    }

    /// Distance (in pages) between a primary page and its mirror.
    #[inline]
    pub fn mirror_offset(&self) -> u64 {
        self.num_redundant_pages
    }

    #[inline]
    pub fn redundancy(&self) -> bool {
        self.with_redundancy
    }

    #[inline]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn eviction_policy(&self) -> &'static str {
        self.policy.name()
    }

    pub fn device(&self) -> &D {
        &self.dev
    }

    pub fn stats(&self) -> PagerStats {
        self.stats
    }

    /// Resident page per slot (None = empty slot).
    pub fn cached_pages(&self) -> Vec<Option<u64>> {
        self.cache.iter().map(|s| s.page_id()).collect()
    }

    /// Whether `page_id` is resident and dirty.
    pub fn is_dirty(&self, page_id: u64) -> bool {
        self.get_page_from_cache(page_id)
            .map(|i| self.cache[i].is_dirty())
            .unwrap_or(false)
    }

    // ---------------- internal helpers ----------------

    /// Linear scan of slots for a resident page.
    pub(crate) fn get_page_from_cache(&self, page_id: u64) -> Option<usize> {
        self.cache.iter().position(|s| s.page_id == Some(page_id))
    }

    /// Byte offset of the primary copy of `page_id`.
    #[inline]
    pub(crate) fn primary_offset(&self, page_id: u64) -> u64 {
        page_id * self.raw_page_size as u64
    }

    /// Byte offset of the mirror copy (only meaningful with redundancy).
    #[inline]
    pub(crate) fn mirror_offset_bytes(&self, page_id: u64) -> u64 {
        (page_id + self.num_redundant_pages) * self.raw_page_size as u64
    }
}
